//! Command-line interface definitions

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cheddar")]
#[command(about = "Inspect a CheddarGetter product from the command line")]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to <config dir>/cheddar/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "json", global = true)]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pricing plans
    Plans {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Customers and their subscriptions
    Customers {
        #[command(subcommand)]
        command: CustomerCommands,
    },
    /// Send a request and print the XML response as received
    Raw {
        /// API path, e.g. /customers/get
        path: String,
        /// Entity code appended to the URL
        #[arg(long)]
        code: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// List all plans
    List,
    /// Show one plan
    Get { code: String },
}

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// List all customers
    List,
    /// Show one customer
    Get { code: String },
    /// Items included in each customer's current plan
    Items,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// JSON on a single line
    JsonCompact,
    /// Comma separated values, one row per entity
    Csv,
}
