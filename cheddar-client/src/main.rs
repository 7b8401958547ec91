mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;

use cheddar_client::{Client, Config};
use cli::commands::{customers, plans, raw};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let client = Client::new(config).context("Failed to create API client")?;

    match cli.command {
        Commands::Plans { command } => plans::handle_plan_command(&client, command, cli.format).await,
        Commands::Customers { command } => {
            customers::handle_customer_command(&client, command, cli.format).await
        }
        Commands::Raw { path, code } => raw::handle_raw_command(&client, &path, code.as_deref()).await,
    }
}
