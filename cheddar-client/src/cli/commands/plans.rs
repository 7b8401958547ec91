use anyhow::{Context, Result};
use colored::*;

use cheddar_client::{Client, Plan};

use super::{print_entities, print_entity};
use crate::cli::{OutputFormat, PlanCommands};

pub async fn handle_plan_command(
    client: &Client,
    command: PlanCommands,
    format: OutputFormat,
) -> Result<()> {
    match command {
        PlanCommands::List => {
            let plans = Plan::all(client).await.context("Failed to fetch plans")?;
            if plans.is_empty() {
                eprintln!("{}", "No plans defined for this product".yellow());
            }
            print_entities(&plans, format)
        }
        PlanCommands::Get { code } => {
            let plan = Plan::get(client, &code)
                .await
                .with_context(|| format!("Failed to fetch plan '{}'", code))?;
            print_entity(&plan, format)
        }
    }
}
