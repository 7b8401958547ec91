use anyhow::{Context, Result};
use colored::*;

use cheddar_client::{Client, Customer, reports};

use super::{print_entities, print_entity};
use crate::cli::output::format_output;
use crate::cli::{CustomerCommands, OutputFormat};

pub async fn handle_customer_command(
    client: &Client,
    command: CustomerCommands,
    format: OutputFormat,
) -> Result<()> {
    match command {
        CustomerCommands::List => {
            let customers = Customer::all(client)
                .await
                .context("Failed to fetch customers")?;
            if customers.is_empty() {
                eprintln!("{}", "No customers found".yellow());
            }
            print_entities(&customers, format)
        }
        CustomerCommands::Get { code } => {
            let customer = Customer::get(client, &code)
                .await
                .with_context(|| format!("Failed to fetch customer '{}'", code))?;
            print_entity(&customer, format)
        }
        CustomerCommands::Items => {
            let report = reports::items_by_customer_code(client)
                .await
                .context("Failed to build the item report")?;
            eprintln!(
                "{} {} customers",
                "Collected items for".green(),
                report.len().to_string().bold()
            );
            let data = serde_json::to_value(&report).context("Failed to serialize report")?;
            println!("{}", format_output(&data, format)?);
            Ok(())
        }
    }
}
