//! Handlers for each top-level subcommand

pub mod customers;
pub mod plans;
pub mod raw;

use anyhow::Result;
use serde_json::Value as JsonValue;

use cheddar_client::Model;

use super::OutputFormat;
use super::output::format_output;

/// Print a list of entities as one JSON array
pub(crate) fn print_entities<M: Model>(entities: &[M], format: OutputFormat) -> Result<()> {
    let rows: Vec<JsonValue> = entities.iter().map(|e| e.project().to_json()).collect();
    println!("{}", format_output(&JsonValue::Array(rows), format)?);
    Ok(())
}

pub(crate) fn print_entity<M: Model>(entity: &M, format: OutputFormat) -> Result<()> {
    println!("{}", format_output(&entity.project().to_json(), format)?);
    Ok(())
}
