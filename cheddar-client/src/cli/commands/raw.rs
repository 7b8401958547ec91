use anyhow::{Context, Result};

use cheddar_client::Client;

use crate::cli::output::pretty_xml;

pub async fn handle_raw_command(client: &Client, path: &str, code: Option<&str>) -> Result<()> {
    let body = client
        .perform_raw(path, code)
        .await
        .with_context(|| format!("Request to {} failed", path))?;
    println!("{}", pretty_xml(&body));
    Ok(())
}
