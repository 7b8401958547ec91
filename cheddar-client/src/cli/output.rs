//! Rendering of projections and raw responses

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use serde_json::Value as JsonValue;

use super::OutputFormat;

/// Format projected entities according to the selected output format
pub fn format_output(data: &JsonValue, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(data).context("Failed to format JSON output")
        }
        OutputFormat::JsonCompact => {
            serde_json::to_string(data).context("Failed to format JSON output")
        }
        OutputFormat::Csv => Ok(json_to_csv(data)),
    }
}

/// One row per array element, headers in first-seen order across all rows
fn json_to_csv(data: &JsonValue) -> String {
    match data {
        JsonValue::Array(rows) => {
            let mut headers: Vec<&String> = Vec::new();
            for row in rows {
                if let JsonValue::Object(obj) = row {
                    for key in obj.keys() {
                        if !headers.contains(&key) {
                            headers.push(key);
                        }
                    }
                }
            }
            if headers.is_empty() {
                return "No data\n".to_string();
            }

            let mut csv = headers
                .iter()
                .map(|h| csv_escape(h))
                .collect::<Vec<_>>()
                .join(",");
            csv.push('\n');

            for row in rows {
                if let JsonValue::Object(obj) = row {
                    let cells: Vec<String> = headers
                        .iter()
                        .map(|h| csv_escape(&json_value_to_string(obj.get(*h).unwrap_or(&JsonValue::Null))))
                        .collect();
                    csv.push_str(&cells.join(","));
                    csv.push('\n');
                }
            }
            csv
        }
        JsonValue::Object(obj) => {
            let mut csv = String::from("key,value\n");
            for (key, value) in obj {
                csv.push_str(&format!(
                    "{},{}\n",
                    csv_escape(key),
                    csv_escape(&json_value_to_string(value))
                ));
            }
            csv
        }
        _ => format!("value\n{}\n", csv_escape(&json_value_to_string(data))),
    }
}

/// Scalar cells print bare, nested entities as compact JSON
fn json_value_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(_) | JsonValue::Object(_) => value.to_string(),
    }
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Re-indent an XML document, returning it unchanged when it does not parse
pub fn pretty_xml(raw: &str) -> String {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => {
                if writer.write_event(event).is_err() {
                    return raw.to_string();
                }
            }
            Err(_) => return raw.to_string(),
        }
    }

    String::from_utf8(writer.into_inner()).unwrap_or_else(|_| raw.to_string())
}
