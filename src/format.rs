//! Output formatting for properties and source lists.

use crate::config::{Properties, SourceId, escape};
use clap::ValueEnum;
use serde_json::{Map, Value, json};

/// Output format for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `key=value` lines, escaped so they can be read back
    #[default]
    Properties,
    Json,
    Markdown,
}

/// Render a set of properties.
pub fn format_properties(props: &Properties, format: OutputFormat) -> String {
    match format {
        OutputFormat::Properties => {
            let mut out = String::new();
            for (key, value) in props {
                out.push_str(&escape(key, true));
                out.push('=');
                out.push_str(&escape(value, false));
                out.push('\n');
            }
            out
        }
        OutputFormat::Json => {
            let map: Map<String, Value> = props
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            pretty(&Value::Object(map))
        }
        OutputFormat::Markdown => {
            let mut md = String::new();
            md.push_str("| key | value |\n");
            md.push_str("|-----|-------|\n");
            for (key, value) in props {
                md.push_str(&format!(
                    "| `{}` | {} |\n",
                    key,
                    markdown_cell(value)
                ));
            }
            md
        }
    }
}

/// Render a single value, or nothing found.
pub fn format_value(key: &str, value: Option<&str>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Properties => match value {
            Some(v) => format!("{}\n", v),
            None => String::new(),
        },
        OutputFormat::Json => pretty(&json!({ "key": key, "value": value })),
        OutputFormat::Markdown => match value {
            Some(v) => format!("- **{}**: {}\n", key, markdown_cell(v)),
            None => format!("- **{}**: _(not set)_\n", key),
        },
    }
}

/// Render an ordered list of sources, lowest precedence first.
pub fn format_paths(paths: &[SourceId], format: OutputFormat) -> String {
    match format {
        OutputFormat::Properties => {
            let mut out = String::new();
            for path in paths {
                out.push_str(&path.to_string());
                out.push('\n');
            }
            out
        }
        OutputFormat::Json => pretty(&json!(paths)),
        OutputFormat::Markdown => {
            let mut md = String::from("## Sources (lowest precedence first)\n");
            for (i, path) in paths.iter().enumerate() {
                md.push_str(&format!("{}. `{}`\n", i + 1, path));
            }
            md
        }
    }
}

fn pretty(value: &Value) -> String {
    let mut out = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    out.push('\n');
    out
}

fn markdown_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', "<br>")
}
