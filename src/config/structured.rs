//! Structured-format parser plugins.
//!
//! Sources written as `tag:/path` are read by the parser registered for
//! `tag`. Parsers are optional: a loader without a parser for some tag reports
//! the source as unavailable and moves on.

use super::properties::Properties;
use serde_yaml::Value;

/// Turns the text of a structured document into flat dotted properties.
pub trait StructuredParser: Send + Sync {
    /// Parse `text` into properties. Errors are reported as strings and
    /// wrapped by the caller, which knows the source path.
    fn parse(&self, text: &str) -> Result<Properties, String>;
}

/// YAML documents, flattened to dotted keys.
///
/// Only values that read naturally as strings are kept: strings, numbers and
/// booleans. Sequences and nulls are skipped.
///
/// ```
/// use multiprops::config::{StructuredParser, YamlParser};
///
/// let props = YamlParser.parse("db:\n  pool: 10\n  url: pg://x\n").unwrap();
/// assert_eq!(props["db.pool"], "10");
/// assert_eq!(props["db.url"], "pg://x");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl StructuredParser for YamlParser {
    fn parse(&self, text: &str) -> Result<Properties, String> {
        let root: Value = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
        let mut out = Properties::new();
        match root {
            // An empty document
            Value::Null => {}
            Value::Mapping(_) => flatten_into(&mut out, None, &root),
            Value::Tagged(tagged) => flatten_into(&mut out, None, &tagged.value),
            _ => return Err("top level of a YAML config must be a mapping".to_string()),
        }
        Ok(out)
    }
}

fn flatten_into(out: &mut Properties, prefix: Option<&str>, value: &Value) {
    match value {
        Value::Mapping(map) => {
            for (k, v) in map {
                let Some(segment) = scalar_to_string(k) else {
                    continue;
                };
                let key = match prefix {
                    Some(p) => format!("{}.{}", p, segment),
                    None => segment,
                };
                flatten_into(out, Some(&key), v);
            }
        }
        Value::Tagged(tagged) => flatten_into(out, prefix, &tagged.value),
        scalar => {
            if let (Some(key), Some(text)) = (prefix, scalar_to_string(scalar)) {
                out.insert(key.to_string(), text);
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
