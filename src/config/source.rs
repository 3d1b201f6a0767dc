//! Source identifiers.
//!
//! A source is named by a path-like string. Two forms are special:
//! - `/` on its own denotes the ambient settings of the host process.
//! - `tag:/path` asks for the resource at `/path` to be read by the parser
//!   registered for `tag` (e.g. `yaml:/application.yaml`).
//!
//! Everything else is a plain key/value resource.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier string reserved for the ambient settings source.
pub const AMBIENT_PATH: &str = "/";

/// One named origin of configuration entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum SourceId {
    /// The host process's own settings; no load step.
    Ambient,
    /// A key/value text resource.
    Resource(String),
    /// A resource handed to the structured parser registered for `tag`.
    Formatted { tag: String, path: String },
}

impl SourceId {
    /// Parse an identifier string. Never fails: anything unrecognized is a
    /// plain resource path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == AMBIENT_PATH {
            return SourceId::Ambient;
        }
        if let Some((tag, path)) = split_format_tag(raw) {
            return SourceId::Formatted {
                tag: tag.to_ascii_lowercase(),
                path: path.to_string(),
            };
        }
        SourceId::Resource(raw.to_string())
    }

    /// A plain key/value resource at `path`.
    pub fn resource(path: impl Into<String>) -> Self {
        SourceId::Resource(path.into())
    }

    /// A resource read by the parser for `tag`. The tag is taken as given.
    pub fn formatted(tag: impl Into<String>, path: impl Into<String>) -> Self {
        SourceId::Formatted {
            tag: tag.into(),
            path: path.into(),
        }
    }

    /// True for the ambient settings source.
    pub fn is_ambient(&self) -> bool {
        matches!(self, SourceId::Ambient)
    }

    /// Resource path to hand to a locator, if this source needs one.
    pub fn resource_path(&self) -> Option<&str> {
        match self {
            SourceId::Ambient => None,
            SourceId::Resource(path) | SourceId::Formatted { path, .. } => Some(path),
        }
    }
}

/// Split `tag:/rest` into `(tag, /rest)`.
///
/// The tag must be at least two characters of `[A-Za-z0-9_-]` starting with a
/// letter, so a Windows drive (`C:/x`) is not mistaken for a format tag.
fn split_format_tag(raw: &str) -> Option<(&str, &str)> {
    let (tag, rest) = raw.split_once(':')?;
    let mut chars = tag.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() || tag.len() < 2 {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return None;
    }
    if rest.is_empty() {
        return None;
    }
    Some((tag, rest))
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Ambient => write!(f, "{}", AMBIENT_PATH),
            SourceId::Resource(path) => write!(f, "{}", path),
            SourceId::Formatted { tag, path } => write!(f, "{}:{}", tag, path),
        }
    }
}

impl FromStr for SourceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SourceId::parse(s))
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        SourceId::parse(s)
    }
}

impl From<String> for SourceId {
    fn from(s: String) -> Self {
        SourceId::parse(&s)
    }
}

impl From<SourceId> for String {
    fn from(id: SourceId) -> Self {
        id.to_string()
    }
}

/// Parse a slice of identifier strings.
pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Vec<SourceId> {
    raw.iter().map(|s| SourceId::parse(s.as_ref())).collect()
}
