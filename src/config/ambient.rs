//! Ambient settings: the host process's own configuration store.
//!
//! The ambient source (`/`) is never loaded from a resource; it is a snapshot
//! taken from an [`AmbientSettings`] provider at load time.

use super::properties::Properties;

/// Provides a snapshot of process-wide settings.
pub trait AmbientSettings: Send + Sync {
    fn snapshot(&self) -> Properties;
}

/// Environment variables of the current process.
///
/// Without a prefix every variable is taken verbatim. With a prefix only
/// matching variables are kept and their names become dotted keys:
/// `MULTIPROPS_DB__POOL_SIZE` with prefix `MULTIPROPS_` becomes `db.pool_size`.
#[derive(Debug, Clone, Default)]
pub struct ProcessEnvironment {
    prefix: Option<String>,
}

impl ProcessEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn translate(&self, name: &str) -> Option<String> {
        let Some(ref prefix) = self.prefix else {
            return Some(name.to_string());
        };
        let rest = name.strip_prefix(prefix.as_str())?;
        if rest.is_empty() {
            return None;
        }
        Some(rest.replace("__", ".").to_ascii_lowercase())
    }

    fn collect<I>(&self, vars: I) -> Properties
    where
        I: IntoIterator<Item = (String, String)>,
    {
        vars.into_iter()
            .filter_map(|(name, value)| self.translate(&name).map(|key| (key, value)))
            .collect()
    }
}

impl AmbientSettings for ProcessEnvironment {
    fn snapshot(&self) -> Properties {
        // vars_os so one non-unicode variable doesn't panic the snapshot
        let vars = std::env::vars_os().filter_map(|(k, v)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        });
        self.collect(vars)
    }
}

/// A fixed set of ambient settings.
#[derive(Debug, Clone, Default)]
pub struct StaticAmbient(pub Properties);

impl AmbientSettings for StaticAmbient {
    fn snapshot(&self) -> Properties {
        self.0.clone()
    }
}
