//! Error types for source loading.
//!
//! None of these abort configuration resolution. They travel as the cause of a
//! [`DelayedLogItem`](crate::logging::DelayedLogItem) so the caller can report
//! them once logging is set up.

use crate::logging::LogLevel;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Failure to load a single configuration source.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The identifier did not resolve to any resource.
    #[error("configuration source not found: {path}")]
    NotFound { path: String },

    /// The resource exists but could not be read.
    #[error("failed to read configuration source {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A format tag was requested but no parser is registered for it.
    #[error("no parser available for '{tag}:' sources (requested {path})")]
    PluginUnavailable { tag: String, path: String },

    /// The structured parser rejected the resource text.
    #[error("failed to parse configuration source {path}: {message}")]
    Parse { path: String, message: String },
}

impl LoadError {
    /// Nothing exists under `path`.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// `path` exists but reading it failed.
    pub fn read(path: impl Into<String>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// No parser is registered for `tag`.
    pub fn plugin_unavailable(tag: impl Into<String>, path: impl Into<String>) -> Self {
        Self::PluginUnavailable {
            tag: tag.into(),
            path: path.into(),
        }
    }

    /// The parser for `path` rejected its text.
    pub fn parse(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Severity at which this failure is reported: debug for a missing
    /// source, warning for everything else.
    pub fn severity(&self) -> LogLevel {
        match self {
            LoadError::NotFound { .. } => LogLevel::Debug,
            LoadError::Read { .. }
            | LoadError::PluginUnavailable { .. }
            | LoadError::Parse { .. } => LogLevel::Warning,
        }
    }
}

/// Shared cause attached to a deferred log item.
pub type Cause = Arc<LoadError>;
