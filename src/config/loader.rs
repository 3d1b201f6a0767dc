//! Loading a single source into properties.
//!
//! A load never fails outright. A source that is missing, unreadable, or asks
//! for an unavailable parser contributes nothing and leaves a diagnostic in
//! the caller's [`DeferredLogQueue`], so one bad source cannot keep the rest
//! of the configuration from loading.

use super::ambient::{AmbientSettings, ProcessEnvironment};
use super::properties::{Properties, parse_properties};
use super::resources::ResourceLocator;
use super::source::SourceId;
use super::structured::{StructuredParser, YamlParser};
use crate::error::LoadError;
use crate::logging::{DeferredLogQueue, LogLevel};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Format tag handled by the bundled YAML parser.
pub const YAML_TAG: &str = "yaml";

/// Resolves source identifiers to properties.
pub struct SourceLoader {
    locator: Arc<dyn ResourceLocator>,
    ambient: Arc<dyn AmbientSettings>,
    parsers: HashMap<String, Arc<dyn StructuredParser>>,
    /// Number of sources loaded so far, successful or not.
    loads: AtomicUsize,
}

impl SourceLoader {
    /// Loader over `locator`, with process environment as ambient settings
    /// and the YAML parser registered.
    pub fn new(locator: impl ResourceLocator + 'static) -> Self {
        Self::from_arc(Arc::new(locator))
    }

    /// Same as [`new`](Self::new), for a locator that is already shared.
    pub fn from_arc(locator: Arc<dyn ResourceLocator>) -> Self {
        let mut parsers: HashMap<String, Arc<dyn StructuredParser>> = HashMap::new();
        parsers.insert(YAML_TAG.to_string(), Arc::new(YamlParser));
        Self {
            locator,
            ambient: Arc::new(ProcessEnvironment::new()),
            parsers,
            loads: AtomicUsize::new(0),
        }
    }

    /// Take ambient settings from `ambient` instead of the process environment.
    pub fn with_ambient(mut self, ambient: impl AmbientSettings + 'static) -> Self {
        self.ambient = Arc::new(ambient);
        self
    }

    /// Register a parser for `tag:` sources, replacing any existing one.
    pub fn with_parser(
        mut self,
        tag: impl Into<String>,
        parser: impl StructuredParser + 'static,
    ) -> Self {
        self.parsers
            .insert(tag.into().to_ascii_lowercase(), Arc::new(parser));
        self
    }

    /// Unregister the parser for `tag:` sources, if any.
    pub fn without_parser(mut self, tag: &str) -> Self {
        self.parsers.remove(&tag.to_ascii_lowercase());
        self
    }

    /// Whether `tag:` sources can be parsed. Tags are case-insensitive.
    pub fn has_parser(&self, tag: &str) -> bool {
        self.parsers.contains_key(&tag.to_ascii_lowercase())
    }

    /// How many sources this loader has been asked to load.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Load one source, recording any failure in `log` and returning no
    /// entries for it.
    ///
    /// The second element is whether the source loaded without error.
    pub fn load(&self, id: &SourceId, log: &mut DeferredLogQueue) -> (Properties, bool) {
        match self.try_load(id) {
            Ok(props) => {
                log.record(
                    LogLevel::Trace,
                    format!("Loaded {} properties from '{}'", props.len(), id),
                );
                (props, true)
            }
            Err(err) => {
                let message = match err {
                    LoadError::NotFound { .. } => {
                        format!("Configuration source '{}' not found; skipping", id)
                    }
                    _ => format!("Could not load configuration source '{}'; skipping", id),
                };
                log.record_failure(message, err);
                (Properties::new(), false)
            }
        }
    }

    /// Load one source, returning the failure instead of recording it.
    pub fn try_load(&self, id: &SourceId) -> Result<Properties, LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);

        match id {
            SourceId::Ambient => Ok(self.ambient.snapshot()),
            SourceId::Formatted { tag, path } => {
                let Some(parser) = self.parsers.get(tag) else {
                    return Err(LoadError::plugin_unavailable(tag, id.to_string()));
                };
                let text = self.read_text(path)?;
                parser
                    .parse(&text)
                    .map_err(|message| LoadError::parse(id.to_string(), message))
            }
            SourceId::Resource(path) => {
                let text = self.read_text(path)?;
                Ok(parse_properties(&text))
            }
        }
    }

    /// Read a resource's text, mapping absence and faults to [`LoadError`].
    pub fn read_text(&self, path: &str) -> Result<String, LoadError> {
        match self.locator.read(path) {
            Ok(Some(text)) => Ok(text),
            Ok(None) => Err(LoadError::not_found(path)),
            Err(e) => Err(LoadError::read(path, e)),
        }
    }
}
