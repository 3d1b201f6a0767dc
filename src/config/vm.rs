//! The process-wide default configuration.
//!
//! An application builds one [`VmConfigResolver`] at startup and keeps it for
//! the life of the process. The first call to
//! [`read_vm_config`](VmConfigResolver::read_vm_config) resolves and merges
//! the default source list; every later call, from any thread, returns that
//! same view regardless of its arguments.
//!
//! ## Source order (lowest to highest precedence)
//! 1. Caller-supplied defaults
//! 2. Paths listed in the manifest resources ([`VM_MANIFEST_RESOURCES`]), or
//!    [`HARDCODED_DEFAULT_PATHS`] if no manifest lists anything
//! 3. Caller-supplied preempting paths
//!
//! Manifests hold one source path per line; blank lines and lines starting
//! with `#` are ignored.

use super::condense::condense_paths;
use super::loader::SourceLoader;
use super::source::SourceId;
use super::view::ConfigView;
use crate::error::LoadError;
use crate::logging::{DeferredLogQueue, DelayedLogItem, LogLevel, LogSink};
use std::sync::{Arc, OnceLock};

/// Manifest resources, read in this order.
pub const VM_MANIFEST_RESOURCES: [&str; 2] = [
    "/multiprops/vm-config-resource-paths.txt",
    "/multiprops-config-resource-paths.txt",
];

/// Sources used when no manifest lists any.
pub const HARDCODED_DEFAULT_PATHS: [&str; 4] = [
    "yaml:/reference.yaml",
    "/multiprops.properties",
    "yaml:/application.yaml",
    "/",
];

/// One-shot builder and holder of the default configuration.
pub struct VmConfigResolver {
    loader: SourceLoader,
    manifests: Vec<String>,
    fallback: Vec<SourceId>,
    vm_config: OnceLock<BuiltConfig>,
}

struct BuiltConfig {
    view: Arc<ConfigView>,
    /// No source in the final list loaded.
    nothing_configured: bool,
}

impl VmConfigResolver {
    pub fn new(loader: SourceLoader) -> Self {
        Self {
            loader,
            manifests: VM_MANIFEST_RESOURCES.iter().map(|s| s.to_string()).collect(),
            fallback: HARDCODED_DEFAULT_PATHS.iter().map(|s| SourceId::parse(s)).collect(),
            vm_config: OnceLock::new(),
        }
    }

    /// Use different manifest resource names.
    pub fn with_manifests<S: AsRef<str>>(mut self, manifests: &[S]) -> Self {
        self.manifests = manifests.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// Use a different fallback list.
    pub fn with_fallback(mut self, fallback: Vec<SourceId>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn loader(&self) -> &SourceLoader {
        &self.loader
    }

    /// The default configuration, built on first use.
    ///
    /// `defaults` and `preempting` are only consulted by the call that
    /// performs the build. Diagnostics about path discovery from that build go
    /// to `log`; diagnostics from loading the sources themselves stay on the
    /// returned view.
    pub fn read_vm_config(
        &self,
        defaults: &[SourceId],
        preempting: &[SourceId],
        log: &mut DeferredLogQueue,
    ) -> Arc<ConfigView> {
        let built = self.vm_config.get_or_init(|| {
            let paths = self.resolve_paths(defaults, preempting, log);
            let view = ConfigView::read(&paths, &self.loader);
            let nothing_configured = view.sources_found() == 0;
            if nothing_configured {
                log.record(
                    LogLevel::Info,
                    "No configuration source could be loaded; using empty configuration",
                );
            }
            BuiltConfig {
                view: Arc::new(view),
                nothing_configured,
            }
        });
        Arc::clone(&built.view)
    }

    /// Like [`read_vm_config`](Self::read_vm_config), replaying every
    /// diagnostic of this call and of the view into `sink`.
    pub fn read_vm_config_with_sink(
        &self,
        defaults: &[SourceId],
        preempting: &[SourceId],
        sink: &dyn LogSink,
    ) -> Arc<ConfigView> {
        let mut log = DeferredLogQueue::new();
        let view = self.read_vm_config(defaults, preempting, &mut log);
        log.extend(view.delayed_log_items().iter().cloned());
        log.drain_into(sink);
        view
    }

    /// The view, if it has been built.
    pub fn get(&self) -> Option<Arc<ConfigView>> {
        self.vm_config.get().map(|built| Arc::clone(&built.view))
    }

    /// True once the default configuration has been built from at least one
    /// source that loaded. False before the first build.
    pub fn found_vm_config(&self) -> bool {
        self.vm_config
            .get()
            .is_some_and(|built| !built.nothing_configured)
    }

    /// Final ordered source list: defaults, then manifest (or fallback)
    /// paths, then preempting paths, each path kept once at its highest
    /// priority.
    pub fn resolve_paths(
        &self,
        defaults: &[SourceId],
        preempting: &[SourceId],
        log: &mut DeferredLogQueue,
    ) -> Vec<SourceId> {
        let discovered = self.vm_resource_paths(log);
        let paths = condense_paths(&[defaults, &discovered[..], preempting]);

        let listing = paths
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        log.record(
            LogLevel::Debug,
            format!("Reading VM config for path list {}", listing),
        );
        paths
    }

    /// Paths from the manifests, or the fallback list if they yield none.
    pub fn vm_resource_paths(&self, log: &mut DeferredLogQueue) -> Vec<SourceId> {
        let mut paths = Vec::new();
        for manifest in &self.manifests {
            paths.extend(self.read_manifest(manifest, log));
        }

        if paths.is_empty() {
            log.record(
                LogLevel::Debug,
                "No resource paths listed in any manifest; using built-in defaults",
            );
            self.fallback.clone()
        } else {
            paths
        }
    }

    fn read_manifest(&self, manifest: &str, log: &mut DeferredLogQueue) -> Vec<SourceId> {
        match self.loader.read_text(manifest) {
            Ok(text) => {
                log.record(
                    LogLevel::Trace,
                    format!("Added paths from resource path manifest '{}'", manifest),
                );
                parse_manifest(&text)
            }
            Err(err @ LoadError::NotFound { .. }) => {
                log.push(
                    DelayedLogItem::new(
                        LogLevel::Trace,
                        format!("Could not find resource path manifest '{}'", manifest),
                    )
                    .with_cause(err),
                );
                Vec::new()
            }
            Err(err) => {
                log.record_failure(
                    format!("Failed to read resource path manifest '{}'", manifest),
                    err,
                );
                Vec::new()
            }
        }
    }
}

/// One source path per line; blanks and `#` comments skipped.
pub fn parse_manifest(text: &str) -> Vec<SourceId> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(SourceId::parse)
        .collect()
}
