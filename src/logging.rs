//! Deferred logging.
//!
//! Configuration is resolved before the application knows how (or whether) to
//! initialize its logging backend, since that decision usually comes from the
//! configuration itself. Resolution therefore never logs directly: it records
//! [`DelayedLogItem`]s into a [`DeferredLogQueue`] which the caller drains into
//! a [`LogSink`] once one exists.
//!
//! [`TracingSink`] is the sink used by the binary; it forwards to `tracing`.

use crate::error::{Cause, LoadError};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::Level;

/// Severity of a deferred diagnostic, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Convert LogLevel to tracing Level.
pub fn log_level_to_tracing(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warning => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// A diagnostic produced before any logging sink was available.
#[derive(Debug, Clone)]
pub struct DelayedLogItem {
    pub level: LogLevel,
    pub message: String,
    pub cause: Option<Cause>,
    /// When the event happened, not when it was replayed.
    pub recorded_at: DateTime<Utc>,
}

impl DelayedLogItem {
    /// Record an item stamped with the current time.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            cause: None,
            recorded_at: Utc::now(),
        }
    }

    /// Attach the failure this item reports.
    pub fn with_cause(mut self, cause: LoadError) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// Hand this item to `sink`.
    pub fn replay_into(&self, sink: &dyn LogSink) {
        sink.log(self.level, &self.message, self.cause.as_deref());
    }
}

impl fmt::Display for DelayedLogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)?;
        if let Some(ref cause) = self.cause {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}

/// Destination for drained diagnostics.
pub trait LogSink {
    fn log(&self, level: LogLevel, message: &str, cause: Option<&LoadError>);
}

/// Ordered buffer of diagnostics, owned by the call that produced them.
#[derive(Debug, Clone, Default)]
pub struct DeferredLogQueue {
    items: Vec<DelayedLogItem>,
}

impl DeferredLogQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item.
    pub fn push(&mut self, item: DelayedLogItem) {
        self.items.push(item);
    }

    /// Append a new item without a cause.
    pub fn record(&mut self, level: LogLevel, message: impl Into<String>) {
        self.push(DelayedLogItem::new(level, message));
    }

    /// Record a load failure at its own severity.
    pub fn record_failure(&mut self, message: impl Into<String>, cause: LoadError) {
        let level = cause.severity();
        self.push(DelayedLogItem::new(level, message).with_cause(cause));
    }

    /// Append items recorded elsewhere, keeping their order.
    pub fn extend<I: IntoIterator<Item = DelayedLogItem>>(&mut self, items: I) {
        self.items.extend(items);
    }

    /// Items oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, DelayedLogItem> {
        self.items.iter()
    }

    /// Number of items waiting to be replayed.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<DelayedLogItem> {
        self.items
    }

    /// Replay every item, oldest first, leaving the queue empty.
    pub fn drain_into(&mut self, sink: &dyn LogSink) {
        for item in self.items.drain(..) {
            item.replay_into(sink);
        }
    }
}

impl<'a> IntoIterator for &'a DeferredLogQueue {
    type Item = &'a DelayedLogItem;
    type IntoIter = std::slice::Iter<'a, DelayedLogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Sink that forwards to `tracing`.
#[derive(Debug, Clone)]
pub struct TracingSink {
    /// Items below this level are dropped before reaching `tracing`.
    min_level: LogLevel,
    /// Logger name/category.
    name: Option<String>,
}

impl TracingSink {
    /// Forward everything, under the default logger name.
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Trace,
            name: None,
        }
    }

    /// Drop items below `level`.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Whether an item at `level` is forwarded.
    pub fn should_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Report items under `name` instead of `multiprops`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str, cause: Option<&LoadError>) {
        if !self.should_log(level) {
            return;
        }

        let logger = self.name.as_deref().unwrap_or("multiprops");
        let error = cause.map(|c| c.to_string());
        let error = error.as_deref();
        match log_level_to_tracing(level) {
            Level::ERROR => tracing::error!(logger, error, "{}", message),
            Level::WARN => tracing::warn!(logger, error, "{}", message),
            Level::INFO => tracing::info!(logger, error, "{}", message),
            Level::DEBUG => tracing::debug!(logger, error, "{}", message),
            Level::TRACE => tracing::trace!(logger, error, "{}", message),
        }
    }
}

/// Sink that keeps what it is given, for callers that want to inspect
/// diagnostics rather than emit them.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything logged so far, as `(level, message: cause)`.
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }
}

impl LogSink for CollectingSink {
    fn log(&self, level: LogLevel, message: &str, cause: Option<&LoadError>) {
        let text = match cause {
            Some(cause) => format!("{}: {}", message, cause),
            None => message.to_string(),
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_min_level() {
        let sink = TracingSink::new().with_min_level(LogLevel::Warning);

        assert!(!sink.should_log(LogLevel::Trace));
        assert!(!sink.should_log(LogLevel::Debug));
        assert!(!sink.should_log(LogLevel::Info));

        assert!(sink.should_log(LogLevel::Warning));
        assert!(sink.should_log(LogLevel::Error));
        assert!(TracingSink::new().should_log(LogLevel::Trace));
    }

    #[test]
    fn test_log_level_to_tracing() {
        assert_eq!(log_level_to_tracing(LogLevel::Trace), Level::TRACE);
        assert_eq!(log_level_to_tracing(LogLevel::Debug), Level::DEBUG);
        assert_eq!(log_level_to_tracing(LogLevel::Info), Level::INFO);
        assert_eq!(log_level_to_tracing(LogLevel::Warning), Level::WARN);
        assert_eq!(log_level_to_tracing(LogLevel::Error), Level::ERROR);
    }

    #[test]
    fn test_queue_preserves_order_and_drains() {
        let mut queue = DeferredLogQueue::new();
        queue.record(LogLevel::Debug, "first");
        queue.record_failure("second", LoadError::not_found("/missing.properties"));
        queue.record(LogLevel::Error, "third");
        assert_eq!(queue.len(), 3);

        let sink = CollectingSink::new();
        queue.drain_into(&sink);
        assert!(queue.is_empty());

        let entries = sink.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], (LogLevel::Debug, "first".to_string()));
        assert_eq!(entries[1].0, LogLevel::Debug);
        assert!(entries[1].1.contains("/missing.properties"));
        assert_eq!(entries[2], (LogLevel::Error, "third".to_string()));
    }

    #[test]
    fn test_replay_into_keeps_cause() {
        let item = DelayedLogItem::new(LogLevel::Warning, "could not load")
            .with_cause(LoadError::parse("yaml:/a.yaml", "bad indent"));
        let sink = CollectingSink::new();
        item.replay_into(&sink);
        item.replay_into(&sink);

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, LogLevel::Warning);
        assert!(entries[0].1.starts_with("could not load: "));
        assert!(entries[0].1.contains("bad indent"));
    }

    #[test]
    fn test_item_display_includes_cause() {
        let item = DelayedLogItem::new(LogLevel::Warning, "could not load")
            .with_cause(LoadError::plugin_unavailable("hocon", "hocon:/app.conf"));
        let text = item.to_string();
        assert!(text.starts_with("[warning] could not load: "));
        assert!(text.contains("hocon"));
    }

    #[test]
    fn test_tracing_sink_respects_filter() {
        // No subscriber installed; this only checks that filtered and
        // unfiltered paths do not panic.
        let sink = TracingSink::new()
            .with_min_level(LogLevel::Error)
            .with_name("test");
        sink.log(LogLevel::Debug, "dropped", None);
        sink.log(
            LogLevel::Error,
            "kept",
            Some(&LoadError::not_found("/x.properties")),
        );
    }
}
