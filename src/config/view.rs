//! The merged, queryable view over an ordered list of sources.
//!
//! Three indices are built once and never change afterwards:
//! - **by path**: each source's entries exactly as loaded, untouched by
//!   other sources
//! - **by key**: the effective value of every key, where the last source in
//!   load order that defines a key wins
//! - **by prefix**: effective entries grouped under every dot-separated
//!   leading prefix of their key, keyed by the remainder

use super::loader::SourceLoader;
use super::properties::Properties;
use super::source::SourceId;
use crate::logging::{DeferredLogQueue, DelayedLogItem, LogLevel, LogSink};
use std::collections::HashMap;

/// Immutable result of loading and merging an ordered list of sources.
#[derive(Debug, Clone, Default)]
pub struct ConfigView {
    paths: Vec<SourceId>,
    /// Entries of `paths[i]` as loaded, in load order.
    loaded: Vec<Properties>,
    /// Position in `loaded` of the last load of each source.
    by_path: HashMap<String, usize>,
    by_prefix: HashMap<String, Properties>,
    by_key: Properties,
    delayed_log_items: Vec<DelayedLogItem>,
    /// Sources that loaded without error.
    sources_found: usize,
}

impl ConfigView {
    /// A view with no sources at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load `paths` in order and merge them. Later paths shadow earlier ones.
    ///
    /// Never fails: problems with individual sources are kept in
    /// [`delayed_log_items`](Self::delayed_log_items).
    pub fn read(paths: &[SourceId], loader: &SourceLoader) -> Self {
        let mut log = DeferredLogQueue::new();
        let mut sources = Vec::with_capacity(paths.len());
        let mut found = 0;
        for path in paths {
            let (props, ok) = loader.load(path, &mut log);
            if ok {
                found += 1;
            }
            sources.push((path.clone(), props));
        }
        Self::build(sources, log.into_items(), found)
    }

    /// Like [`read`](Self::read), then replay the diagnostics into `sink`.
    /// The returned view still holds them.
    pub fn read_with_sink(paths: &[SourceId], loader: &SourceLoader, sink: &dyn LogSink) -> Self {
        let view = Self::read(paths, loader);
        for item in &view.delayed_log_items {
            item.replay_into(sink);
        }
        view
    }

    /// Merge already-loaded sources, in order.
    pub fn from_sources(sources: Vec<(SourceId, Properties)>) -> Self {
        let found = sources.len();
        Self::build(sources, Vec::new(), found)
    }

    /// Concatenate the source lists of `views` and merge again, so the last
    /// view wins conflicts. Nothing is reloaded.
    pub fn combine<'a, I>(views: I) -> Self
    where
        I: IntoIterator<Item = &'a ConfigView>,
    {
        let mut sources = Vec::new();
        let mut items = Vec::new();
        let mut found = 0;
        for view in views {
            sources.extend(view.paths.iter().cloned().zip(view.loaded.iter().cloned()));
            items.extend(view.delayed_log_items.iter().cloned());
            found += view.sources_found;
        }
        Self::build(sources, items, found)
    }

    fn build(
        sources: Vec<(SourceId, Properties)>,
        mut items: Vec<DelayedLogItem>,
        sources_found: usize,
    ) -> Self {
        let mut paths = Vec::with_capacity(sources.len());
        let mut loaded = Vec::with_capacity(sources.len());
        let mut by_path = HashMap::with_capacity(sources.len());
        let mut by_key = Properties::new();

        for (id, props) in sources {
            for (key, value) in &props {
                by_key.insert(key.clone(), value.clone());
            }
            by_path.insert(id.to_string(), loaded.len());
            loaded.push(props);
            paths.push(id);
        }

        let by_prefix = index_by_prefix(&by_key);

        items.push(DelayedLogItem::new(
            LogLevel::Trace,
            format!(
                "Merged {} sources into {} effective properties",
                paths.len(),
                by_key.len()
            ),
        ));

        Self {
            paths,
            loaded,
            by_path,
            by_prefix,
            by_key,
            delayed_log_items: items,
            sources_found,
        }
    }

    /// Source identifiers in load order.
    pub fn resource_paths(&self) -> &[SourceId] {
        &self.paths
    }

    /// Entries exactly as loaded from one source. A source loaded more than
    /// once reports its last load.
    pub fn properties_by_resource_path(&self, path: &str) -> Option<&Properties> {
        self.by_path
            .get(&SourceId::parse(path).to_string())
            .and_then(|&i| self.loaded.get(i))
    }

    /// Effective entries under `prefix.`, keyed by what follows it.
    pub fn properties_by_prefix(&self, prefix: &str) -> Option<&Properties> {
        self.by_prefix.get(prefix)
    }

    /// Effective value of `key`.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    /// Every effective entry.
    pub fn effective_properties(&self) -> &Properties {
        &self.by_key
    }

    /// Diagnostics recorded while this view was built.
    pub fn delayed_log_items(&self) -> &[DelayedLogItem] {
        &self.delayed_log_items
    }

    /// Number of sources that loaded without error.
    pub fn sources_found(&self) -> usize {
        self.sources_found
    }

    /// Number of effective entries.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Group effective entries under every proper dot-prefix of their key:
/// `a.b.c` is filed under `a` as `b.c` and under `a.b` as `c`.
fn index_by_prefix(by_key: &Properties) -> HashMap<String, Properties> {
    let mut index: HashMap<String, Properties> = HashMap::new();
    for (key, value) in by_key {
        for (dot, _) in key.match_indices('.') {
            let prefix = &key[..dot];
            if prefix.is_empty() {
                continue;
            }
            index
                .entry(prefix.to_string())
                .or_default()
                .insert(key[dot + 1..].to_string(), value.clone());
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resources::MemoryLocator;
    use crate::logging::CollectingSink;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_later_source_shadows_by_key_only() {
        let view = ConfigView::from_sources(vec![
            (SourceId::parse("/s1"), props(&[("k", "one"), ("only1", "x")])),
            (SourceId::parse("/s2"), props(&[("k", "two")])),
        ]);

        assert_eq!(view.property("k"), Some("two"));
        assert_eq!(view.property("only1"), Some("x"));
        assert_eq!(view.property("missing"), None);

        let s1 = view.properties_by_resource_path("/s1").unwrap();
        assert_eq!(s1["k"], "one");
        let s2 = view.properties_by_resource_path("/s2").unwrap();
        assert_eq!(s2.len(), 1);
    }

    #[test]
    fn test_prefix_query_uses_effective_values() {
        let view = ConfigView::from_sources(vec![
            (
                SourceId::parse("/base"),
                props(&[("a.b.x", "1"), ("a.b.y", "old"), ("a.c.z", "3")]),
            ),
            (SourceId::parse("/over"), props(&[("a.b.y", "2")])),
        ]);

        let ab = view.properties_by_prefix("a.b").unwrap();
        assert_eq!(ab, &props(&[("x", "1"), ("y", "2")]));

        let a = view.properties_by_prefix("a").unwrap();
        assert_eq!(a, &props(&[("b.x", "1"), ("b.y", "2"), ("c.z", "3")]));

        assert!(view.properties_by_prefix("a.b.x").is_none());
        assert!(view.properties_by_prefix("").is_none());
        assert!(view.properties_by_prefix("nope").is_none());
    }

    #[test]
    fn test_prefix_and_key_agree() {
        let view = ConfigView::from_sources(vec![
            (SourceId::parse("/1"), props(&[("db.url", "a"), ("db.pool", "1")])),
            (SourceId::parse("/2"), props(&[("db.url", "b")])),
            (SourceId::parse("/3"), props(&[("db.pool", "3")])),
        ]);
        for (rest, value) in view.properties_by_prefix("db").unwrap() {
            assert_eq!(view.property(&format!("db.{}", rest)), Some(value.as_str()));
        }
    }

    #[test]
    fn test_same_path_twice_last_write_wins() {
        let view = ConfigView::from_sources(vec![
            (SourceId::parse("/dup"), props(&[("a", "1")])),
            (SourceId::parse("/dup"), props(&[("b", "2")])),
        ]);
        let dup = view.properties_by_resource_path("/dup").unwrap();
        assert_eq!(dup, &props(&[("b", "2")]));
        // By-key still saw both loads
        assert_eq!(view.property("a"), Some("1"));
        assert_eq!(view.property("b"), Some("2"));
    }

    #[test]
    fn test_combine_last_view_wins() {
        let low = ConfigView::from_sources(vec![(
            SourceId::parse("/low"),
            props(&[("k", "low"), ("only.low", "1")]),
        )]);
        let high = ConfigView::from_sources(vec![(
            SourceId::parse("/high"),
            props(&[("k", "high")]),
        )]);

        let combined = ConfigView::combine([&low, &high]);
        assert_eq!(combined.property("k"), high.property("k"));
        assert_eq!(combined.property("only.low"), low.property("only.low"));
        assert_eq!(
            combined.resource_paths(),
            &[SourceId::parse("/low"), SourceId::parse("/high")]
        );
        assert_eq!(combined.properties_by_resource_path("/low").unwrap()["k"], "low");
        assert_eq!(combined.properties_by_prefix("only").unwrap()["low"], "1");
    }

    #[test]
    fn test_combine_keeps_every_load_of_a_repeated_source() {
        let low = ConfigView::from_sources(vec![(
            SourceId::parse("/low"),
            props(&[("a", "low"), ("c", "low")]),
        )]);
        let high = ConfigView::from_sources(vec![
            (SourceId::parse("/dup"), props(&[("a", "1")])),
            (SourceId::parse("/dup"), props(&[("b", "2")])),
        ]);

        let combined = ConfigView::combine([&low, &high]);
        for key in ["a", "b"] {
            assert_eq!(combined.property(key), high.property(key), "key {}", key);
        }
        assert_eq!(combined.property("c"), Some("low"));
        assert_eq!(
            combined.properties_by_resource_path("/dup"),
            high.properties_by_resource_path("/dup")
        );
        assert_eq!(combined.resource_paths().len(), 3);
    }

    #[test]
    fn test_read_skips_missing_sources() {
        let locator = MemoryLocator::new()
            .with("/first.properties", "a=1\nshared=first\n")
            .with("/last.properties", "shared=last\n");
        let loader = SourceLoader::new(locator);
        let paths = vec![
            SourceId::parse("/first.properties"),
            SourceId::parse("/missing.properties"),
            SourceId::parse("/last.properties"),
        ];

        let view = ConfigView::read(&paths, &loader);
        assert_eq!(view.property("a"), Some("1"));
        assert_eq!(view.property("shared"), Some("last"));
        assert_eq!(view.sources_found(), 2);
        assert_eq!(
            view.properties_by_resource_path("/missing.properties"),
            Some(&Properties::new())
        );
        assert!(
            view.delayed_log_items()
                .iter()
                .any(|item| item.level == LogLevel::Debug && item.message.contains("missing"))
        );
    }

    #[test]
    fn test_read_with_sink_replays_diagnostics() {
        let loader = SourceLoader::new(MemoryLocator::new().with("/a.properties", "a=1\n"));
        let paths = vec![
            SourceId::parse("/a.properties"),
            SourceId::parse("hocon:/b.conf"),
        ];
        let sink = CollectingSink::new();

        let view = ConfigView::read_with_sink(&paths, &loader, &sink);
        assert_eq!(view.property("a"), Some("1"));

        let entries = sink.entries();
        assert_eq!(entries.len(), view.delayed_log_items().len());
        assert!(
            entries
                .iter()
                .any(|(level, m)| *level == LogLevel::Warning && m.contains("hocon"))
        );
    }

    #[test]
    fn test_resource_path_lookup_is_canonical() {
        let view = ConfigView::from_sources(vec![(
            SourceId::parse("YAML:/app.yaml"),
            props(&[("a", "1")]),
        )]);
        assert!(view.properties_by_resource_path("yaml:/app.yaml").is_some());
        assert!(view.properties_by_resource_path("YAML:/app.yaml").is_some());
    }

    #[test]
    fn test_empty_view() {
        let view = ConfigView::empty();
        assert!(view.is_empty());
        assert_eq!(view.len(), 0);
        assert!(view.resource_paths().is_empty());
        assert_eq!(view.sources_found(), 0);
    }
}
