//! Priority-preserving deduplication of source path lists.

use std::collections::HashSet;
use std::hash::Hash;

/// Merge several path lists into one, keeping each path once.
///
/// `lists` are given in increasing priority, and within a list later entries
/// have higher priority. A path mentioned more than once keeps only the
/// position of its highest-priority mention; lower-priority repeats are
/// dropped without disturbing the relative order of other paths.
///
/// # Example
/// ```
/// use multiprops::config::condense_paths;
///
/// let defaults = ["/a", "/b"];
/// let manifest = ["/c", "/a"];
/// let preempting = ["/d"];
/// let merged = condense_paths(&[&defaults[..], &manifest[..], &preempting[..]]);
/// assert_eq!(merged, vec!["/b", "/c", "/a", "/d"]);
/// ```
pub fn condense_paths<T>(lists: &[&[T]]) -> Vec<T>
where
    T: Clone + Eq + Hash,
{
    // Walk from highest priority to lowest so the first sighting of a path is
    // its strongest one, then flip back to load order.
    let mut seen: HashSet<&T> = HashSet::new();
    let mut reversed: Vec<T> = Vec::new();
    for list in lists.iter().rev() {
        for path in list.iter().rev() {
            if seen.insert(path) {
                reversed.push(path.clone());
            }
        }
    }
    reversed.reverse();
    reversed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjoint_lists_concatenate() {
        let a = ["/a1", "/a2"];
        let b = ["/b1"];
        let c = ["/c1", "/c2"];
        let merged = condense_paths(&[&a[..], &b[..], &c[..]]);
        assert_eq!(merged, vec!["/a1", "/a2", "/b1", "/c1", "/c2"]);
    }

    #[test]
    fn test_duplicate_takes_highest_priority_position() {
        let low = ["/shared", "/low"];
        let high = ["/high", "/shared"];
        let merged = condense_paths(&[&low[..], &high[..]]);
        assert_eq!(merged, vec!["/low", "/high", "/shared"]);
    }

    #[test]
    fn test_duplicate_within_one_list() {
        let only = ["/x", "/y", "/x"];
        let merged = condense_paths(&[&only[..]]);
        assert_eq!(merged, vec!["/y", "/x"]);
    }

    #[test]
    fn test_empty_lists_contribute_nothing() {
        let empty: [&str; 0] = [];
        let some = ["/a"];
        let merged = condense_paths(&[&empty[..], &some[..], &empty[..]]);
        assert_eq!(merged, vec!["/a"]);

        let none: Vec<&str> = condense_paths::<&str>(&[]);
        assert!(none.is_empty());
    }

    #[test]
    fn test_ambient_path_deduplicated_like_any_other() {
        let defaults = ["/", "/app.properties"];
        let manifest = ["/base.properties", "/"];
        let preempting = ["/override.properties"];
        let merged = condense_paths(&[&defaults[..], &manifest[..], &preempting[..]]);
        assert_eq!(
            merged,
            vec!["/app.properties", "/base.properties", "/", "/override.properties"]
        );
        assert_eq!(merged.iter().filter(|p| **p == "/").count(), 1);
    }

    #[test]
    fn test_each_distinct_path_once() {
        let a = ["/1", "/2", "/3"];
        let b = ["/3", "/4", "/1"];
        let c = ["/2", "/5"];
        let merged = condense_paths(&[&a[..], &b[..], &c[..]]);
        let mut sorted = merged.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), merged.len());
        assert_eq!(merged, vec!["/3", "/4", "/1", "/2", "/5"]);
    }
}
