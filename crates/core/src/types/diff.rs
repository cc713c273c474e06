//! Diff results.
//!
//! A [`DiffResult`] classifies every source item against the target store.
//! Entries keep the order the source store listed them in, so outcomes
//! computed from a diff are deterministic.

use serde::{Deserialize, Serialize};

use super::resource::{InvalidItem, ResourceItem};

/// A source item present in the target under the same key but with a
/// meaningfully different payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifferingItem {
    pub source: ResourceItem,
    pub target: ResourceItem,
    /// Names of the fields the comparator found different.
    pub changed_fields: Vec<String>,
}

/// Classification of one source entry.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffEntry {
    /// No target item shares the key.
    Missing(ResourceItem),
    /// Target item found, payloads differ.
    Differing(DifferingItem),
    /// Target item found, payloads match.
    Matching(ResourceItem),
    /// Source item could not be keyed.
    Invalid(InvalidItem),
}

/// Result of diffing a source listing against a target listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffResult {
    entries: Vec<DiffEntry>,
}

impl DiffResult {
    /// Build a diff from source-ordered entries.
    #[must_use]
    pub const fn new(entries: Vec<DiffEntry>) -> Self {
        Self { entries }
    }

    /// All entries in source order.
    #[must_use]
    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    /// Consume the diff, yielding its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<DiffEntry> {
        self.entries
    }

    /// Source items with no counterpart in the target.
    #[must_use]
    pub fn missing_in_target(&self) -> Vec<&ResourceItem> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                DiffEntry::Missing(item) => Some(item),
                _ => None,
            })
            .collect()
    }

    /// Source items whose target counterpart differs.
    #[must_use]
    pub fn differing(&self) -> Vec<&DifferingItem> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                DiffEntry::Differing(differing) => Some(differing),
                _ => None,
            })
            .collect()
    }

    /// Source items whose target counterpart matches.
    #[must_use]
    pub fn matching(&self) -> Vec<&ResourceItem> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                DiffEntry::Matching(item) => Some(item),
                _ => None,
            })
            .collect()
    }

    /// Source entries excluded from the diff.
    #[must_use]
    pub fn invalid(&self) -> Vec<&InvalidItem> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                DiffEntry::Invalid(invalid) => Some(invalid),
                _ => None,
            })
            .collect()
    }

    /// Whether the target already matches the source for every keyed item.
    #[must_use]
    pub fn is_in_sync(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| matches!(entry, DiffEntry::Matching(_) | DiffEntry::Invalid(_)))
    }

    /// Serializable summary for read-only previews.
    #[must_use]
    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary::default();
        for entry in &self.entries {
            match entry {
                DiffEntry::Missing(item) => summary.missing_in_target.push(item.title.clone()),
                DiffEntry::Differing(d) => summary.differing.push(DifferingSummary {
                    title: d.source.title.clone(),
                    changed_fields: d.changed_fields.clone(),
                }),
                DiffEntry::Matching(item) => summary.matching.push(item.title.clone()),
                DiffEntry::Invalid(invalid) => summary.invalid.push(invalid.clone()),
            }
        }
        summary
    }
}

/// Title-level view of a diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub missing_in_target: Vec<String>,
    pub differing: Vec<DifferingSummary>,
    pub matching: Vec<String>,
    pub invalid: Vec<InvalidItem>,
}

/// One differing item in a [`DiffSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferingSummary {
    pub title: String,
    pub changed_fields: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(handle: &str) -> ResourceItem {
        ResourceItem::new(Some(handle), handle, None, json!({})).unwrap()
    }

    #[test]
    fn test_accessors_partition_entries() {
        let diff = DiffResult::new(vec![
            DiffEntry::Matching(item("a")),
            DiffEntry::Missing(item("b")),
            DiffEntry::Differing(DifferingItem {
                source: item("c"),
                target: item("c"),
                changed_fields: vec!["title".to_string()],
            }),
        ]);

        assert_eq!(diff.matching().len(), 1);
        assert_eq!(diff.missing_in_target()[0].identity_key, "b");
        assert_eq!(diff.differing()[0].changed_fields, vec!["title"]);
        assert!(diff.invalid().is_empty());
        assert!(!diff.is_in_sync());
    }

    #[test]
    fn test_summary_keeps_source_order() {
        let diff = DiffResult::new(vec![
            DiffEntry::Missing(item("z")),
            DiffEntry::Missing(item("a")),
        ]);

        assert_eq!(diff.summary().missing_in_target, vec!["z", "a"]);
    }

    #[test]
    fn test_empty_diff_is_in_sync() {
        assert!(DiffResult::default().is_in_sync());
    }
}
