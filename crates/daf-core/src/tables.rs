//! Static lookup tables consumed by the engine.
//!
//! The tables are plain data: they are loaded once at startup (see
//! `daf-config`) and shared immutably by every request.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Number of segments on each page or chapter, keyed by `"<Title> <page>"`,
/// e.g. `"Berakhot 2a"` or `"Genesis 1"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentCounts(HashMap<String, u32>);

impl SegmentCounts {
    #[must_use]
    pub fn get(&self, page_ref: &str) -> Option<u32> {
        self.0.get(page_ref).copied()
    }

    pub fn insert(&mut self, page_ref: impl Into<String>, count: u32) {
        self.0.insert(page_ref.into(), count);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, u32)> for SegmentCounts {
    fn from_iter<I: IntoIterator<Item = (K, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// All static tables used while building a page.
#[derive(Debug, Clone, Default)]
pub struct StaticTables {
    /// Segments per page/chapter, used to expand ranges and verse links.
    pub segment_counts: SegmentCounts,
    /// Atomic Talmud ref → the ref spanning its whole sugya.
    pub span_refs: HashMap<String, String>,
    /// Ref → literal Hebrew markers at which the row is cut.
    pub split_markers: HashMap<String, Vec<String>>,
    /// First ref of a run → last ref; rows in between collapse into the first.
    pub merge_pairs: HashMap<String, String>,
    /// Rows that are explanatory preambles to the following row.
    pub explanation_refs: HashSet<String>,
    /// Placeholder refs that exist only locally and are never fetched.
    pub synthetic_refs: HashSet<String>,
}

impl StaticTables {
    #[must_use]
    pub fn span_ref(&self, atomic_ref: &str) -> Option<&str> {
        self.span_refs.get(atomic_ref).map(String::as_str)
    }

    #[must_use]
    pub fn is_synthetic(&self, r: &str) -> bool {
        self.synthetic_refs.contains(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_counts_deserialize_from_flat_object() {
        let counts: SegmentCounts =
            serde_json::from_str(r#"{"Berakhot 2a": 8, "Genesis 1": 31}"#).unwrap();
        assert_eq!(counts.get("Genesis 1"), Some(31));
        assert_eq!(counts.get("Genesis 2"), None);
        assert_eq!(counts.len(), 2);
    }
}
