//! Request-scoped link graph: adjacency by ref, per-edge metadata and the
//! fetched text of every node.

use std::collections::{BTreeMap, HashMap};

use daf_core::TextPayload;
use daf_sefaria::TextLink;
use indexmap::{IndexMap, IndexSet};

/// What is known about an edge `source → target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMetadata {
    pub link: TextLink,
    /// English name of the commentary type the link was classified as.
    pub commentary_type: String,
    /// The link's own target, when it was rewritten to a span ref.
    pub original_refs: Option<Vec<String>>,
    /// Atomic refs covered by the span ref the link was rewritten to.
    pub expanded_refs: Option<Vec<String>>,
}

impl LinkMetadata {
    #[must_use]
    pub fn new(link: TextLink, commentary_type: impl Into<String>) -> Self {
        Self {
            link,
            commentary_type: commentary_type.into(),
            original_refs: None,
            expanded_refs: None,
        }
    }
}

/// Adjacency map keyed by ref, plus edge metadata and fetched texts.
///
/// An edge is recorded at most once. `complete` starts true and is cleared
/// by the first failed lookup; it never becomes true again.
#[derive(Debug, Clone)]
pub struct LinkGraph {
    adjacency: IndexMap<String, IndexSet<String>>,
    edges: HashMap<String, HashMap<String, LinkMetadata>>,
    texts: HashMap<String, TextPayload>,
    complete: bool,
}

impl Default for LinkGraph {
    fn default() -> Self {
        Self {
            adjacency: IndexMap::new(),
            edges: HashMap::new(),
            texts: HashMap::new(),
            complete: true,
        }
    }
}

impl LinkGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `r` already has outgoing edges.
    #[must_use]
    pub fn has_source(&self, r: &str) -> bool {
        self.adjacency.contains_key(r)
    }

    #[must_use]
    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.adjacency.get(source).is_some_and(|targets| targets.contains(target))
    }

    /// Records `source → target`. Returns false if the edge already existed.
    pub fn add_edge(&mut self, source: &str, target: &str, metadata: LinkMetadata) -> bool {
        let targets = self.adjacency.entry(source.to_string()).or_default();
        if !targets.insert(target.to_string()) {
            return false;
        }
        self.edges
            .entry(source.to_string())
            .or_default()
            .insert(target.to_string(), metadata);
        true
    }

    /// Targets of `source`, in insertion order.
    pub fn targets(&self, source: &str) -> impl Iterator<Item = &str> {
        self.adjacency.get(source).into_iter().flatten().map(String::as_str)
    }

    #[must_use]
    pub fn edge(&self, source: &str, target: &str) -> Option<&LinkMetadata> {
        self.edges.get(source)?.get(target)
    }

    /// Number of recorded edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(IndexSet::len).sum()
    }

    /// Every ref that appears as a source or a target, each once.
    #[must_use]
    pub fn refs(&self) -> IndexSet<&str> {
        let mut refs = IndexSet::new();
        for (source, targets) in &self.adjacency {
            refs.insert(source.as_str());
            refs.extend(targets.iter().map(String::as_str));
        }
        refs
    }

    #[must_use]
    pub fn text(&self, r: &str) -> Option<&TextPayload> {
        self.texts.get(r)
    }

    #[must_use]
    pub fn has_text(&self, r: &str) -> bool {
        self.texts.contains_key(r)
    }

    pub fn insert_text(&mut self, r: impl Into<String>, payload: TextPayload) {
        self.texts.insert(r.into(), payload);
    }

    pub fn extend_texts(&mut self, texts: BTreeMap<String, TextPayload>) {
        self.texts.extend(texts);
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    pub const fn mark_incomplete(&mut self) {
        self.complete = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metadata(target: &str) -> LinkMetadata {
        LinkMetadata::new(TextLink::new("Rashi", target, "R"), "Rashi")
    }

    #[test]
    fn edges_are_recorded_once() {
        let mut graph = LinkGraph::new();
        assert!(graph.add_edge("R", "A", metadata("A")));
        assert!(!graph.add_edge("R", "A", metadata("A")));
        assert!(graph.add_edge("R", "B", metadata("B")));

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.targets("R").collect::<Vec<_>>(), vec!["A", "B"]);
        assert!(graph.has_source("R"));
        assert!(!graph.has_source("A"));
        assert_eq!(graph.edge("R", "B").map(|m| m.link.r#ref.as_str()), Some("B"));
    }

    #[test]
    fn refs_lists_sources_and_targets_once() {
        let mut graph = LinkGraph::new();
        graph.add_edge("R", "A", metadata("A"));
        graph.add_edge("A", "R", metadata("R"));
        assert_eq!(graph.refs().into_iter().collect::<Vec<_>>(), vec!["R", "A"]);
    }

    #[test]
    fn completeness_only_degrades() {
        let mut graph = LinkGraph::new();
        assert!(graph.is_complete());
        graph.mark_incomplete();
        graph.add_edge("R", "A", metadata("A"));
        assert!(!graph.is_complete());
    }
}
