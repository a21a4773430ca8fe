//! Commentary trees: per-segment comments with nested comments keyed by
//! the ref of the comment they hang off.

use std::collections::HashSet;

use daf_core::{BookIndex, CommentaryCatalog, Removal, TextPayload};
use indexmap::IndexMap;

use crate::comment::{Comment, FOOTNOTES};
use crate::graph::LinkGraph;
use crate::html::HtmlRules;
use crate::response::CommentaryMap;

/// Ordered comments, unique by ref, plus the comments nested under each of
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentaryTree {
    comments: Vec<Comment>,
    nested: IndexMap<String, CommentaryTree>,
}

impl CommentaryTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    #[must_use]
    pub fn contains(&self, r: &str) -> bool {
        self.comments.iter().any(|comment| comment.r#ref == r)
    }

    /// Appends `comment` unless one with the same ref is already present.
    pub fn add_comment(&mut self, comment: Comment) -> bool {
        if self.contains(&comment.r#ref) {
            return false;
        }
        self.comments.push(comment);
        true
    }

    /// Like [`Self::add_comment`], but puts the comment first.
    pub fn prepend_comment(&mut self, comment: Comment) -> bool {
        if self.contains(&comment.r#ref) {
            return false;
        }
        self.comments.insert(0, comment);
        true
    }

    pub fn remove_comment(&mut self, r: &str) {
        self.comments.retain(|comment| comment.r#ref != r);
    }

    /// Comments nested under the comment at `parent_ref`.
    #[must_use]
    pub fn nested(&self, parent_ref: &str) -> Option<&Self> {
        self.nested.get(parent_ref)
    }

    pub fn nested_mut(&mut self, parent_ref: &str) -> &mut Self {
        self.nested.entry(parent_ref.to_string()).or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn clear(&mut self) {
        self.comments.clear();
        self.nested.clear();
    }

    /// Merges `other` into this tree, keeping existing comments on conflicts.
    pub fn absorb(&mut self, other: Self) {
        for comment in other.comments {
            self.add_comment(comment);
        }
        for (parent_ref, nested) in other.nested {
            self.nested_mut(&parent_ref).absorb(nested);
        }
    }

    /// Makes every ref appear once between a level and the level below it,
    /// resolving the innermost levels first.
    ///
    /// A duplicate is dropped from the nested level unless its commentary
    /// type is configured to survive there, in which case the occurrence one
    /// level up is dropped instead.
    pub fn dedupe(&mut self, catalog: &CommentaryCatalog) {
        let top_level: HashSet<String> = self.comments.iter().map(|c| c.r#ref.clone()).collect();
        let mut promoted: Vec<(String, String)> = Vec::new();

        for (parent_ref, nested) in &mut self.nested {
            nested.dedupe(catalog);
            nested.comments.retain(|comment| {
                if !top_level.contains(&comment.r#ref) {
                    return true;
                }
                match catalog.removal_for(&comment.commentary_type) {
                    Removal::TopLevel => {
                        promoted.push((parent_ref.clone(), comment.r#ref.clone()));
                        true
                    }
                    Removal::Nested => false,
                }
            });
        }

        for (parent_ref, r) in promoted {
            self.remove_comment(&r);
            // Nested comments follow their comment down a level.
            if let Some(subtree) = self.nested.shift_remove(&r) {
                self.nested_mut(&parent_ref).nested_mut(&r).absorb(subtree);
            }
        }
    }

    /// Output form: comments grouped by commentary type.
    #[must_use]
    pub fn to_commentary_map(&self) -> CommentaryMap {
        let mut map = CommentaryMap::new();
        for comment in &self.comments {
            let nested = self
                .nested
                .get(&comment.r#ref)
                .map(Self::to_commentary_map)
                .unwrap_or_default();
            map.entry(comment.commentary_type.clone())
                .or_default()
                .comments
                .push(comment.to_api(nested));
        }
        map
    }
}

/// Walks a [`LinkGraph`] from a root ref and builds its commentary tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder<'a> {
    graph: &'a LinkGraph,
    catalog: &'a CommentaryCatalog,
    books: &'a BookIndex,
    rules: &'a HtmlRules,
    max_edge_visits: usize,
}

struct Walk<'r> {
    root: &'r str,
    visits: usize,
    exhausted: bool,
    /// Refs on the current recursion path.
    path: HashSet<String>,
}

impl<'a> TreeBuilder<'a> {
    #[must_use]
    pub const fn new(
        graph: &'a LinkGraph,
        catalog: &'a CommentaryCatalog,
        books: &'a BookIndex,
        rules: &'a HtmlRules,
        max_edge_visits: usize,
    ) -> Self {
        Self { graph, catalog, books, rules, max_edge_visits }
    }

    /// The deduplicated tree of everything reachable from `root`.
    #[must_use]
    pub fn build(&self, root: &str) -> CommentaryTree {
        let mut walk = Walk { root, visits: 0, exhausted: false, path: HashSet::new() };
        let mut tree = CommentaryTree::new();
        self.add_comments(root, &mut tree, &mut walk);
        tree.dedupe(self.catalog);
        tree
    }

    fn add_comments(&self, r: &str, tree: &mut CommentaryTree, walk: &mut Walk<'_>) {
        walk.path.insert(r.to_string());
        for target in self.graph.targets(r) {
            if walk.visits >= self.max_edge_visits {
                if !walk.exhausted {
                    tracing::warn!(
                        root = %walk.root,
                        visits = walk.visits,
                        "edge-visit budget exhausted, truncating commentary"
                    );
                    walk.exhausted = true;
                }
                break;
            }
            walk.visits += 1;

            if walk.path.contains(target) {
                continue;
            }
            let Some(payload) = self.graph.text(target) else { continue };
            if payload.is_empty() {
                continue;
            }
            let Some(metadata) = self.graph.edge(r, target) else { continue };

            let (he, he_footnotes) = self.rules.extract_footnotes_from(&payload.he);
            let (en, en_footnotes) = self.rules.extract_footnotes_from(&payload.en);
            let mut comment = Comment::create(
                metadata,
                target,
                TextPayload { he, en },
                &metadata.commentary_type,
                self.books,
                self.rules,
            );
            let translation = (self.catalog.is_community_translation(&comment.source_ref)
                && comment.en.has_content())
            .then(|| comment.split_translation());

            tree.add_comment(comment);
            if let Some(translation) = translation {
                tree.add_comment(translation);
            }

            let nested = tree.nested_mut(target);
            for i in 0..he_footnotes.len().max(en_footnotes.len()) {
                let footnote = TextPayload::new(
                    he_footnotes.get(i).cloned().unwrap_or_default(),
                    en_footnotes.get(i).cloned().unwrap_or_default(),
                );
                nested.add_comment(Comment::create(
                    metadata,
                    &format!("Footnote {} on {target}", i + 1),
                    footnote,
                    FOOTNOTES,
                    self.books,
                    self.rules,
                ));
            }

            self.add_comments(target, nested, walk);
        }
        walk.path.remove(r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::TRANSLATION;
    use crate::graph::LinkMetadata;
    use daf_sefaria::TextLink;
    use pretty_assertions::assert_eq;

    struct Fixture {
        graph: LinkGraph,
        catalog: CommentaryCatalog,
        books: BookIndex,
        rules: HtmlRules,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                graph: LinkGraph::new(),
                catalog: CommentaryCatalog::builtin().unwrap(),
                books: BookIndex::builtin().unwrap(),
                rules: HtmlRules::new().unwrap(),
            }
        }

        fn edge(&mut self, source: &str, target: &str, kind: &str, he: &str, en: &str) {
            let link = TextLink::new(kind, target, source);
            self.graph.add_edge(source, target, LinkMetadata::new(link, kind));
            self.graph.insert_text(target, TextPayload::new(he, en));
        }

        fn build(&self, root: &str, max_edge_visits: usize) -> CommentaryTree {
            TreeBuilder::new(&self.graph, &self.catalog, &self.books, &self.rules, max_edge_visits)
                .build(root)
        }
    }

    fn refs(tree: &CommentaryTree) -> Vec<&str> {
        tree.comments().iter().map(|c| c.r#ref.as_str()).collect()
    }

    #[test]
    fn nests_comments_under_their_parent() {
        let mut fixture = Fixture::new();
        fixture.edge("R", "Rashi on R:1", "Rashi", "רש", "ra");
        fixture.edge("Rashi on R:1", "Gilyon HaShas on R:1", "Gilyon HaShas", "גה", "gh");

        let tree = fixture.build("R", 2000);
        assert_eq!(refs(&tree), vec!["Rashi on R:1"]);
        let nested = tree.nested("Rashi on R:1").unwrap();
        assert_eq!(refs(nested), vec!["Gilyon HaShas on R:1"]);
    }

    #[test]
    fn skips_targets_without_text() {
        let mut fixture = Fixture::new();
        fixture.edge("R", "Rashi on R:1", "Rashi", "", "");
        let link = TextLink::new("Tosafot", "Tosafot on R:1", "R");
        fixture.graph.add_edge("R", "Tosafot on R:1", LinkMetadata::new(link, "Tosafot"));

        assert!(fixture.build("R", 2000).is_empty());
    }

    #[test]
    fn cycles_stop_at_ancestors() {
        let mut fixture = Fixture::new();
        fixture.edge("R", "A", "Rashi", "א", "a");
        fixture.edge("A", "B", "Tosafot", "ב", "b");
        fixture.edge("B", "A", "Rashi", "א", "a");
        fixture.edge("B", "R", "Rashi", "ר", "r");

        let tree = fixture.build("R", 2000);
        let a = tree.nested("A").unwrap();
        assert_eq!(refs(a), vec!["B"]);
        assert!(a.nested("B").is_none_or(CommentaryTree::is_empty));
    }

    #[test]
    fn remove_top_level_kinds_survive_nested() {
        let mut fixture = Fixture::new();
        fixture.edge("R", "Rashi on R:1", "Rashi", "רש", "ra");
        fixture.edge("R", "Maharsha on R", "Maharsha", "מה", "ma");
        fixture.edge("Rashi on R:1", "Maharsha on R", "Maharsha", "מה", "ma");

        let tree = fixture.build("R", 2000);
        assert_eq!(refs(&tree), vec!["Rashi on R:1"]);
        assert_eq!(refs(tree.nested("Rashi on R:1").unwrap()), vec!["Maharsha on R"]);
    }

    #[test]
    fn other_kinds_keep_the_top_level_copy() {
        let mut fixture = Fixture::new();
        fixture.edge("R", "Rashi on R:1", "Rashi", "רש", "ra");
        fixture.edge("R", "Tosafot on R:1", "Tosafot", "תו", "to");
        fixture.edge("Rashi on R:1", "Tosafot on R:1", "Tosafot", "תו", "to");

        let tree = fixture.build("R", 2000);
        assert_eq!(refs(&tree), vec!["Rashi on R:1", "Tosafot on R:1"]);
        assert!(tree.nested("Rashi on R:1").unwrap().is_empty());
    }

    #[test]
    fn edge_visit_budget_truncates() {
        let mut fixture = Fixture::new();
        for i in 0..5 {
            fixture.edge("R", &format!("Rashi on R:{i}"), "Rashi", "רש", "ra");
        }
        let tree = fixture.build("R", 3);
        assert_eq!(tree.comments().len(), 3);
    }

    #[test]
    fn footnotes_nest_under_their_comment() {
        let mut fixture = Fixture::new();
        fixture.edge(
            "R",
            "Steinsaltz on R:1",
            "Steinsaltz",
            "שט",
            r#"Text<sup>1</sup><i class="footnote">A note</i>"#,
        );

        let tree = fixture.build("R", 2000);
        assert_eq!(tree.comments()[0].en, "Text<sup>1</sup>".into());
        let footnotes = tree.nested("Steinsaltz on R:1").unwrap();
        assert_eq!(footnotes.comments()[0].r#ref, "Footnote 1 on Steinsaltz on R:1");
        assert_eq!(footnotes.comments()[0].commentary_type, FOOTNOTES);
        assert_eq!(footnotes.comments()[0].en, "<sup>1</sup> A note".into());
    }

    #[test]
    fn community_translations_become_siblings() {
        let mut fixture = Fixture::new();
        fixture.edge("R", "Mishnah Berakhot 1:1", "Mishnah", "מאימתי", "From when");

        let tree = fixture.build("R", 2000);
        assert_eq!(refs(&tree), vec!["Mishnah Berakhot 1:1", "Translation of Mishnah Berakhot 1:1"]);
        assert!(tree.comments()[0].en.is_empty());
        assert_eq!(tree.comments()[1].commentary_type, TRANSLATION);

        let map = tree.to_commentary_map();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["Mishnah", "Translation"]);
    }
}
