//! Round-based crawl of the link graph around a page.
//!
//! Each round looks up the links of every ref in its frontier concurrently
//! and joins before the next round starts. Failed lookups mark the graph
//! incomplete and are otherwise skipped.

use daf_core::refs::{expand_ref, merge_refs, sort_refs, split_on_book_name};
use daf_core::{BookIndex, BookKind, CommentaryCatalog, CommentaryType, LinkTraits, StaticTables, TextPayload};
use daf_sefaria::{RequestMaker, TextLink, get_bulk_text, get_links};
use futures::future::join_all;

use crate::graph::{LinkGraph, LinkMetadata};
use crate::policy::TextKindPolicy;
use crate::timer::Timer;

/// Default number of link rounds.
pub const DEFAULT_LINK_DEPTH: usize = 2;

/// Default number of refs per bulk text request.
pub const DEFAULT_SHARD_SIZE: usize = 40;

/// Builds the [`LinkGraph`] for a set of root refs.
#[derive(Debug)]
pub struct LinkGraphBuilder<'a, R> {
    maker: &'a R,
    catalog: &'a CommentaryCatalog,
    books: &'a BookIndex,
    tables: &'a StaticTables,
    policy: TextKindPolicy,
    depth: usize,
    shard_size: usize,
}

/// Per-round inputs shared by every link of the round.
struct Round<'r, S> {
    root_refs: &'r [S],
    remaining: usize,
    next: Vec<String>,
}

impl<'a, R: RequestMaker> LinkGraphBuilder<'a, R> {
    #[must_use]
    pub const fn new(
        maker: &'a R,
        catalog: &'a CommentaryCatalog,
        books: &'a BookIndex,
        tables: &'a StaticTables,
    ) -> Self {
        Self {
            maker,
            catalog,
            books,
            tables,
            policy: TextKindPolicy::Talmud,
            depth: DEFAULT_LINK_DEPTH,
            shard_size: DEFAULT_SHARD_SIZE,
        }
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: TextKindPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    #[must_use]
    pub const fn with_shard_size(mut self, shard_size: usize) -> Self {
        self.shard_size = shard_size;
        self
    }

    /// Crawls links from `root_refs`, then fetches the text of every ref
    /// in the graph outside the roots. `requested_ref` tags the bulk
    /// requests.
    pub async fn build<S: AsRef<str> + Sync>(&self, root_refs: &[S], requested_ref: &str) -> LinkGraph {
        let mut graph = LinkGraph::new();
        let timer = Timer::start("links traversal");
        let mut frontier = merge_refs(root_refs);
        let mut remaining = self.depth;

        while remaining > 0 && !frontier.is_empty() {
            let lookups = frontier.keys().map(|r| get_links(self.maker, r));
            let responses = join_all(lookups).await;

            let mut round = Round { root_refs, remaining, next: Vec::new() };
            for ((r, merged), response) in frontier.iter().zip(responses) {
                match response {
                    Ok(links) => {
                        for link in links {
                            self.add_link(&mut graph, link, merged, &mut round);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(%r, %e, "links request failed");
                        graph.mark_incomplete();
                    }
                }
            }

            tracing::debug!(remaining, edges = graph.edge_count(), next = round.next.len(), "link round finished");
            frontier = merge_refs(&round.next);
            remaining -= 1;
        }
        timer.finish();

        self.fetch_texts(&mut graph, root_refs, requested_ref).await;
        graph
    }

    fn add_link<S: AsRef<str>>(
        &self,
        graph: &mut LinkGraph,
        link: TextLink,
        merged: &[String],
        round: &mut Round<'_, S>,
    ) {
        let traits = LinkTraits {
            name: link.name(),
            category: link.category.as_deref(),
            link_type: link.link_type.as_deref(),
            target_ref: &link.r#ref,
        };
        let Some(kind) = self.catalog.classify(&traits) else {
            tracing::warn!(r#ref = %link.r#ref, name = link.name(), "unclassified link");
            return;
        };
        if !self.policy.is_applicable(kind)
            || (round.remaining < self.depth && kind.flags.ignore_if_not_top_level)
            || self.policy.ignore_link(&link.r#ref, round.root_refs)
        {
            return;
        }

        let source = source_ref(&link, merged, kind);
        let traverses = kind.traverses(link.category.as_deref());
        for (target, metadata) in self.rewrite_targets(link, kind) {
            if graph.has_source(&target) || graph.has_edge(&source, &target) {
                continue;
            }
            graph.add_edge(&source, &target, metadata);
            if round.remaining > 1 && traverses {
                round.next.push(target);
            }
        }
    }

    /// Targets an edge for `link` is recorded under: its span ref for
    /// running commentary on a paginated work, one ref per verse for a bare
    /// Tanakh chapter, otherwise the link's own ref.
    fn rewrite_targets(&self, link: TextLink, kind: &CommentaryType) -> Vec<(String, LinkMetadata)> {
        let target = link.r#ref.clone();
        let mut metadata = LinkMetadata::new(link, kind.english_name.clone());

        if kind.rewrites_to_span(metadata.link.category.as_deref()) {
            if let Some(span) = self.tables.span_ref(&target) {
                let expanded = expand_ref(span, &self.tables.segment_counts).unwrap_or_else(|e| {
                    tracing::debug!(%span, %e, "span ref not expandable");
                    vec![span.to_string()]
                });
                metadata.original_refs = Some(vec![target]);
                metadata.expanded_refs = Some(expanded);
                return vec![(span.to_string(), metadata)];
            }
        }

        match self.verse_count(&target) {
            Some(count) => (1..=count)
                .map(|verse| (format!("{target}:{verse}"), metadata.clone()))
                .collect(),
            None => vec![(target, metadata)],
        }
    }

    /// Verses in `r` when it names a whole Tanakh chapter.
    fn verse_count(&self, r: &str) -> Option<u32> {
        let (title, location) = split_on_book_name(r)?;
        if location.is_empty() || !location.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let book = self.books.by_canonical_name(title)?;
        if !matches!(book.kind(), BookKind::Bible) {
            return None;
        }
        self.tables.segment_counts.get(r)
    }

    async fn fetch_texts<S: AsRef<str>>(&self, graph: &mut LinkGraph, root_refs: &[S], requested_ref: &str) {
        let _timer = Timer::start("fetching secondary texts");
        let (synthetic, mut missing): (Vec<String>, Vec<String>) = graph
            .refs()
            .into_iter()
            .filter(|r| !graph.has_text(r))
            .filter(|r| !root_refs.iter().any(|root| r.starts_with(root.as_ref())))
            .map(ToString::to_string)
            .partition(|r| self.tables.is_synthetic(r));

        for r in synthetic {
            graph.insert_text(r, TextPayload::default());
        }
        if missing.is_empty() {
            return;
        }

        sort_refs(&mut missing);
        let shard_size = self.shard_size.max(1);
        let requests = missing.chunks(shard_size).enumerate().map(|(i, shard)| {
            let tp = format!("{requested_ref}@{}", i * shard_size);
            async move { get_bulk_text(self.maker, shard, &tp).await }
        });
        for result in join_all(requests).await {
            match result {
                Ok(texts) => graph.extend_texts(texts),
                Err(e) => {
                    tracing::warn!(%requested_ref, %e, "bulk text request failed");
                    graph.mark_incomplete();
                }
            }
        }
        tracing::debug!(refs = missing.len(), "fetched secondary texts");
    }
}

/// The anchor a link is attributed to among the refs a merged lookup
/// stands for.
fn source_ref(link: &TextLink, merged: &[String], kind: &CommentaryType) -> String {
    let anchors = &link.anchor_ref_expanded;
    if anchors.is_empty() {
        return link.anchor_ref.clone();
    }
    if kind.flags.attribute_to_last_anchor {
        return anchors[anchors.len() - 1].clone();
    }
    let index = merged
        .iter()
        .filter_map(|r| anchors.iter().position(|anchor| anchor == r))
        .min()
        .unwrap_or(0);
    anchors[index].clone()
}
