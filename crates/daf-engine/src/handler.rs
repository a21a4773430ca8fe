//! Page requests: resolve the book, crawl, fetch, assemble.

use daf_core::{Book, BookIndex, CommentaryCatalog, QueryError, StaticTables, TextType};
use daf_sefaria::{RequestMaker, SefariaError, TextResponse, bulk_text_endpoint, get_bulk_text, get_text};

use crate::assemble::{Row, SegmentAssembler, make_sub_ref};
use crate::crawl::{DEFAULT_LINK_DEPTH, DEFAULT_SHARD_SIZE, LinkGraphBuilder};
use crate::error::ApiError;
use crate::patterns::Patterns;
use crate::policy::TextKindPolicy;
use crate::response::{PageResponse, Segment};
use crate::timer::Timer;

/// Default cap on edges visited while building one commentary tree.
pub const DEFAULT_MAX_EDGE_VISITS: usize = 2000;

/// Tuning for the crawl and tree assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub link_depth: usize,
    pub bulk_shard_size: usize,
    pub max_edge_visits: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            link_depth: DEFAULT_LINK_DEPTH,
            bulk_shard_size: DEFAULT_SHARD_SIZE,
            max_edge_visits: DEFAULT_MAX_EDGE_VISITS,
        }
    }
}

/// A rendered page and whether every link lookup behind it succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub page: PageResponse,
    pub complete: bool,
}

/// Renders pages using a [`RequestMaker`] for all remote access.
///
/// Catalogs, tables and patterns are built once and shared by every
/// request.
#[derive(Debug)]
pub struct RequestHandler<R> {
    maker: R,
    books: BookIndex,
    catalog: CommentaryCatalog,
    tables: StaticTables,
    patterns: Patterns,
    options: EngineOptions,
}

impl<R: RequestMaker> RequestHandler<R> {
    /// A handler over the built-in catalogs with empty static tables.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Catalog`] if the built-in catalogs fail to load.
    pub fn new(maker: R) -> Result<Self, ApiError> {
        Ok(Self {
            maker,
            books: BookIndex::builtin()?,
            catalog: CommentaryCatalog::builtin()?,
            tables: StaticTables::default(),
            patterns: Patterns::new()?,
            options: EngineOptions::default(),
        })
    }

    #[must_use]
    pub fn with_tables(mut self, tables: StaticTables) -> Self {
        self.tables = tables;
        self
    }

    #[must_use]
    pub const fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_books(mut self, books: BookIndex) -> Self {
        self.books = books;
        self
    }

    #[must_use]
    pub const fn maker(&self) -> &R {
        &self.maker
    }

    #[must_use]
    pub const fn books(&self) -> &BookIndex {
        &self.books
    }

    /// Looks `name` up as a canonical name, then as an alias.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownBookName`] when neither matches.
    pub fn resolve_book(&self, name: &str) -> Result<&Book, ApiError> {
        self.books
            .by_canonical_name(name)
            .or_else(|| self.books.by_alias(name))
            .ok_or_else(|| QueryError::UnknownBookName(name.to_string()).into())
    }

    /// Renders `page` of `book_name`.
    ///
    /// # Errors
    ///
    /// Fails if the book or page is unknown, if the page's own text cannot
    /// be fetched, or if its rows cannot be assembled. Failed link and
    /// commentary lookups only clear [`RenderedPage::complete`].
    pub async fn render(&self, book_name: &str, page: &str) -> Result<RenderedPage, ApiError> {
        let _timer = Timer::start("handle request");
        let book = self.resolve_book(book_name)?;
        if !book.contains(page) {
            return Err(QueryError::PagesDontExist {
                book: book.canonical_name().to_string(),
                pages: vec![page.to_string()],
            }
            .into());
        }

        let policy = TextKindPolicy::for_book(book);
        let requested_ref = format!("{} {}", book.book_name_for_ref(), book.rewrite_section_ref(page));
        let underlying_refs = book.underlying_refs(page);
        tracing::info!(%requested_ref, ?policy, "rendering page");

        let crawler = LinkGraphBuilder::new(&self.maker, &self.catalog, &self.books, &self.tables)
            .with_policy(policy)
            .with_depth(policy.link_depth(self.options.link_depth))
            .with_shard_size(self.options.bulk_shard_size);
        let (text, graph) = tokio::join!(
            self.text_request(&requested_ref, &underlying_refs),
            crawler.build(&underlying_refs, &requested_ref),
        );
        let text = text?;
        if !graph.is_complete() {
            tracing::warn!(%requested_ref, "link graph incomplete");
        }

        let assembler = SegmentAssembler {
            graph: &graph,
            catalog: &self.catalog,
            books: &self.books,
            tables: &self.tables,
            patterns: &self.patterns,
            policy,
            max_edge_visits: self.options.max_edge_visits,
        };
        let mut sections: Vec<Segment> =
            assembler.assemble(&text)?.into_iter().map(Row::into_segment).collect();
        sections.extend(policy.extra_segments(book, page));

        Ok(RenderedPage {
            page: PageResponse {
                id: policy.make_id(page),
                title: policy.make_title(book, page),
                title_hebrew: policy.make_title_hebrew(book, page),
                sections,
            },
            complete: graph.is_complete(),
        })
    }

    /// [`Self::render`] without the completeness flag.
    ///
    /// # Errors
    ///
    /// See [`Self::render`].
    pub async fn handle_request(&self, book_name: &str, page: &str) -> Result<PageResponse, ApiError> {
        Ok(self.render(book_name, page).await?.page)
    }

    async fn text_request(
        &self,
        requested_ref: &str,
        underlying_refs: &[String],
    ) -> Result<TextResponse, ApiError> {
        match underlying_refs {
            [] => Ok(TextResponse::new(
                requested_ref,
                TextType::List(Vec::new()),
                TextType::List(Vec::new()),
            )),
            [single] => Ok(get_text(&self.maker, single).await?),
            _ => self.stitched_text(requested_ref, underlying_refs).await,
        }
    }

    /// One response made of the texts of several refs, with an explicit
    /// ref for every row.
    async fn stitched_text(
        &self,
        requested_ref: &str,
        underlying_refs: &[String],
    ) -> Result<TextResponse, ApiError> {
        let tp = format!("{requested_ref}@0");
        let mut fetched = get_bulk_text(&self.maker, underlying_refs, &tp).await?;

        let mut he = Vec::new();
        let mut en = Vec::new();
        let mut refs = Vec::new();
        for r in underlying_refs {
            let payload = fetched.remove(r).ok_or_else(|| SefariaError::Upstream {
                endpoint: bulk_text_endpoint(underlying_refs, &tp),
                message: format!("no text for {r}"),
            })?;
            match payload.he {
                TextType::Text(text) => {
                    he.push(TextType::Text(text));
                    en.push(payload.en);
                    refs.push(r.clone());
                }
                TextType::List(items) => {
                    let english = payload.en.into_rows();
                    if english.len() != items.len() {
                        tracing::error!(reference = %r, hebrew = items.len(), english = english.len(), "unmatched text/translation");
                        return Err(ApiError::LengthMismatch { hebrew: items.len(), english: english.len() });
                    }
                    for (i, (item, translation)) in items.into_iter().zip(english).enumerate() {
                        he.push(item);
                        en.push(translation);
                        refs.push(make_sub_ref(r, i));
                    }
                }
            }
        }

        Ok(TextResponse {
            refs_per_sub_text: Some(refs),
            ..TextResponse::new(requested_ref, he, en)
        })
    }
}
