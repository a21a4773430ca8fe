//! Error types for query parsing, ref expansion and catalog construction.

use thiserror::Error;

/// Errors produced while parsing a free-text query into a [`QueryResult`](crate::QueryResult).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The query text is malformed. The message names the offending tokens.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// No book in the catalog matches the query's title.
    #[error("unknown book name: {0}")]
    UnknownBookName(String),

    /// The query parsed, but one or more pages are not sections of the book.
    #[error("{book} does not contain {}", pages.join(", "))]
    PagesDontExist {
        /// Canonical book name.
        book: String,
        /// The requested pages that are missing.
        pages: Vec<String>,
    },
}

/// Errors produced by [`expand_ref`](crate::refs::expand_ref).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefError {
    /// The ref could not be split into a title and a location.
    #[error("malformed ref: {0}")]
    Malformed(String),

    /// The range's end precedes its start, or the two ends are incompatible.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// A page inside the range has no entry in the segment-count table.
    #[error("no segment count for {0}")]
    MissingSegmentCount(String),

    /// The page identifier has no known successor.
    #[error("cannot step past page {page} in {range}")]
    UnknownPageFormat {
        /// The page that could not be advanced.
        page: String,
        /// The range being expanded.
        range: String,
    },
}

/// Errors produced while building static catalogs.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A built-in or configured pattern failed to compile.
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        /// The pattern source text.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// A page identifier in the catalog data cannot be interpreted.
    #[error("invalid page '{page}' for {book}")]
    InvalidPage {
        /// Book being constructed.
        book: String,
        /// The bad page identifier.
        page: String,
    },
}
