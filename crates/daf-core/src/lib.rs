//! # daf-core
//!
//! Reference algebra, book catalog and commentary classification for daf.
//!
//! Everything in this crate is pure and synchronous:
//! - Book catalog (masechtot, Tanakh, liturgy) and free-text query parsing
//! - Ref comparison, merging and range expansion
//! - Hebrew numerals and search normalization
//! - Commentary-type catalog and link classifier
//! - Bilingual text values and static lookup tables

pub mod books;
pub mod commentary;
pub mod error;
pub mod hebrew;
pub mod refs;
pub mod tables;
pub mod text;

pub use books::{Book, BookIndex, BookKind, QueryGuess, QueryResult};
pub use commentary::{CommentaryCatalog, CommentaryType, LinkTraits, Removal};
pub use error::{CatalogError, QueryError, RefError};
pub use tables::{SegmentCounts, StaticTables};
pub use text::{TextPayload, TextType};
