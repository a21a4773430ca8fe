//! # daf-engine
//!
//! Turns a book and page into a rendered page with nested commentary:
//! - Link graph crawl in concurrent, depth-limited rounds
//! - Commentary trees with footnotes, cycle guards and deduplication
//! - Segment assembly: row alignment, row refs, splits and post-processing
//! - Per-kind rendering policies (Talmud, Tanakh, liturgy)
//! - The page request handler and its caching wrapper

pub mod assemble;
pub mod cached;
pub mod comment;
pub mod crawl;
pub mod error;
pub mod graph;
pub mod hadran;
pub mod handler;
pub mod html;
pub mod patterns;
pub mod policy;
pub mod postprocess;
pub mod response;
pub mod timer;
pub mod tree;

pub use assemble::{Row, SegmentAssembler};
pub use cached::CachedRequestHandler;
pub use comment::Comment;
pub use crawl::LinkGraphBuilder;
pub use error::{ApiError, ErrorBody};
pub use graph::{LinkGraph, LinkMetadata};
pub use handler::{EngineOptions, RenderedPage, RequestHandler};
pub use patterns::Patterns;
pub use policy::TextKindPolicy;
pub use postprocess::PostProcessor;
pub use response::{ApiComment, Commentary, CommentaryMap, PageResponse, Segment};
pub use tree::{CommentaryTree, TreeBuilder};
