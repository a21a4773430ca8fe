//! # daf-sefaria
//!
//! Client side of the remote text corpus:
//! - Wire types for `/texts`, `/links` and `/bulktext`
//! - Endpoint builders (percent-encoded refs) and an endpoint parser
//! - The [`RequestMaker`] seam the engine depends on, with typed helpers
//! - Implementations: live HTTP with retries, fixture replay, fixture
//!   recording, and an in-memory corpus

mod endpoints;
mod error;
mod http;
mod memory;
mod recorded;
mod request_maker;
mod types;

pub use endpoints::{Endpoint, bulk_text_endpoint, links_endpoint, text_endpoint};
pub use error::SefariaError;
pub use http::{HttpRequestMaker, RetryConfig, check_response};
pub use memory::MemoryRequestMaker;
pub use recorded::{RecordedRequestMaker, RecordingRequestMaker};
pub use request_maker::{RequestMaker, get_bulk_text, get_links, get_text, reject_error_payload};
pub use types::{CollectiveTitle, TextLink, TextResponse};
