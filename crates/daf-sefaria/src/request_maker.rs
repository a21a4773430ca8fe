//! The `RequestMaker` seam and typed helpers on top of it.

use std::collections::BTreeMap;
use std::future::Future;

use daf_core::TextPayload;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::endpoints::{bulk_text_endpoint, links_endpoint, text_endpoint};
use crate::error::SefariaError;
use crate::types::{TextLink, TextResponse};

/// Fetches the JSON body of an API endpoint such as
/// `/texts/Berakhot%202a?...`.
///
/// Implementations return the body as-is, including `{"error": ...}`
/// bodies; the typed helpers below turn those into errors.
pub trait RequestMaker: Send + Sync {
    fn make_request(
        &self,
        endpoint: &str,
    ) -> impl Future<Output = Result<Value, SefariaError>> + Send;
}

/// Rejects `{"error": ...}` bodies.
///
/// # Errors
///
/// Returns [`SefariaError::Upstream`] carrying the error message.
pub fn reject_error_payload(endpoint: &str, value: Value) -> Result<Value, SefariaError> {
    match value.get("error") {
        Some(error) => Err(SefariaError::Upstream {
            endpoint: endpoint.to_string(),
            message: error.as_str().map_or_else(|| error.to_string(), ToString::to_string),
        }),
        None => Ok(value),
    }
}

async fn fetch<T: DeserializeOwned>(
    maker: &impl RequestMaker,
    endpoint: &str,
) -> Result<T, SefariaError> {
    let value = reject_error_payload(endpoint, maker.make_request(endpoint).await?)?;
    serde_json::from_value(value).map_err(|source| SefariaError::Parse {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// `GET /texts/{ref}`.
///
/// # Errors
///
/// Propagates transport, upstream and parse errors.
pub async fn get_text(maker: &impl RequestMaker, r: &str) -> Result<TextResponse, SefariaError> {
    fetch(maker, &text_endpoint(r)).await
}

/// `GET /links/{ref}`.
///
/// # Errors
///
/// Propagates transport, upstream and parse errors.
pub async fn get_links(maker: &impl RequestMaker, r: &str) -> Result<Vec<TextLink>, SefariaError> {
    fetch(maker, &links_endpoint(r)).await
}

/// `GET /bulktext/{refs}`: `ref → {he, en}` for every ref the corpus knows.
///
/// # Errors
///
/// Propagates transport, upstream and parse errors.
pub async fn get_bulk_text<S: AsRef<str> + Sync>(
    maker: &impl RequestMaker,
    refs: &[S],
    tp: &str,
) -> Result<BTreeMap<String, TextPayload>, SefariaError> {
    fetch(maker, &bulk_text_endpoint(refs, tp)).await
}
