//! Remote API error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when talking to the text corpus.
#[derive(Debug, Error)]
pub enum SefariaError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The API returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The API answered with an `{"error": ...}` body.
    #[error("upstream error for {endpoint}: {message}")]
    Upstream {
        /// Endpoint that was requested.
        endpoint: String,
        /// The `error` field of the body.
        message: String,
    },

    /// A response did not have the expected shape.
    #[error("parse error for {endpoint}: {source}")]
    Parse {
        /// Endpoint that was requested.
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// The endpoint is not one of `/texts`, `/links` or `/bulktext`.
    #[error("unrecognized endpoint: {0}")]
    UnrecognizedEndpoint(String),

    /// Replay found no recording for an endpoint.
    #[error("no recording for {endpoint} at {}", path.display())]
    MissingRecording {
        /// Endpoint that was requested.
        endpoint: String,
        /// Where the recording was expected.
        path: PathBuf,
    },

    /// Reading or writing a recording failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SefariaError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_decode() && !e.is_builder(),
            Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
