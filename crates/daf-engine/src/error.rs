//! Engine error types.

use daf_core::{CatalogError, QueryError};
use daf_sefaria::SefariaError;
use serde::Serialize;
use thiserror::Error;

/// Internal error code for failures of the remote corpus.
pub const UPSTREAM_ERROR_CODE: u32 = 1;

/// Internal error code for Hebrew and English rows that cannot be aligned.
pub const LENGTH_MISMATCH_CODE: u32 = 2;

/// Errors that fail a whole page request.
///
/// Every variant maps to an HTTP-like [`status`](Self::status) and an
/// optional internal [`code`](Self::code) for the serving boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The book or page could not be resolved.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The root text could not be fetched.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] SefariaError),

    /// The Hebrew and English arrays have different lengths.
    #[error("Hebrew length != English length ({hebrew} != {english})")]
    LengthMismatch {
        /// Number of Hebrew rows.
        hebrew: usize,
        /// Number of English rows.
        english: usize,
    },

    /// A row could not be split at its configured marker.
    #[error("split marker '{marker}' not found in {}", .r#ref)]
    SplitMarkerNotFound {
        /// Ref of the row being split.
        r#ref: String,
        /// The marker that was searched for.
        marker: String,
    },

    /// A row index has no matching spanning ref.
    #[error("can't find index {index} in the spanning refs of {}", .r#ref)]
    SpanningRef {
        /// The main ref of the text response.
        r#ref: String,
        /// Row index being resolved.
        index: usize,
    },

    /// Built-in engine data failed to load.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Serialized form of an [`ApiError`]: `{"error": ..., "code": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
}

impl ApiError {
    /// HTTP-like status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Query(QueryError::InvalidQuery(_)) => 400,
            Self::Query(_) => 404,
            Self::Upstream(_) => 502,
            Self::LengthMismatch { .. }
            | Self::SplitMarkerNotFound { .. }
            | Self::SpanningRef { .. }
            | Self::Catalog(_) => 500,
        }
    }

    /// Internal error code, when one is assigned.
    #[must_use]
    pub const fn code(&self) -> Option<u32> {
        match self {
            Self::Upstream(_) => Some(UPSTREAM_ERROR_CODE),
            Self::LengthMismatch { .. } => Some(LENGTH_MISMATCH_CODE),
            _ => None,
        }
    }

    #[must_use]
    pub fn body(&self) -> ErrorBody {
        ErrorBody { error: self.to_string(), code: self.code() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn query_errors_map_to_client_statuses() {
        let invalid = ApiError::from(QueryError::InvalidQuery("x is not a valid amud".into()));
        assert_eq!(invalid.status(), 400);
        let unknown = ApiError::from(QueryError::UnknownBookName("Nope".into()));
        assert_eq!(unknown.status(), 404);
        assert_eq!(unknown.code(), None);
    }

    #[test]
    fn mismatch_serializes_with_code() {
        let error = ApiError::LengthMismatch { hebrew: 3, english: 1 };
        assert_eq!(error.status(), 500);
        let body = serde_json::to_value(error.body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"error": "Hebrew length != English length (3 != 1)", "code": 2})
        );
    }

    #[test]
    fn upstream_errors_carry_code_one() {
        let error = ApiError::from(SefariaError::Upstream {
            endpoint: "/texts/X".into(),
            message: "boom".into(),
        });
        assert_eq!(error.status(), 502);
        assert_eq!(error.code(), Some(UPSTREAM_ERROR_CODE));
    }

    #[test]
    fn assembly_errors_name_the_ref() {
        let split = ApiError::SplitMarkerNotFound { r#ref: "Berakhot 2a:3".into(), marker: "גמ׳".into() };
        assert_eq!(split.to_string(), "split marker 'גמ׳' not found in Berakhot 2a:3");
        assert_eq!(split.status(), 500);

        let spanning = ApiError::SpanningRef { r#ref: "Genesis 1:30-2:2".into(), index: 7 };
        assert_eq!(spanning.to_string(), "can't find index 7 in the spanning refs of Genesis 1:30-2:2");
        assert_eq!(spanning.code(), None);
    }
}
