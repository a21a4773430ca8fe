//! In-memory corpus for tests and offline runs.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use daf_core::{TextPayload, TextType};
use serde_json::{Map, Value, json};

use crate::endpoints::Endpoint;
use crate::error::SefariaError;
use crate::request_maker::RequestMaker;
use crate::types::{TextLink, TextResponse};

/// Answers `/texts`, `/links` and `/bulktext` from in-memory maps and
/// remembers every endpoint it was asked for.
///
/// Unknown texts answer with an `{"error": ...}` body and unknown refs have
/// no links, as the live API does.
#[derive(Debug, Default)]
pub struct MemoryRequestMaker {
    texts: HashMap<String, TextResponse>,
    links: HashMap<String, Vec<TextLink>>,
    failing: HashSet<String>,
    requested: Mutex<Vec<String>>,
}

impl MemoryRequestMaker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_text(
        mut self,
        r: &str,
        he: impl Into<TextType>,
        en: impl Into<TextType>,
    ) -> Self {
        self.texts.insert(r.to_string(), TextResponse::new(r, he, en));
        self
    }

    #[must_use]
    pub fn with_response(mut self, response: TextResponse) -> Self {
        self.texts.insert(response.r#ref.clone(), response);
        self
    }

    /// Adds links whose anchor is `r`.
    #[must_use]
    pub fn with_links(mut self, r: &str, links: Vec<TextLink>) -> Self {
        self.links.entry(r.to_string()).or_default().extend(links);
        self
    }

    /// Any request naming `r` fails with a 500.
    #[must_use]
    pub fn failing(mut self, r: &str) -> Self {
        self.failing.insert(r.to_string());
        self
    }

    /// Endpoints requested so far, in order.
    #[must_use]
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Parsed form of [`Self::requested`].
    #[must_use]
    pub fn requested_endpoints(&self) -> Vec<Endpoint> {
        self.requested().iter().filter_map(|e| Endpoint::parse(e).ok()).collect()
    }

    fn fail_if_configured(&self, r: &str) -> Result<(), SefariaError> {
        if self.failing.contains(r) {
            return Err(SefariaError::Api { status: 500, message: format!("{r} is configured to fail") });
        }
        Ok(())
    }

    fn answer(&self, endpoint: &Endpoint) -> Result<Value, SefariaError> {
        let to_value = |value: Result<Value, serde_json::Error>| {
            value.map_err(|source| SefariaError::Parse { endpoint: format!("{endpoint:?}"), source })
        };
        match endpoint {
            Endpoint::Texts(r) => {
                self.fail_if_configured(r)?;
                match self.texts.get(r) {
                    Some(response) => to_value(serde_json::to_value(response)),
                    None => Ok(json!({ "error": format!("Unknown ref: {r}") })),
                }
            }
            Endpoint::Links(r) => {
                self.fail_if_configured(r)?;
                to_value(serde_json::to_value(self.links.get(r).cloned().unwrap_or_default()))
            }
            Endpoint::BulkText { refs, .. } => {
                let mut out = Map::new();
                for r in refs {
                    self.fail_if_configured(r)?;
                    if let Some(response) = self.texts.get(r) {
                        let payload = TextPayload::new(response.he.clone(), response.text.clone());
                        out.insert(r.clone(), to_value(serde_json::to_value(payload))?);
                    }
                }
                Ok(Value::Object(out))
            }
        }
    }
}

impl RequestMaker for MemoryRequestMaker {
    async fn make_request(&self, endpoint: &str) -> Result<Value, SefariaError> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(endpoint.to_string());
        self.answer(&Endpoint::parse(endpoint)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request_maker::{get_bulk_text, get_links, get_text};

    #[tokio::test]
    async fn serves_texts_links_and_bulk() {
        let maker = MemoryRequestMaker::new()
            .with_text("Berakhot 2a", vec!["א"], vec!["a"])
            .with_text("Rashi on Berakhot 2a:1:1", "רש", "ra")
            .with_links("Berakhot 2a:1", vec![TextLink::new("Rashi", "Rashi on Berakhot 2a:1:1", "Berakhot 2a:1")]);

        let text = get_text(&maker, "Berakhot 2a").await.unwrap();
        assert_eq!(text.he.flatten(), vec!["א"]);

        let links = get_links(&maker, "Berakhot 2a:1").await.unwrap();
        assert_eq!(links.len(), 1);
        assert!(get_links(&maker, "Berakhot 2a:2").await.unwrap().is_empty());

        let bulk = get_bulk_text(&maker, &["Rashi on Berakhot 2a:1:1", "Missing 1"], "t@0")
            .await
            .unwrap();
        assert_eq!(bulk.len(), 1);
        assert_eq!(bulk["Rashi on Berakhot 2a:1:1"].en.as_text(), Some("ra"));

        assert_eq!(maker.requested().len(), 4);
    }

    #[tokio::test]
    async fn unknown_text_is_an_upstream_error() {
        let maker = MemoryRequestMaker::new();
        let err = get_text(&maker, "Nowhere 1").await.unwrap_err();
        assert!(matches!(err, SefariaError::Upstream { .. }));
    }

    #[tokio::test]
    async fn failing_refs_fail() {
        let maker = MemoryRequestMaker::new().failing("Berakhot 2a:1");
        assert!(get_links(&maker, "Berakhot 2a:1").await.is_err());
    }
}
