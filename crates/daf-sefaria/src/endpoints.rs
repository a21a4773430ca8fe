//! Endpoint construction and parsing.
//!
//! Ref path segments are percent-encoded; the `|` joining bulk refs is
//! left literal.

use std::borrow::Cow;

use crate::error::SefariaError;

#[must_use]
pub fn text_endpoint(r: &str) -> String {
    format!("/texts/{}?wrapLinks=0&commentary=0&context=0", urlencoding::encode(r))
}

#[must_use]
pub fn links_endpoint(r: &str) -> String {
    format!("/links/{}?with_text=0", urlencoding::encode(r))
}

/// `tp` is a debugging tag naming the requesting page and shard offset.
#[must_use]
pub fn bulk_text_endpoint<S: AsRef<str>>(refs: &[S], tp: &str) -> String {
    let joined = refs
        .iter()
        .map(|r| urlencoding::encode(r.as_ref()))
        .collect::<Vec<_>>()
        .join("|");
    format!("/bulktext/{joined}?useTextFamily=1&tp={}", urlencoding::encode(tp))
}

/// A parsed endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Texts(String),
    Links(String),
    BulkText { refs: Vec<String>, tp: Option<String> },
}

fn decode<'a>(endpoint: &str, part: &'a str) -> Result<Cow<'a, str>, SefariaError> {
    urlencoding::decode(part).map_err(|_| SefariaError::UnrecognizedEndpoint(endpoint.to_string()))
}

impl Endpoint {
    /// Parses an endpoint built by one of the functions above.
    ///
    /// # Errors
    ///
    /// Returns [`SefariaError::UnrecognizedEndpoint`] for any other shape.
    pub fn parse(endpoint: &str) -> Result<Self, SefariaError> {
        let unrecognized = || SefariaError::UnrecognizedEndpoint(endpoint.to_string());
        let (kind, rest) = endpoint
            .strip_prefix('/')
            .and_then(|e| e.split_once('/'))
            .ok_or_else(unrecognized)?;
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        if path.is_empty() {
            return Err(unrecognized());
        }

        match kind {
            "texts" => Ok(Self::Texts(decode(endpoint, path)?.into_owned())),
            "links" => Ok(Self::Links(decode(endpoint, path)?.into_owned())),
            "bulktext" => {
                let refs = path
                    .split('|')
                    .map(|r| decode(endpoint, r).map(Cow::into_owned))
                    .collect::<Result<Vec<_>, _>>()?;
                let tp = query
                    .split('&')
                    .find_map(|pair| pair.strip_prefix("tp="))
                    .map(|tp| decode(endpoint, tp).map(Cow::into_owned))
                    .transpose()?;
                Ok(Self::BulkText { refs, tp })
            }
            _ => Err(unrecognized()),
        }
    }

    /// File name used to record and replay this endpoint's response.
    #[must_use]
    pub fn recording_file_name(&self) -> String {
        let (stem, kind) = match self {
            Self::Texts(r) => (r.as_str(), "texts"),
            Self::Links(r) => (r.as_str(), "links"),
            Self::BulkText { refs, tp } => (
                tp.as_deref().or_else(|| refs.first().map(String::as_str)).unwrap_or("bulk"),
                "bulktext",
            ),
        };
        format!("{}.{kind}.input.json", stem.replace(' ', "_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_encoded_endpoints() {
        assert_eq!(
            text_endpoint("Berakhot 2a"),
            "/texts/Berakhot%202a?wrapLinks=0&commentary=0&context=0"
        );
        assert_eq!(links_endpoint("Berakhot 2a:1"), "/links/Berakhot%202a%3A1?with_text=0");
        assert_eq!(
            bulk_text_endpoint(&["A 1", "B 2"], "Berakhot 2a@0"),
            "/bulktext/A%201|B%202?useTextFamily=1&tp=Berakhot%202a%400"
        );
    }

    #[test]
    fn parses_what_it_builds() {
        assert_eq!(
            Endpoint::parse(&text_endpoint("Rashi on Berakhot 2a:1:1")).unwrap(),
            Endpoint::Texts("Rashi on Berakhot 2a:1:1".to_string())
        );
        assert_eq!(
            Endpoint::parse(&bulk_text_endpoint(&["A 1", "B 2"], "Berakhot 2a@40")).unwrap(),
            Endpoint::BulkText {
                refs: vec!["A 1".to_string(), "B 2".to_string()],
                tp: Some("Berakhot 2a@40".to_string()),
            }
        );
    }

    #[test]
    fn rejects_unknown_endpoints() {
        assert!(Endpoint::parse("/index/Berakhot").is_err());
        assert!(Endpoint::parse("texts/Berakhot").is_err());
        assert!(Endpoint::parse("/texts/").is_err());
    }

    #[test]
    fn recording_names() {
        assert_eq!(
            Endpoint::Links("Berakhot 2a:1".to_string()).recording_file_name(),
            "Berakhot_2a:1.links.input.json"
        );
        let bulk = Endpoint::BulkText { refs: vec![], tp: Some("Berakhot 2a@0".to_string()) };
        assert_eq!(bulk.recording_file_name(), "Berakhot_2a@0.bulktext.input.json");
    }
}
