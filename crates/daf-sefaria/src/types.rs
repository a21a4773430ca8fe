//! Wire types of the remote corpus API.

use daf_core::text::{TextType, nullable_text};
use serde::{Deserialize, Serialize};

/// Response of `GET /texts/{ref}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextResponse {
    #[serde(rename = "ref")]
    pub r#ref: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub he: TextType,
    #[serde(default, deserialize_with = "nullable_text")]
    pub text: TextType,
    /// One ref per top-level node when a range crosses sections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spanning_refs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_spanning: bool,
    /// Explicit ref of every row, set when the response was stitched
    /// together from several underlying refs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refs_per_sub_text: Option<Vec<String>>,
}

impl TextResponse {
    #[must_use]
    pub fn new(r: impl Into<String>, he: impl Into<TextType>, text: impl Into<TextType>) -> Self {
        Self { r#ref: r.into(), he: he.into(), text: text.into(), ..Self::default() }
    }

    /// A range response whose `i`-th top-level node covers `spanning_refs[i]`.
    #[must_use]
    pub fn spanning(
        r: impl Into<String>,
        he: impl Into<TextType>,
        text: impl Into<TextType>,
        spanning_refs: Vec<String>,
    ) -> Self {
        Self {
            spanning_refs: Some(spanning_refs),
            is_spanning: true,
            ..Self::new(r, he, text)
        }
    }

    #[must_use]
    pub fn has_spanning_refs(&self) -> bool {
        self.is_spanning || self.spanning_refs.as_ref().is_some_and(|refs| !refs.is_empty())
    }
}

/// English and Hebrew collective title of a linked work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectiveTitle {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub he: String,
}

/// One element of `GET /links/{ref}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLink {
    /// Target of the link.
    #[serde(rename = "ref")]
    pub r#ref: String,
    #[serde(default)]
    pub source_ref: String,
    #[serde(default)]
    pub source_he_ref: String,
    /// The (possibly ranged) ref on the requested side of the link.
    #[serde(default)]
    pub anchor_ref: String,
    #[serde(default)]
    pub anchor_ref_expanded: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collective_title: Option<CollectiveTitle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
}

impl TextLink {
    /// A link from `anchor_ref` to `target_ref` by the work titled
    /// `collective_title`.
    #[must_use]
    pub fn new(collective_title: &str, target_ref: &str, anchor_ref: &str) -> Self {
        Self {
            r#ref: target_ref.to_string(),
            source_ref: target_ref.to_string(),
            source_he_ref: target_ref.to_string(),
            anchor_ref: anchor_ref.to_string(),
            anchor_ref_expanded: vec![anchor_ref.to_string()],
            collective_title: Some(CollectiveTitle {
                en: collective_title.to_string(),
                he: String::new(),
            }),
            category: None,
            link_type: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    #[must_use]
    pub fn with_type(mut self, link_type: &str) -> Self {
        self.link_type = Some(link_type.to_string());
        self
    }

    #[must_use]
    pub fn with_anchors(mut self, anchor_ref: &str, expanded: &[&str]) -> Self {
        self.anchor_ref = anchor_ref.to_string();
        self.anchor_ref_expanded = expanded.iter().map(ToString::to_string).collect();
        self
    }

    /// English collective title, or empty.
    #[must_use]
    pub fn name(&self) -> &str {
        self.collective_title.as_ref().map_or("", |title| title.en.as_str())
    }
}
