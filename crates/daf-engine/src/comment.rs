//! A single comment and the normalization applied when it is created.

use daf_core::refs::strip_segment_number;
use daf_core::{BookIndex, TextPayload, TextType};

use crate::graph::LinkMetadata;
use crate::html::HtmlRules;
use crate::response::{ApiComment, CommentaryMap};

pub const EXPLANATION: &str = "Explanation";
pub const FOOTNOTES: &str = "Footnotes";
pub const MESORAT_HASHAS: &str = "Mesorat Hashas";
pub const MISHNEH_TORAH: &str = "Mishneh Torah";
pub const STEINSALTZ: &str = "Steinsaltz";
pub const TRANSLATION: &str = "Translation";

/// A comment on a segment or on another comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    /// English name of the commentary type.
    pub commentary_type: String,
    pub r#ref: String,
    pub he: TextType,
    pub en: TextType,
    pub source_ref: String,
    pub source_he_ref: String,
    pub link: Option<String>,
    pub original_refs: Option<Vec<String>>,
    pub expanded_refs: Option<Vec<String>>,
}

/// Drops geresh and gershayim from the last word of a Hebrew ref, when that
/// word is a `chapter:verse` style location.
#[must_use]
pub fn strip_ref_quotation_marks(r: &str) -> String {
    match r.rsplit_once(' ') {
        Some((head, last)) if last.contains(':') => {
            format!("{head} {}", last.replace(['׳', '״'], ""))
        }
        None if r.contains(':') => r.replace(['׳', '״'], ""),
        _ => r.to_string(),
    }
}

impl Comment {
    /// Builds the comment at `r` reached through the edge described by
    /// `metadata`.
    #[must_use]
    pub fn create(
        metadata: &LinkMetadata,
        r: &str,
        payload: TextPayload,
        commentary_type: &str,
        books: &BookIndex,
        rules: &HtmlRules,
    ) -> Self {
        let TextPayload { he, en } = payload;
        let en = if he == en {
            tracing::debug!(%r, "identical hebrew and english");
            TextType::default()
        } else {
            rules.standard_english(&en)
        };
        let he = rules.hebrew_comment(&he, commentary_type);

        let mut source_ref = metadata.link.source_ref.clone();
        let mut source_he_ref = metadata.link.source_he_ref.clone();
        let internal_page = books.internal_page(&source_ref);
        if commentary_type == MESORAT_HASHAS && internal_page.is_some() {
            source_ref = strip_segment_number(&source_ref).to_string();
            source_he_ref = strip_segment_number(&source_he_ref).to_string();
        } else {
            source_he_ref = strip_ref_quotation_marks(&source_he_ref);
        }

        if commentary_type == MISHNEH_TORAH {
            if let Some(rest) = source_ref.strip_prefix("Mishneh Torah, ") {
                source_ref = rest.to_string();
            }
            if let Some(rest) = source_he_ref.strip_prefix("משנה תורה, ") {
                source_he_ref = rest.to_string();
            }
        }

        Self {
            commentary_type: commentary_type.to_string(),
            r#ref: r.to_string(),
            he,
            en,
            source_ref,
            source_he_ref,
            link: internal_page.map(|page| page.to_url_pathname()),
            original_refs: metadata.original_refs.clone(),
            expanded_refs: metadata.expanded_refs.clone(),
        }
    }

    /// Moves the English text into a sibling `Translation` comment.
    #[must_use]
    pub fn split_translation(&mut self) -> Self {
        let en = std::mem::take(&mut self.en);
        Self {
            commentary_type: TRANSLATION.to_string(),
            r#ref: format!("Translation of {}", self.r#ref),
            he: TextType::default(),
            en,
            link: None,
            original_refs: None,
            expanded_refs: None,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn to_api(&self, commentary: CommentaryMap) -> ApiComment {
        ApiComment {
            r#ref: self.r#ref.clone(),
            he: self.he.clone(),
            en: self.en.clone(),
            source_ref: self.source_ref.clone(),
            source_he_ref: self.source_he_ref.clone(),
            link: self.link.clone(),
            original_refs: self.original_refs.clone(),
            expanded_refs: self.expanded_refs.clone(),
            commentary,
        }
    }
}
