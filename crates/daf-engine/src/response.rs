//! JSON shapes returned to callers of the engine.

use daf_core::TextType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Commentary grouped by commentary-type name, in order of first appearance.
pub type CommentaryMap = IndexMap<String, Commentary>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commentary {
    pub comments: Vec<ApiComment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiComment {
    #[serde(rename = "ref")]
    pub r#ref: String,
    pub he: TextType,
    pub en: TextType,
    pub source_ref: String,
    pub source_he_ref: String,
    /// In-app path of the page the comment points to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_refs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded_refs: Option<Vec<String>>,
    /// Comments on this comment.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub commentary: CommentaryMap,
}

/// One row of a rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "ref")]
    pub r#ref: String,
    pub he: TextType,
    pub en: TextType,
    #[serde(default)]
    pub commentary: CommentaryMap,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hadran: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub steinsaltz_start_of_sugya: bool,
}

/// A rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub id: String,
    pub title: String,
    pub title_hebrew: String,
    pub sections: Vec<Segment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn segment_flags_are_omitted_when_false() {
        let segment = Segment {
            r#ref: "Berakhot 2a:1".into(),
            he: "א".into(),
            en: "a".into(),
            ..Segment::default()
        };
        assert_eq!(
            serde_json::to_value(&segment).unwrap(),
            json!({"ref": "Berakhot 2a:1", "he": "א", "en": "a", "commentary": {}})
        );
    }

    #[test]
    fn page_response_uses_camel_case() {
        let page = PageResponse {
            id: "2a".into(),
            title: "Berakhot 2a".into(),
            title_hebrew: "ברכות ב.".into(),
            sections: Vec::new(),
        };
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["titleHebrew"], "ברכות ב.");
    }

    #[test]
    fn nested_commentary_round_trips() {
        let mut nested = CommentaryMap::new();
        nested.insert(
            "Footnotes".into(),
            Commentary {
                comments: vec![ApiComment {
                    r#ref: "Footnote 1 on Rashi on Berakhot 2a:1:1".into(),
                    ..ApiComment::default()
                }],
            },
        );
        let comment = ApiComment {
            r#ref: "Rashi on Berakhot 2a:1:1".into(),
            commentary: nested,
            ..ApiComment::default()
        };
        let text = serde_json::to_string(&comment).unwrap();
        assert!(text.contains(r#""commentary":{"Footnotes""#));
        assert_eq!(serde_json::from_str::<ApiComment>(&text).unwrap(), comment);
    }
}
