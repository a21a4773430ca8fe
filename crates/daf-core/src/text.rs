//! Bilingual text values as returned by the corpus API.

use serde::{Deserialize, Deserializer, Serialize};

/// A text body: either a single string or a (possibly nested) list of
/// strings, one per line or sub-segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextType {
    Text(String),
    List(Vec<TextType>),
}

impl Default for TextType {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for TextType {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TextType {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for TextType {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl TextType {
    /// An empty string or an empty list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    /// Whether any string anywhere in the value is non-empty.
    #[must_use]
    pub fn has_content(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::List(items) => items.iter().any(Self::has_content),
        }
    }

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            Self::List(_) => None,
        }
    }

    /// The first string in depth-first order, or the only one.
    #[must_use]
    pub fn first_or_only(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::List(items) => items.first().and_then(Self::first_or_only),
        }
    }

    /// Splits the top level into rows. A plain string is a single row.
    #[must_use]
    pub fn into_rows(self) -> Vec<Self> {
        match self {
            Self::List(items) => items,
            text @ Self::Text(_) => vec![text],
        }
    }

    /// Top-level rows, borrowed.
    #[must_use]
    pub fn rows(&self) -> &[Self] {
        match self {
            Self::List(items) => items,
            text @ Self::Text(_) => std::slice::from_ref(text),
        }
    }

    /// Number of top-level rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self {
            Self::Text(_) => 1,
            Self::List(items) => items.len(),
        }
    }

    /// Whether the first top-level row is itself a list.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        matches!(self, Self::List(items) if matches!(items.first(), Some(Self::List(_))))
    }

    /// Applies `f` to every string, preserving shape.
    #[must_use]
    pub fn map_text(&self, f: &impl Fn(&str) -> String) -> Self {
        match self {
            Self::Text(text) => Self::Text(f(text)),
            Self::List(items) => Self::List(items.iter().map(|item| item.map_text(f)).collect()),
        }
    }

    /// All strings in depth-first order.
    #[must_use]
    pub fn flatten(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Text(text) => out.push(text),
            Self::List(items) => items.iter().for_each(|item| item.collect_into(out)),
        }
    }
}

/// Deserializes `null` as an empty [`TextType`].
///
/// # Errors
///
/// Propagates the deserializer's error for values that are neither null,
/// a string nor a list.
pub fn nullable_text<'de, D>(deserializer: D) -> Result<TextType, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TextType>::deserialize(deserializer)?.unwrap_or_default())
}

/// A Hebrew/English text pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPayload {
    #[serde(default, deserialize_with = "nullable_text")]
    pub he: TextType,
    #[serde(default, deserialize_with = "nullable_text")]
    pub en: TextType,
}

impl TextPayload {
    #[must_use]
    pub fn new(he: impl Into<TextType>, en: impl Into<TextType>) -> Self {
        Self { he: he.into(), en: en.into() }
    }

    /// Both sides empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.he.is_empty() && self.en.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_strings_and_nested_lists() {
        let value: TextType = serde_json::from_str(r#"[["a", "b"], ["c"]]"#).unwrap();
        assert!(value.is_nested());
        assert_eq!(value.flatten(), vec!["a", "b", "c"]);
        assert_eq!(value.row_count(), 2);

        let value: TextType = serde_json::from_str(r#""plain""#).unwrap();
        assert_eq!(value.as_text(), Some("plain"));
        assert_eq!(value.into_rows(), vec![TextType::from("plain")]);
    }

    #[test]
    fn null_payload_fields_become_empty() {
        let payload: TextPayload = serde_json::from_str(r#"{"he": null, "en": ["x"]}"#).unwrap();
        assert!(payload.he.is_empty());
        assert!(!payload.is_empty());
    }

    #[test]
    fn empty_list_and_empty_string_are_empty() {
        assert!(TextPayload::new("", Vec::<String>::new()).is_empty());
        assert!(!TextType::from(vec![""]).is_empty());
        assert!(!TextType::from(vec![""]).has_content());
    }

    #[test]
    fn first_or_only_descends() {
        let value = TextType::List(vec![TextType::from(vec!["first", "second"])]);
        assert_eq!(value.first_or_only(), Some("first"));
        assert_eq!(TextType::List(vec![]).first_or_only(), None);
    }

    #[test]
    fn map_text_preserves_shape() {
        let value = TextType::from(vec!["a", "b"]);
        assert_eq!(value.map_text(&str::to_uppercase), TextType::from(vec!["A", "B"]));
    }
}
