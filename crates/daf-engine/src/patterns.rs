//! Compiled patterns shared by every request.

use daf_core::hebrew::strip_hebrew_nonletters;
use daf_core::{CatalogError, TextType};
use regex::Regex;

use crate::html::HtmlRules;

pub(crate) fn compile(pattern: &str) -> Result<Regex, CatalogError> {
    Regex::new(pattern).map_err(|source| CatalogError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Patterns built once at startup and passed by reference into the
/// pipeline.
#[derive(Debug, Clone)]
pub struct Patterns {
    pub html: HtmlRules,
    hadran: Regex,
    sugya_start: Regex,
}

impl Patterns {
    /// # Errors
    ///
    /// Returns [`CatalogError::Pattern`] if a built-in pattern fails to compile.
    pub fn new() -> Result<Self, CatalogError> {
        Ok(Self {
            html: HtmlRules::new()?,
            hadran: compile(r"^((<br>)+<big><strong>)?הדרן עלך .*")?,
            sugya_start: compile(r"^<big>[א-ת]")?,
        })
    }

    /// Whether `text` is the closing Hadran of a chapter. For lists, the
    /// first element decides.
    #[must_use]
    pub fn is_hadran(&self, text: &TextType) -> bool {
        match text {
            TextType::Text(text) => self.is_hadran_text(text),
            TextType::List(items) => items.first().is_some_and(|first| self.is_hadran(first)),
        }
    }

    #[must_use]
    pub fn is_hadran_text(&self, text: &str) -> bool {
        self.hadran.is_match(&strip_hebrew_nonletters(text))
    }

    /// Whether a Steinsaltz comment opens a new sugya.
    #[must_use]
    pub fn is_sugya_start(&self, hebrew: &str) -> bool {
        self.sugya_start.is_match(hebrew)
    }
}
