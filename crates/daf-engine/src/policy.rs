//! Per-kind rendering behavior, selected from the kind of the book.

use daf_core::{Book, BookKind, CommentaryType, TextType};

use crate::comment::{EXPLANATION, FOOTNOTES, TRANSLATION};
use crate::hadran::hadran_segments;
use crate::html::HtmlRules;
use crate::postprocess::PostProcessor;
use crate::response::Segment;

/// Commentary shown alongside liturgy.
const LITURGY_COMMENTARY: &[&str] =
    &["Verses", "Mishnah", EXPLANATION, TRANSLATION, FOOTNOTES, "Jastrow", "Rashi"];

/// How pages of one kind of book are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKindPolicy {
    Talmud,
    Tanakh,
    Liturgy,
}

impl TextKindPolicy {
    #[must_use]
    pub const fn for_book(book: &Book) -> Self {
        match book.kind() {
            BookKind::Masechet(_) => Self::Talmud,
            BookKind::Bible | BookKind::Synthetic => Self::Tanakh,
            BookKind::Liturgy(_) => Self::Liturgy,
        }
    }

    #[must_use]
    pub fn make_id(self, page: &str) -> String {
        page.to_string()
    }

    #[must_use]
    pub fn make_title(self, book: &Book, page: &str) -> String {
        format!("{} {page}", book.canonical_name())
    }

    #[must_use]
    pub fn make_title_hebrew(self, book: &Book, page: &str) -> String {
        format!("{} {}", book.hebrew_name(), book.hebrew_section_label(page))
    }

    #[must_use]
    pub const fn translate_hebrew_text(self, text: TextType) -> TextType {
        text
    }

    #[must_use]
    pub fn translate_english_text(self, rules: &HtmlRules, text: &TextType) -> TextType {
        rules.standard_english(text)
    }

    /// Page-wide rewrites, in the order they run.
    #[must_use]
    pub const fn post_processors(self) -> &'static [PostProcessor] {
        match self {
            Self::Talmud => &[
                PostProcessor::SugyaStart,
                PostProcessor::Hadran,
                PostProcessor::FootnoteMarkerCleanup,
            ],
            Self::Tanakh => &[PostProcessor::FootnoteMarkerCleanup],
            Self::Liturgy => &[
                PostProcessor::MergePairs,
                PostProcessor::ExplanationPromotion,
                PostProcessor::FootnoteMarkerCleanup,
            ],
        }
    }

    /// Names of the commentary types shown for this kind; `None` means all.
    #[must_use]
    pub const fn applicable_commentary_names(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Talmud | Self::Tanakh => None,
            Self::Liturgy => Some(LITURGY_COMMENTARY),
        }
    }

    #[must_use]
    pub fn is_applicable(self, kind: &CommentaryType) -> bool {
        self.applicable_commentary_names()
            .is_none_or(|names| names.contains(&kind.english_name.as_str()))
    }

    /// Links that point back into the page being rendered.
    #[must_use]
    pub fn ignore_link<S: AsRef<str>>(self, target: &str, root_refs: &[S]) -> bool {
        root_refs.iter().any(|root| {
            let root = root.as_ref();
            target.strip_prefix(root).is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
        })
    }

    /// Segments shown after the page's own rows.
    #[must_use]
    pub fn extra_segments(self, book: &Book, page: &str) -> Vec<Segment> {
        match self {
            Self::Talmud if book.end() == Some(page) => hadran_segments(book),
            _ => Vec::new(),
        }
    }

    /// Crawl depth for this kind given the configured depth. Liturgy only
    /// shows direct links.
    #[must_use]
    pub fn link_depth(self, configured: usize) -> usize {
        match self {
            Self::Liturgy => configured.min(1),
            Self::Talmud | Self::Tanakh => configured,
        }
    }
}
