//! Book catalog: masechtot, Tanakh and liturgy, indexed by alias.

mod catalog;
mod query;

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{CatalogError, QueryError};
use crate::hebrew::int_to_hebrew_numeral;

pub use query::{QueryGuess, QueryResult};

/// One side of a Talmud page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    A,
    B,
}

/// Parses an amud like `"20b"` into `(20, Side::B)`.
#[must_use]
pub fn parse_amud(amud: &str) -> Option<(u32, Side)> {
    let side = match amud.chars().last()? {
        'a' => Side::A,
        'b' => Side::B,
        _ => return None,
    };
    let number = &amud[..amud.len() - 1];
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((number.parse().ok()?, side))
}

#[must_use]
pub fn format_amud(daf: u32, side: Side) -> String {
    match side {
        Side::A => format!("{daf}a"),
        Side::B => format!("{daf}b"),
    }
}

/// The page after `page`, for amudim (`2a` → `2b` → `3a`) and numbered
/// chapters (`4` → `5`).
#[must_use]
pub fn next_page_id(page: &str) -> Option<String> {
    if let Some((daf, side)) = parse_amud(page) {
        return Some(match side {
            Side::A => format_amud(daf, Side::B),
            Side::B => format_amud(daf + 1, Side::A),
        });
    }
    if !page.is_empty() && page.bytes().all(|b| b.is_ascii_digit()) {
        return page.parse::<u32>().ok().map(|n| (n + 1).to_string());
    }
    None
}

/// Extra data for a Talmud tractate.
#[derive(Debug, Clone, Default)]
pub struct MasechetInfo {
    /// Hebrew name with vowel points, used for the closing Hadran text.
    pub vocalized_name: String,
    /// Title used in remote refs when it differs from the canonical name.
    pub book_name_for_ref: Option<String>,
    /// Amud → location override for works whose remote structure is not
    /// paginated (e.g. Yerushalmi halachot).
    pub ref_rewriting: HashMap<String, String>,
}

/// Extra data for a liturgical book.
#[derive(Debug, Clone, Default)]
pub struct LiturgyInfo {
    /// Title prefix of the underlying refs.
    pub book_name_for_ref: String,
    /// Section name → underlying refs, in display order.
    pub sections: IndexMap<String, Vec<String>>,
}

/// The variant a book belongs to, which decides how its pages are named
/// and rendered.
#[derive(Debug, Clone)]
pub enum BookKind {
    /// Talmud-style: pages with two sides.
    Masechet(MasechetInfo),
    /// Tanakh: numbered chapters.
    Bible,
    /// Liturgy: named sections.
    Liturgy(LiturgyInfo),
    /// Resolved locally, never fetched.
    Synthetic,
}

/// A book in the catalog. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Book {
    canonical_name: String,
    hebrew_name: String,
    aliases: Vec<String>,
    sections: Vec<String>,
    kind: BookKind,
}

impl Book {
    /// A tractate spanning `start..=end` amudim.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidPage`] if `start` or `end` is not an amud.
    pub fn masechet(
        canonical_name: &str,
        hebrew_name: &str,
        aliases: &[&str],
        start: &str,
        end: &str,
        info: MasechetInfo,
    ) -> Result<Self, CatalogError> {
        let invalid = |page: &str| CatalogError::InvalidPage {
            book: canonical_name.to_string(),
            page: page.to_string(),
        };
        let first = parse_amud(start).ok_or_else(|| invalid(start))?;
        let last = parse_amud(end).ok_or_else(|| invalid(end))?;
        if last < first {
            return Err(invalid(end));
        }

        let mut sections = Vec::new();
        let (mut daf, mut side) = first;
        while (daf, side) <= last {
            sections.push(format_amud(daf, side));
            (daf, side) = match side {
                Side::A => (daf, Side::B),
                Side::B => (daf + 1, Side::A),
            };
        }
        Ok(Self::new(canonical_name, hebrew_name, aliases, sections, BookKind::Masechet(info)))
    }

    /// A Tanakh book with chapters `1..=chapters`.
    #[must_use]
    pub fn bible(canonical_name: &str, hebrew_name: &str, aliases: &[&str], chapters: u32) -> Self {
        let sections = (1..=chapters).map(|n| n.to_string()).collect();
        Self::new(canonical_name, hebrew_name, aliases, sections, BookKind::Bible)
    }

    #[must_use]
    pub fn liturgy(canonical_name: &str, hebrew_name: &str, aliases: &[&str], info: LiturgyInfo) -> Self {
        let sections = info.sections.keys().cloned().collect();
        Self::new(canonical_name, hebrew_name, aliases, sections, BookKind::Liturgy(info))
    }

    #[must_use]
    pub fn synthetic(canonical_name: &str, hebrew_name: &str, sections: &[&str]) -> Self {
        let sections = sections.iter().map(ToString::to_string).collect();
        Self::new(canonical_name, hebrew_name, &[], sections, BookKind::Synthetic)
    }

    fn new(
        canonical_name: &str,
        hebrew_name: &str,
        aliases: &[&str],
        sections: Vec<String>,
        kind: BookKind,
    ) -> Self {
        let mut all_aliases: Vec<String> = aliases.iter().map(ToString::to_string).collect();
        all_aliases.push(hebrew_name.to_string());
        Self {
            canonical_name: canonical_name.to_string(),
            hebrew_name: hebrew_name.to_string(),
            aliases: all_aliases,
            sections,
            kind,
        }
    }

    #[must_use]
    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    #[must_use]
    pub fn hebrew_name(&self) -> &str {
        &self.hebrew_name
    }

    /// Alternate spellings, always including the Hebrew name.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    #[must_use]
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    #[must_use]
    pub const fn kind(&self) -> &BookKind {
        &self.kind
    }

    #[must_use]
    pub const fn is_masechet(&self) -> bool {
        matches!(self.kind, BookKind::Masechet(_))
    }

    /// What one section of this book is called in messages.
    #[must_use]
    pub const fn section_word(&self) -> &'static str {
        match self.kind {
            BookKind::Masechet(_) => "amud",
            BookKind::Bible => "chapter",
            BookKind::Liturgy(_) | BookKind::Synthetic => "section",
        }
    }

    #[must_use]
    pub fn start(&self) -> Option<&str> {
        self.sections.first().map(String::as_str)
    }

    #[must_use]
    pub fn end(&self) -> Option<&str> {
        self.sections.last().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, section: &str) -> bool {
        matches!(self.kind, BookKind::Synthetic) || self.sections.iter().any(|s| s == section)
    }

    fn section_index(&self, section: &str) -> Option<usize> {
        self.sections.iter().position(|s| s == section)
    }

    #[must_use]
    pub fn next_page(&self, section: &str) -> Option<&str> {
        let index = self.section_index(section)?;
        self.sections.get(index + 1).map(String::as_str)
    }

    #[must_use]
    pub fn previous_page(&self, section: &str) -> Option<&str> {
        let index = self.section_index(section)?;
        index.checked_sub(1).and_then(|i| self.sections.get(i)).map(String::as_str)
    }

    /// Title used when building remote refs for this book.
    #[must_use]
    pub fn book_name_for_ref(&self) -> &str {
        match &self.kind {
            BookKind::Masechet(MasechetInfo { book_name_for_ref: Some(name), .. }) => name,
            BookKind::Liturgy(info) => &info.book_name_for_ref,
            _ => &self.canonical_name,
        }
    }

    /// Location to request for `section`, after any per-work rewriting.
    #[must_use]
    pub fn rewrite_section_ref(&self, section: &str) -> String {
        match &self.kind {
            BookKind::Masechet(info) => info
                .ref_rewriting
                .get(section)
                .cloned()
                .unwrap_or_else(|| section.to_string()),
            _ => section.to_string(),
        }
    }

    /// The remote refs whose text makes up `section`.
    #[must_use]
    pub fn underlying_refs(&self, section: &str) -> Vec<String> {
        match &self.kind {
            BookKind::Liturgy(info) => info.sections.get(section).cloned().unwrap_or_default(),
            BookKind::Synthetic => Vec::new(),
            BookKind::Masechet(_) | BookKind::Bible => {
                vec![format!("{} {}", self.book_name_for_ref(), self.rewrite_section_ref(section))]
            }
        }
    }

    /// Hebrew label for `section`: `ב.`/`ב:` for amudim, a numeral for
    /// chapters, the section name otherwise.
    #[must_use]
    pub fn hebrew_section_label(&self, section: &str) -> String {
        match &self.kind {
            BookKind::Masechet(_) => match parse_amud(section) {
                Some((daf, Side::A)) => format!("{}.", int_to_hebrew_numeral(daf)),
                Some((daf, Side::B)) => format!("{}:", int_to_hebrew_numeral(daf)),
                None => section.to_string(),
            },
            BookKind::Bible => section
                .parse::<u32>()
                .map_or_else(|_| section.to_string(), int_to_hebrew_numeral),
            BookKind::Liturgy(_) | BookKind::Synthetic => section.to_string(),
        }
    }
}

/// Lowercases, drops `'` and `-`, treats `_` as a space and collapses
/// whitespace.
#[must_use]
pub fn normalize_alias(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\'' | '-'))
        .map(|c| if c == '_' { ' ' } else { c })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// All known books, indexed by canonical name and normalized alias.
#[derive(Debug, Clone)]
pub struct BookIndex {
    books: Vec<Book>,
    by_canonical_name: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl BookIndex {
    /// Builds an index. On alias collisions the first book wins.
    #[must_use]
    pub fn new(books: Vec<Book>) -> Self {
        let mut by_canonical_name = HashMap::new();
        let mut by_alias: HashMap<String, usize> = HashMap::new();
        for (index, book) in books.iter().enumerate() {
            by_canonical_name.insert(book.canonical_name.clone(), index);
            let names = std::iter::once(&book.canonical_name).chain(&book.aliases);
            for name in names {
                let key = normalize_alias(name);
                if let Some(&existing) = by_alias.get(&key) {
                    if existing != index {
                        tracing::warn!(
                            alias = %name,
                            kept = %books[existing].canonical_name,
                            dropped = %book.canonical_name,
                            "duplicate book alias"
                        );
                    }
                    continue;
                }
                by_alias.insert(key, index);
            }
        }
        Self { books, by_canonical_name, by_alias }
    }

    /// The built-in catalog of masechtot, Tanakh and liturgy.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the built-in data is inconsistent.
    pub fn builtin() -> Result<Self, CatalogError> {
        Ok(Self::new(catalog::builtin_books()?))
    }

    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.iter()
    }

    #[must_use]
    pub fn by_canonical_name(&self, name: &str) -> Option<&Book> {
        self.by_canonical_name.get(name).map(|&i| &self.books[i])
    }

    #[must_use]
    pub fn by_alias(&self, name: &str) -> Option<&Book> {
        self.by_alias.get(&normalize_alias(name)).map(|&i| &self.books[i])
    }

    /// Parses a free-text query such as `"Brachot 20a"` or `"Genesis 1 to 3"`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownBookName`] when no alias matches the
    /// title, or [`QueryError::InvalidQuery`] when the location tokens are
    /// malformed.
    pub fn parse(&self, query: &str) -> Result<QueryResult, QueryError> {
        query::parse(self, query)
    }

    /// Queries with a near-miss title replaced by a catalog title, closest
    /// first. Empty when the query has no location or nothing is close.
    #[must_use]
    pub fn guesses(&self, query: &str) -> Vec<QueryGuess> {
        query::guesses(self, query)
    }

    /// Checks that every page in `result` is a section of its book.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::PagesDontExist`] listing the missing pages, or
    /// [`QueryError::UnknownBookName`] if the book is not in the index.
    pub fn validate_pages(&self, result: &QueryResult) -> Result<(), QueryError> {
        let book = self
            .by_canonical_name(&result.book)
            .ok_or_else(|| QueryError::UnknownBookName(result.book.clone()))?;
        let missing: Vec<String> = std::iter::once(&result.start)
            .chain(result.end.as_ref())
            .filter(|page| !book.contains(page))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(QueryError::PagesDontExist { book: result.book.clone(), pages: missing })
        }
    }

    /// Resolves a remote ref like `"Shabbat 31a:4"` to an internal page,
    /// when it points into a masechet or Tanakh book of the catalog.
    #[must_use]
    pub fn internal_page(&self, r: &str) -> Option<QueryResult> {
        let page_ref = crate::refs::strip_segment_number(r);
        let (title, page) = crate::refs::split_on_book_name(page_ref)?;
        let book = self.by_canonical_name(title)?;
        match book.kind() {
            BookKind::Masechet(_) | BookKind::Bible if book.contains(page) => Some(QueryResult {
                book: book.canonical_name.clone(),
                start: page.to_string(),
                end: None,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn amud_successor() {
        assert_eq!(next_page_id("2a").as_deref(), Some("2b"));
        assert_eq!(next_page_id("2b").as_deref(), Some("3a"));
        assert_eq!(next_page_id("9").as_deref(), Some("10"));
        assert_eq!(next_page_id("1.1.1"), None);
    }

    #[test]
    fn masechet_sections_cover_start_to_end() {
        let book =
            Book::masechet("Tamid", "תמיד", &["Tammid"], "25b", "27a", MasechetInfo::default())
                .unwrap();
        assert_eq!(book.sections(), ["25b", "26a", "26b", "27a"]);
        assert_eq!(book.next_page("26b"), Some("27a"));
        assert_eq!(book.previous_page("25b"), None);
        assert_eq!(book.aliases(), ["Tammid", "תמיד"]);
    }

    #[test]
    fn reversed_masechet_bounds_are_rejected() {
        assert!(Book::masechet("X", "x", &[], "5a", "2a", MasechetInfo::default()).is_err());
        assert!(Book::masechet("X", "x", &[], "2c", "5a", MasechetInfo::default()).is_err());
    }

    #[test]
    fn hebrew_labels() {
        let index = BookIndex::builtin().unwrap();
        let berakhot = index.by_canonical_name("Berakhot").unwrap();
        assert_eq!(berakhot.hebrew_section_label("2a"), "ב.");
        assert_eq!(berakhot.hebrew_section_label("20b"), "כ:");
        let psalms = index.by_canonical_name("Psalms").unwrap();
        assert_eq!(psalms.hebrew_section_label("119"), "קיט");
    }

    #[test]
    fn aliases_are_normalized() {
        assert_eq!(normalize_alias("  Rosh_Ha-shana "), "rosh hashana");
        assert_eq!(normalize_alias("Mo'ed  Katan"), "moed katan");
        let index = BookIndex::builtin().unwrap();
        assert_eq!(index.by_alias("BRACHOT").map(Book::canonical_name), Some("Berakhot"));
        assert_eq!(index.by_alias("ברכות").map(Book::canonical_name), Some("Berakhot"));
    }

    #[test]
    fn colliding_aliases_keep_the_first_book() {
        let index = BookIndex::new(vec![
            Book::bible("Genesis", "בראשית", &["Bereshit"], 50),
            Book::bible("Bereshit Rabbah", "בראשית רבה", &["Bereshit"], 100),
        ]);
        assert_eq!(index.by_alias("bereshit").map(Book::canonical_name), Some("Genesis"));
        assert_eq!(index.by_canonical_name("Bereshit Rabbah").map(Book::canonical_name), Some("Bereshit Rabbah"));
    }

    #[test]
    fn rewritten_refs_use_the_remote_title() {
        let index = BookIndex::builtin().unwrap();
        let shekalim = index.by_canonical_name("Shekalim").unwrap();
        assert_eq!(shekalim.book_name_for_ref(), "Jerusalem Talmud Shekalim");
        assert_eq!(shekalim.underlying_refs("2a"), vec!["Jerusalem Talmud Shekalim 1.1.1-16"]);

        let berakhot = index.by_canonical_name("Berakhot").unwrap();
        assert_eq!(berakhot.underlying_refs("2a"), vec!["Berakhot 2a"]);
    }

    #[test]
    fn validates_pages() {
        let index = BookIndex::builtin().unwrap();
        let result = QueryResult {
            book: "Berakhot".to_string(),
            start: "2a".to_string(),
            end: Some("65a".to_string()),
        };
        assert_eq!(
            index.validate_pages(&result),
            Err(QueryError::PagesDontExist {
                book: "Berakhot".to_string(),
                pages: vec!["65a".to_string()],
            })
        );
        let result = QueryResult { end: Some("64a".to_string()), ..result };
        assert_eq!(index.validate_pages(&result), Ok(()));
    }

    #[test]
    fn internal_page_of_remote_ref() {
        let index = BookIndex::builtin().unwrap();
        let page = index.internal_page("Shabbat 31a:4").unwrap();
        assert_eq!(page.to_url_pathname(), "/Shabbat/31a");
        assert!(index.internal_page("Rashi on Shabbat 31a:4:1").is_none());
        assert!(index.internal_page("Shabbat 200a:1").is_none());
    }
}
