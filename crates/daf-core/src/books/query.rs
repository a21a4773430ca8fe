//! Free-text query parsing: `"Brachot 20"`, `"ברכות ב:"`, `"Genesis 1 to 3"`.

use serde::{Deserialize, Serialize};

use super::{Book, BookIndex, BookKind};
use crate::error::QueryError;
use crate::hebrew::hebrew_numeral_to_int;

/// A parsed query: a book and a page or page range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Canonical book name.
    pub book: String,
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl QueryResult {
    /// Site path for this result, e.g. `/Rosh_Hashanah/2a` or `/Genesis/1-3`.
    #[must_use]
    pub fn to_url_pathname(&self) -> String {
        let book = self.book.replace(' ', "_");
        match &self.end {
            Some(end) => format!("/{book}/{}-{end}", self.start),
            None => format!("/{book}/{}", self.start),
        }
    }
}

/// A near-miss title rewritten into a query that parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryGuess {
    pub text: String,
    pub url: String,
}

/// How one location token reads for a paginated book.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AmudToken {
    /// A single side, e.g. `20a`.
    Amud(String),
    /// A whole daf (both sides), e.g. `20`, `כ`, `20ab`.
    FullDaf(u32),
}

fn parse_daf_number(text: &str) -> Option<u32> {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse().ok();
    }
    hebrew_numeral_to_int(text)
}

fn parse_amud_token(token: &str) -> Option<AmudToken> {
    if let Some(number) = token.strip_suffix("ab") {
        if (1..=3).contains(&number.len()) && number.bytes().all(|b| b.is_ascii_digit()) {
            return number.parse().ok().map(AmudToken::FullDaf);
        }
    }
    if let Some(daf) = parse_daf_number(token) {
        return Some(AmudToken::FullDaf(daf));
    }

    let last = token.chars().last()?;
    let body = &token[..token.len() - last.len_utf8()];
    let daf = parse_daf_number(body)?;
    match last {
        'a' | '.' => Some(AmudToken::Amud(format!("{daf}a"))),
        'b' | ':' => Some(AmudToken::Amud(format!("{daf}b"))),
        _ => None,
    }
}

/// Chapters are plain integers only, with no sign or leading zeros.
fn parse_chapter_token(token: &str) -> Option<String> {
    let number = token.parse::<u32>().ok()?;
    (number.to_string() == token).then(|| token.to_string())
}

fn format_list(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

fn invalid_tokens(invalid: &[&str], singular: &str, plural: &str) -> QueryError {
    let message = if invalid.len() == 1 {
        format!("{} is not a valid {singular}", invalid[0])
    } else {
        format!("{} are not valid {plural}", format_list(invalid))
    };
    QueryError::InvalidQuery(message)
}

/// Range separators: `-` and `to`.
fn is_range_separator(token: &str) -> bool {
    token == "-" || token.eq_ignore_ascii_case("to")
}

/// Splits `2-3a` into `2`, `-`, `3a`. Empty sides are dropped, so `-1`
/// becomes `-`, `1` and fails later as a malformed range.
fn split_dashes(tokens: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    for token in tokens {
        match token.split_once('-') {
            Some((before, after)) if *token != "-" => {
                if !before.is_empty() {
                    out.push(before.to_string());
                }
                out.push("-".to_string());
                if !after.is_empty() {
                    out.push(after.to_string());
                }
            }
            _ => out.push((*token).to_string()),
        }
    }
    out
}

fn find_title<'a>(index: &'a BookIndex, tokens: &[&str]) -> Option<(&'a Book, usize)> {
    (1..=tokens.len())
        .rev()
        .find_map(|n| index.by_alias(&tokens[..n].join(" ")).map(|book| (book, n)))
}

pub(super) fn parse(index: &BookIndex, query: &str) -> Result<QueryResult, QueryError> {
    let tokens: Vec<&str> = query.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(QueryError::InvalidQuery("empty query".to_string()));
    }

    let (book, consumed) =
        find_title(index, &tokens).ok_or_else(|| QueryError::UnknownBookName(tokens.join(" ")))?;
    let rest = split_dashes(&tokens[consumed..]);
    let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
    let name = book.canonical_name().to_string();

    if rest.iter().all(|token| *token == "-") {
        return Err(QueryError::InvalidQuery(format!(
            "No {} specified in query: \"{}\"",
            book.section_word(),
            tokens.join(" ")
        )));
    }

    let (start, end) = match rest.as_slice() {
        [single] => (*single, None),
        [start, separator, end] if is_range_separator(separator) => (*start, Some(*end)),
        _ => {
            return Err(QueryError::InvalidQuery(format!(
                "could not understand \"{}\"",
                rest.join(" ")
            )));
        }
    };

    match book.kind() {
        BookKind::Masechet(_) => parse_amud_range(name, start, end),
        BookKind::Bible => parse_chapter_range(name, start, end),
        BookKind::Liturgy(_) | BookKind::Synthetic => parse_named_section(book, &rest),
    }
}

/// Case-insensitive Levenshtein distance over chars.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Distance relative to the length of the name it was measured against.
#[derive(Debug, Clone, Copy)]
struct Closeness {
    distance: usize,
    length: usize,
}

impl Closeness {
    fn cmp_ratio(self, other: Self) -> std::cmp::Ordering {
        (self.distance * other.length).cmp(&(other.distance * self.length))
    }

    /// At most half the name differs.
    const fn is_close(self) -> bool {
        self.distance * 2 <= self.length
    }
}

/// Canonical names whose title or an alias is close to `title`, closest
/// first.
fn book_guesses<'a>(index: &'a BookIndex, title: &str) -> Vec<&'a str> {
    let mut candidates: Vec<(Closeness, &str)> = index
        .books()
        .filter_map(|book| {
            std::iter::once(book.canonical_name())
                .chain(book.aliases().iter().map(String::as_str))
                .map(|option| Closeness {
                    distance: edit_distance(option, title),
                    length: option.chars().count().max(1),
                })
                .min_by(|a, b| a.cmp_ratio(*b))
                .filter(|closeness| closeness.is_close())
                .map(|closeness| (closeness, book.canonical_name()))
        })
        .collect();
    candidates.sort_by(|a, b| a.0.cmp_ratio(b.0));
    candidates.into_iter().map(|(_, name)| name).collect()
}

pub(super) fn guesses(index: &BookIndex, query: &str) -> Vec<QueryGuess> {
    let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
    let Some((possible_book, possible_page)) = query.rsplit_once(' ') else {
        return Vec::new();
    };
    book_guesses(index, possible_book)
        .into_iter()
        .filter_map(|name| {
            let text = format!("{name} {possible_page}");
            let url = parse(index, &text).ok()?.to_url_pathname();
            Some(QueryGuess { text, url })
        })
        .collect()
}

fn parse_amud_range(book: String, start: &str, end: Option<&str>) -> Result<QueryResult, QueryError> {
    let parsed_start = parse_amud_token(start);
    let parsed_end = end.map(parse_amud_token);

    let mut invalid = Vec::new();
    if parsed_start.is_none() {
        invalid.push(start);
    }
    if let (Some(None), Some(end)) = (&parsed_end, end) {
        invalid.push(end);
    }
    if !invalid.is_empty() {
        return Err(invalid_tokens(&invalid, "amud", "amudim"));
    }

    let (Some(parsed_start), parsed_end) = (parsed_start, parsed_end.flatten()) else {
        return Err(invalid_tokens(&[start], "amud", "amudim"));
    };

    Ok(match (parsed_start, parsed_end) {
        (AmudToken::Amud(amud), None) => QueryResult { book, start: amud, end: None },
        (AmudToken::FullDaf(daf), None) => QueryResult {
            book,
            start: format!("{daf}a"),
            end: Some(format!("{daf}b")),
        },
        (start, Some(end)) => QueryResult {
            book,
            start: match start {
                AmudToken::Amud(amud) => amud,
                AmudToken::FullDaf(daf) => format!("{daf}a"),
            },
            end: Some(match end {
                AmudToken::Amud(amud) => amud,
                AmudToken::FullDaf(daf) => format!("{daf}b"),
            }),
        },
    })
}

fn parse_chapter_range(book: String, start: &str, end: Option<&str>) -> Result<QueryResult, QueryError> {
    let parsed_start = parse_chapter_token(start);
    let parsed_end = end.map(parse_chapter_token);

    let mut invalid = Vec::new();
    if parsed_start.is_none() {
        invalid.push(start);
    }
    if let (Some(None), Some(end)) = (&parsed_end, end) {
        invalid.push(end);
    }
    match parsed_start {
        Some(start) if invalid.is_empty() => Ok(QueryResult { book, start, end: parsed_end.flatten() }),
        _ => Err(invalid_tokens(&invalid, "chapter", "chapters")),
    }
}

fn parse_named_section(book: &Book, rest: &[&str]) -> Result<QueryResult, QueryError> {
    let wanted = rest.join(" ");
    book.sections()
        .iter()
        .find(|section| section.eq_ignore_ascii_case(&wanted))
        .map(|section| QueryResult {
            book: book.canonical_name().to_string(),
            start: section.clone(),
            end: None,
        })
        .ok_or_else(|| QueryError::InvalidQuery(format!("{wanted} is not a section of {}", book.canonical_name())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn index() -> BookIndex {
        BookIndex::builtin().unwrap()
    }

    fn result(book: &str, start: &str, end: Option<&str>) -> QueryResult {
        QueryResult {
            book: book.to_string(),
            start: start.to_string(),
            end: end.map(ToString::to_string),
        }
    }

    #[rstest]
    #[case("Brachot 20a", "Berakhot", "20a", None)]
    #[case("Brachot 20b", "Berakhot", "20b", None)]
    #[case("Brachot 20.", "Berakhot", "20a", None)]
    #[case("Brachot 20:", "Berakhot", "20b", None)]
    #[case("Brachot 20", "Berakhot", "20a", Some("20b"))]
    #[case("Brachot 2ab", "Berakhot", "2a", Some("2b"))]
    #[case("Shabbat ק.", "Shabbat", "100a", None)]
    #[case("Shabbat קכ.", "Shabbat", "120a", None)]
    #[case("Shabbat קכג.", "Shabbat", "123a", None)]
    #[case("Shabbat קג.", "Shabbat", "103a", None)]
    #[case("Brachot 2-3a", "Berakhot", "2a", Some("3a"))]
    #[case("Brachot 2 - 3a", "Berakhot", "2a", Some("3a"))]
    #[case("Brachot 2 to 3a", "Berakhot", "2a", Some("3a"))]
    #[case("Brachot 2 to 3", "Berakhot", "2a", Some("3b"))]
    #[case("Brachot 2b to 3", "Berakhot", "2b", Some("3b"))]
    #[case("ברכות ב", "Berakhot", "2a", Some("2b"))]
    #[case("ברכות ב.", "Berakhot", "2a", None)]
    #[case("ברכות ב:", "Berakhot", "2b", None)]
    #[case("   Brachot     20a    ", "Berakhot", "20a", None)]
    #[case("Rosh Hashana 2a", "Rosh Hashanah", "2a", None)]
    #[case("rosh_hashanah 2a", "Rosh Hashanah", "2a", None)]
    #[case("Genesis 1", "Genesis", "1", None)]
    #[case("Genesis 1-3", "Genesis", "1", Some("3"))]
    #[case("Song of Songs 2", "Song of Songs", "2", None)]
    #[case("BirkatHamazon Zimun", "BirkatHamazon", "Zimun", None)]
    fn parses_queries(
        #[case] query: &str,
        #[case] book: &str,
        #[case] start: &str,
        #[case] end: Option<&str>,
    ) {
        assert_eq!(index().parse(query).unwrap(), result(book, start, end));
    }

    #[rstest]
    #[case("ככ")]
    #[case("Not Shabbat 2a")]
    fn unknown_titles_fail(#[case] query: &str) {
        assert!(matches!(index().parse(query), Err(QueryError::UnknownBookName(_))));
    }

    #[rstest]
    #[case("Brachot 2c")]
    #[case("Brachot 2c-3a")]
    #[case("Brachot 2b-3c")]
    #[case("Genesis -1")]
    #[case("Genesis A")]
    #[case("Genesis 1suffix")]
    #[case("Genesis ב")]
    #[case("Genesis 01")]
    #[case("Shabbat A-2")]
    #[case("Shabbat 2-4suffix")]
    #[case("Shabbat 2 3 4")]
    fn malformed_locations_fail(#[case] query: &str) {
        assert!(matches!(index().parse(query), Err(QueryError::InvalidQuery(_))), "{query}");
    }

    #[test]
    fn error_messages_name_the_tokens() {
        assert_eq!(
            index().parse("Brachot 2c"),
            Err(QueryError::InvalidQuery("2c is not a valid amud".to_string()))
        );
        assert_eq!(
            index().parse("Brachot 2c to 3c"),
            Err(QueryError::InvalidQuery("2c and 3c are not valid amudim".to_string()))
        );
    }

    #[rstest]
    #[case("Tamid", "No amud specified in query: \"Tamid\"")]
    #[case("Brachot -", "No amud specified in query: \"Brachot -\"")]
    #[case("Genesis", "No chapter specified in query: \"Genesis\"")]
    fn bare_titles_need_a_location(#[case] query: &str, #[case] message: &str) {
        assert_eq!(index().parse(query), Err(QueryError::InvalidQuery(message.to_string())));
    }

    #[test]
    fn misspelled_titles_get_guesses() {
        let guesses = index().guesses("Brakhott 2a");
        assert_eq!(
            guesses.first(),
            Some(&QueryGuess { text: "Berakhot 2a".to_string(), url: "/Berakhot/2a".to_string() })
        );
        assert!(index().guesses("Zzzzzzzzzzzz 2a").is_empty());
        assert!(index().guesses("Brakhott").is_empty());
    }

    #[rstest]
    #[case("kitten", "sitting", 3)]
    #[case("Berakhot", "berakhot", 0)]
    #[case("", "abc", 3)]
    fn edit_distances(#[case] a: &str, #[case] b: &str, #[case] expected: usize) {
        assert_eq!(edit_distance(a, b), expected);
    }

    #[test]
    fn url_pathnames() {
        assert_eq!(result("Rosh Hashanah", "2a", None).to_url_pathname(), "/Rosh_Hashanah/2a");
        assert_eq!(result("Genesis", "1", Some("3")).to_url_pathname(), "/Genesis/1-3");
    }
}
