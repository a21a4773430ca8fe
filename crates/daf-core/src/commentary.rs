//! Commentary-type catalog and link classification.
//!
//! Every link returned by the corpus is assigned to exactly one
//! [`CommentaryType`], or dropped. Classification runs in passes of
//! decreasing priority across the whole catalog: exact collective-title
//! name, then category, then link type, then name pattern, then ref matcher.
//! The first match wins.

use std::collections::HashSet;

use regex::Regex;

use crate::error::CatalogError;

/// Behavioural flags attached to a commentary type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentaryFlags {
    /// Links of this type are crawled for their own links.
    pub allow_nested_traversal: bool,
    /// Only recorded when linked directly from the page (first crawl round).
    pub ignore_if_not_top_level: bool,
    /// Attributed to the last anchor of the link rather than the first.
    pub attribute_to_last_anchor: bool,
    /// Continuous running commentary on a paginated work: when linked into
    /// the Talmud, the target is rewritten to its spanning ref and crawled.
    pub rewrites_to_span: bool,
}

/// Matches a link's target ref.
#[derive(Debug, Clone)]
pub enum RefMatcher {
    Pattern(Regex),
    /// `Introductions to the Babylonian Talmud, X, Introduction to X ...`
    /// where both `X` are the same masechet.
    MasechetIntroduction,
}

const INTRODUCTIONS_PREFIX: &str = "Introductions to the Babylonian Talmud, ";
const INTRODUCTION_TO: &str = ", Introduction to ";

impl RefMatcher {
    #[must_use]
    pub fn is_match(&self, r: &str) -> bool {
        match self {
            Self::Pattern(pattern) => pattern.is_match(r),
            Self::MasechetIntroduction => is_masechet_introduction(r),
        }
    }
}

fn is_masechet_introduction(r: &str) -> bool {
    let Some(rest) = r.strip_prefix(INTRODUCTIONS_PREFIX) else {
        return false;
    };
    rest.match_indices(INTRODUCTION_TO).any(|(at, separator)| {
        let name = &rest[..at];
        let after = &rest[at + separator.len()..];
        after
            .strip_prefix(name)
            .is_some_and(|tail| tail.starts_with(' '))
    })
}

/// A classification rule mapping links to a named commentary.
#[derive(Debug, Clone)]
pub struct CommentaryType {
    pub english_name: String,
    pub hebrew_name: String,
    pub class_name: String,
    pub name_pattern: Option<Regex>,
    pub category: Option<String>,
    pub link_type: Option<String>,
    pub ref_matcher: Option<RefMatcher>,
    pub flags: CommentaryFlags,
}

impl CommentaryType {
    fn named(english_name: &str, hebrew_name: &str, class_name: &str) -> Self {
        Self {
            english_name: english_name.to_string(),
            hebrew_name: hebrew_name.to_string(),
            class_name: class_name.to_string(),
            name_pattern: None,
            category: None,
            link_type: None,
            ref_matcher: None,
            flags: CommentaryFlags::default(),
        }
    }

    /// Whether links of this type are crawled further, given the link's
    /// category.
    #[must_use]
    pub fn traverses(&self, link_category: Option<&str>) -> bool {
        self.flags.allow_nested_traversal
            || (self.flags.rewrites_to_span && link_category == Some("Talmud"))
    }

    /// Whether a link of this type with `link_category` is rewritten to its
    /// spanning ref.
    #[must_use]
    pub fn rewrites_to_span(&self, link_category: Option<&str>) -> bool {
        self.flags.rewrites_to_span && link_category == Some("Talmud")
    }
}

/// The fields of a link that classification looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkTraits<'a> {
    /// English collective title; empty when the link has none.
    pub name: &'a str,
    pub category: Option<&'a str>,
    pub link_type: Option<&'a str>,
    /// The link's target ref.
    pub target_ref: &'a str,
}

/// Where a duplicated comment survives when it appears both at one level
/// and nested underneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    TopLevel,
    Nested,
}

/// Static description of a catalog row:
/// (english, hebrew, class, name pattern, category, link type, flags).
type Row = (
    &'static str,
    &'static str,
    &'static str,
    Option<&'static str>,
    Option<&'static str>,
    Option<&'static str>,
    CommentaryFlags,
);

const NONE: CommentaryFlags = CommentaryFlags {
    allow_nested_traversal: false,
    ignore_if_not_top_level: false,
    attribute_to_last_anchor: false,
    rewrites_to_span: false,
};

const NESTED: CommentaryFlags = CommentaryFlags { allow_nested_traversal: true, ..NONE };

const ROWS: &[Row] = &[
    ("Translation", "Translation", "translation", None, None, None, NONE),
    ("Explanation", "הכנות", "explanation", None, None, None, NONE),
    ("Footnotes", "הערות", "tp-footnote", None, None, None, NONE),
    ("Verses", "תנ\"ך", "psukim", None, Some("Tanakh"), None, NONE),
    ("Mishnah", "משנה", "mishna", None, Some("Mishnah"), None, NONE),
    ("Tosefta", "תוספתא", "tosefta", Some(r"^Tosefta .*"), None, None, NONE),
    ("Rashi", "רש\"י", "rashi", None, None, None, NESTED),
    ("Otzar Laazei Rashi", "אוצר לעזי רש\"י", "otzar-laazei-rashi", None, None, None, NONE),
    ("Tosafot", "תוספות", "tosafot", None, None, None, NESTED),
    ("Korban HaEdah", "קרבן העדה", "korban-haedah", None, None, None, NESTED),
    ("Penei Moshe", "פני משה", "penei-moshe", None, None, None, NESTED),
    ("Rabbeinu Chananel", "ר\"ח", "rabbeinu-chananel", Some(r"^Rabbeinu Chananel on .*"), None, None, NONE),
    ("Ramban", "רמב\"ן", "ramban", None, None, None, NONE),
    ("Rashba", "רשב\"א", "rashba", None, None, None, NONE),
    ("Rashbam", "רשב\"ם", "rashbam", None, None, None, NONE),
    ("Maharsha", "מהרש\"א", "maharsha", Some(r"(Chidushei Halachot|Chidushei Agadot)"), None, None, NONE),
    ("Maharshal", "מהרש\"ל", "maharshal", Some(r"(Chokhmat Shlomo on .*|Chokhmat Shlomo)"), None, None, NONE),
    ("Meir Lublin", "מהר\"ם לובלין", "meir-lublin", Some(r"^Maharam$"), None, None, NONE),
    ("Rosh", "רא\"ש", "rosh", Some(r"^Rosh on "), None, None, NONE),
    ("Ritva", "ריטב\"א", "ritva", None, None, None, NONE),
    ("Rav Nissim Gaon", "רבנו נסים", "rav-nissim-gaon", Some(r"^Rav Nissim Gaon on "), None, None, NONE),
    ("Gilyon HaShas", "גליון הש\"ס", "gilyon-hashas", None, None, None, NONE),
    ("Shulchan Arukh", "שולחן ערוך", "shulchan-arukh", Some(r"^Shulchan Arukh, "), None, None, NESTED),
    ("Mishnah Berurah", "משנה ברורה", "mishnah-berura", None, None, None, NONE),
    ("Mishneh Torah", "משנה תורה", "mishneh-torah", Some(r"^Mishneh Torah, "), None, None, NONE),
    (
        "Mesorat Hashas",
        "מסורת הש\"ס",
        "mesorat-hashas",
        None,
        None,
        Some("mesorat hashas"),
        CommentaryFlags { rewrites_to_span: true, ..NONE },
    ),
    ("Jastrow", "Jastrow", "jastrow", None, None, None, NONE),
    ("Abarbanel", "אברבנאל", "abarbanel", Some(r"^Abarbanel on"), None, None, NONE),
    ("Guide for the Perplexed", "מורה נבוכים", "guide-perplexed", None, None, None, NONE),
    ("Haamek Davar", "העמק דבר", "haamek-davar", Some(r"^Haamek Davar on"), None, None, NONE),
    ("Ibn Ezra", "אבן עזרא", "ibn-ezra", Some(r"^Ibn Ezra on "), None, None, NONE),
    ("JPS 1985 Footnotes", "JPS Footnotes", "jps-1985", None, None, None, NONE),
    ("Kedushat Levi", "קדושת לוי", "kedushat-levi", Some(r"^Kedushat Levi, "), None, None, NONE),
    ("Kli Yakar", "כלי יקר", "kli-yakar", Some(r"^Kli Yakar on "), None, None, NONE),
    ("Malbim", "מלבי\"ם", "malbim", Some(r"^Malbim on "), None, None, NONE),
    ("Mei HaShiloach", "מי השלוח", "mei-hashiloach", None, None, None, NONE),
    ("Meshech Hochma", "משך חכמה", "meshech-hochma", None, None, None, NONE),
    ("Radak", "רד\"ק", "radak", Some(r"^Radak on "), None, None, NONE),
    ("Sefer HaChinukh", "ספר החינוך", "sefer-hachinukh", None, None, None, NONE),
    ("Sforno", "ספורנו", "sforno", Some(r"^Sforno on "), None, None, NONE),
    ("Torah Temima", "תורה תמימה", "torah-temima", Some(r"^Torah Temimah on "), None, None, NONE),
    ("Steinsaltz", "שטיינזלץ", "translation", None, None, None, NONE),
];

/// Structural Steinsaltz introductions and summaries, matched by ref:
/// (english, hebrew, class, ref pattern, flags). A `None` pattern stands for
/// [`RefMatcher::MasechetIntroduction`].
const STRUCTURAL_ROWS: &[(&str, &str, &str, Option<&str>, CommentaryFlags)] = &[
    (
        "Steinsaltz Masechet Intro",
        "הקדמה למסכת",
        "steinsaltz-masechet-intro",
        None,
        CommentaryFlags { ignore_if_not_top_level: true, ..NONE },
    ),
    (
        "Steinsaltz Perek Intro",
        "הקדמה לפרק",
        "steinsaltz-perek-intro",
        Some(r"^Introductions to the Babylonian Talmud, .*, Introduction to Perek .*"),
        CommentaryFlags { ignore_if_not_top_level: true, ..NONE },
    ),
    (
        "Steinsaltz Perek Summary",
        "סיכום לפרק",
        "steinsaltz-perek-summary",
        Some(r"^Introductions to the Babylonian Talmud, .*, Summary of Perek .*"),
        CommentaryFlags { ignore_if_not_top_level: true, attribute_to_last_anchor: true, ..NONE },
    ),
];

const REMOVE_TOP_LEVEL: &[&str] =
    &["Gilyon HaShas", "Maharsha", "Maharshal", "Meir Lublin", "Otzar Laazei Rashi"];

const COMMUNITY_TRANSLATION_PREFIXES: &[&str] = &["Jerusalem Talmud ", "Mishnah "];

fn compile(pattern: &str) -> Result<Regex, CatalogError> {
    Regex::new(pattern).map_err(|source| CatalogError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// The ordered list of commentary types plus the policies attached to them.
#[derive(Debug, Clone)]
pub struct CommentaryCatalog {
    types: Vec<CommentaryType>,
    remove_top_level: HashSet<String>,
    community_translation_prefixes: Vec<String>,
}

impl CommentaryCatalog {
    /// The built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Pattern`] if a built-in pattern fails to compile.
    pub fn builtin() -> Result<Self, CatalogError> {
        let mut types = Vec::with_capacity(ROWS.len() + STRUCTURAL_ROWS.len() + 1);
        for &(english, hebrew, class, pattern, category, link_type, flags) in ROWS {
            let mut kind = CommentaryType::named(english, hebrew, class);
            kind.name_pattern = pattern.map(compile).transpose()?;
            kind.category = category.map(ToString::to_string);
            kind.link_type = link_type.map(ToString::to_string);
            kind.flags = flags;
            types.push(kind);
        }
        for &(english, hebrew, class, pattern, flags) in STRUCTURAL_ROWS {
            let mut kind = CommentaryType::named(english, hebrew, class);
            kind.ref_matcher = Some(match pattern {
                Some(pattern) => RefMatcher::Pattern(compile(pattern)?),
                None => RefMatcher::MasechetIntroduction,
            });
            kind.flags = flags;
            types.push(kind);
        }
        types.push(CommentaryType::named("Steinsaltz", "שטיינזלץ", "translation"));

        Ok(Self::new(
            types,
            REMOVE_TOP_LEVEL.iter().map(ToString::to_string).collect(),
            COMMUNITY_TRANSLATION_PREFIXES.iter().map(ToString::to_string).collect(),
        ))
    }

    #[must_use]
    pub const fn new(
        types: Vec<CommentaryType>,
        remove_top_level: HashSet<String>,
        community_translation_prefixes: Vec<String>,
    ) -> Self {
        Self { types, remove_top_level, community_translation_prefixes }
    }

    #[must_use]
    pub fn types(&self) -> &[CommentaryType] {
        &self.types
    }

    #[must_use]
    pub fn by_name(&self, english_name: &str) -> Option<&CommentaryType> {
        self.types.iter().find(|kind| kind.english_name == english_name)
    }

    /// Assigns `link` to the first matching type, trying each matcher kind
    /// across the whole catalog before moving to the next.
    #[must_use]
    pub fn classify(&self, link: &LinkTraits<'_>) -> Option<&CommentaryType> {
        let passes: [&dyn Fn(&CommentaryType) -> bool; 5] = [
            &|kind: &CommentaryType| !link.name.is_empty() && kind.english_name == link.name,
            &|kind: &CommentaryType| kind.category.is_some() && kind.category.as_deref() == link.category,
            &|kind: &CommentaryType| match (&kind.link_type, link.link_type) {
                (Some(expected), Some(actual)) => expected.eq_ignore_ascii_case(actual),
                _ => false,
            },
            &|kind: &CommentaryType| {
                kind.name_pattern
                    .as_ref()
                    .is_some_and(|pattern| pattern.is_match(link.name))
            },
            &|kind: &CommentaryType| {
                kind.ref_matcher
                    .as_ref()
                    .is_some_and(|matcher| matcher.is_match(link.target_ref))
            },
        ];
        passes
            .iter()
            .find_map(|matches| self.types.iter().find(|kind| matches(kind)))
    }

    /// Which occurrence to drop when a comment of type `nested_type` also
    /// appears one level up.
    #[must_use]
    pub fn removal_for(&self, nested_type: &str) -> Removal {
        if self.remove_top_level.contains(nested_type) {
            Removal::TopLevel
        } else {
            Removal::Nested
        }
    }

    /// Whether the text at `source_ref` embeds a community translation that
    /// should be shown as its own `Translation` comment.
    #[must_use]
    pub fn is_community_translation(&self, source_ref: &str) -> bool {
        self.community_translation_prefixes
            .iter()
            .any(|prefix| source_ref.starts_with(prefix.as_str()))
    }
}
