//! Minimal HTML tokenizing and the rewrites applied to corpus text.
//!
//! Corpus text is small, well-formed HTML fragments. The tokenizer only
//! distinguishes start tags, end tags and text; everything is re-emitted
//! verbatim unless a rewrite drops or replaces it.

use daf_core::{CatalogError, TextType};
use regex::Regex;

use crate::patterns::compile;

/// Tags that never have an end tag.
const VOID_TAGS: &[&str] = &["br", "img"];

/// Lead markers dropped from the first text run of a comment.
const COMMENTARY_PREFIXES: &[&str] = &["גמ' ", "גמ׳ ", "מתני' ", "מתני׳ "];

/// Commentaries whose parentheses are part of the text proper.
const KEEP_PARENTHESES: &[&str] = &["Steinsaltz", "Shulchan Arukh", "Mishneh Torah"];

/// Commentaries that open with a bolded lead phrase.
const DIBUR_HAMATCHIL_TITLES: &[&str] = &["Ran", "Rashi", "Rashbam", "Tosafot", "Mishnah Berurah"];
const DIBUR_HAMATCHIL_SPLITTERS: &[&str] = &[" - ", " – "];
/// A Tosafot lead phrase ending at a period is at most this many words.
const MAX_TOSAFOT_LEAD_WORDS: usize = 20;

const RASHI_QUOTATION_OPENERS: &[&str] = &[
    "כך", "כ׳", "כ'", "מה", "כמו", "שפירש", "שפ'", "שפי'", "כתב", "שכתב", "שכ'", "פירש", "פ'",
    "פי'", "כדפ'", "כדפי'", "כדפירש",
];
const RASHI_QUOTATION_CLOSERS: &[&str] = &["הקונטרס", "בקונטרס", "ובקונטרס פירש", "בקונט'", "הקונט'"];

pub const OTZAR_LAAZEI_RASHI: &str = "Otzar Laazei Rashi";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<'a> {
    Start {
        /// Lowercased tag name.
        name: String,
        attributes: Vec<(String, String)>,
        raw: &'a str,
    },
    End {
        name: String,
        raw: &'a str,
    },
    Text(&'a str),
}

fn is_void(name: &str) -> bool {
    VOID_TAGS.contains(&name)
}

fn push_start_tag(out: &mut String, name: &str, attributes: &[(String, String)]) {
    out.push('<');
    out.push_str(name);
    for (key, value) in attributes {
        out.push_str(&format!(" {key}=\"{value}\""));
    }
    out.push('>');
}

fn push_end_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn rashi_quotation_pattern() -> String {
    let opener = format!("(({})\\s)?", RASHI_QUOTATION_OPENERS.join("|"));
    format!("{}({})", opener.repeat(4), RASHI_QUOTATION_CLOSERS.join("|"))
}

/// Wraps the lead phrase of a `Ran`/`Rashi`/`Tosafot`-style comment in a
/// `dibur-hamatchil` element. Only the first splitter counts.
#[must_use]
pub fn bold_dibur_hamatchil(html: &str, commentary_type: &str) -> String {
    if !DIBUR_HAMATCHIL_TITLES.contains(&commentary_type) {
        return html.to_string();
    }
    let bold = |lead: &str, splitter: &str, rest: &str| {
        format!(r#"<strong class="dibur-hamatchil">{lead}</strong>{splitter}{rest}"#)
    };
    for &splitter in DIBUR_HAMATCHIL_SPLITTERS {
        if let Some((lead, rest)) = html.split_once(splitter) {
            return bold(lead, splitter, rest);
        }
    }
    if commentary_type == "Tosafot" {
        if let Some((lead, rest)) = html.split_once(". ") {
            if lead.split(' ').count() <= MAX_TOSAFOT_LEAD_WORDS {
                return bold(lead, " - ", rest);
            }
        }
    }
    html.to_string()
}

/// Drops the entry number and location that precede the first bold word,
/// and marks that word as the lead phrase.
#[must_use]
pub fn format_otzar_laazei_rashi(html: &str) -> String {
    match html.find("<b>") {
        Some(start) => html[start..].replacen("<b>", "<b>ד\"ה ", 1),
        None => html.to_string(),
    }
}

fn has_class(attributes: &[(String, String)], class: &str) -> bool {
    attributes
        .iter()
        .any(|(name, value)| name == "class" && value.split_whitespace().any(|c| c == class))
}

/// Compiled patterns for tokenizing and rewriting corpus HTML.
#[derive(Debug, Clone)]
pub struct HtmlRules {
    tag: Regex,
    attribute: Regex,
    rashi_quotation: Regex,
}

impl HtmlRules {
    /// # Errors
    ///
    /// Returns [`CatalogError::Pattern`] if a built-in pattern fails to compile.
    pub fn new() -> Result<Self, CatalogError> {
        Ok(Self {
            tag: compile(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)([^>]*)>")?,
            attribute: compile(
                r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#,
            )?,
            rashi_quotation: compile(&rashi_quotation_pattern())?,
        })
    }

    #[must_use]
    pub fn tokenize<'a>(&self, html: &'a str) -> Vec<Node<'a>> {
        let mut nodes = Vec::new();
        let mut last = 0;
        for captures in self.tag.captures_iter(html) {
            let Some(whole) = captures.get(0) else { continue };
            if whole.start() > last {
                nodes.push(Node::Text(&html[last..whole.start()]));
            }
            let name = captures[2].to_ascii_lowercase();
            let raw = whole.as_str();
            if captures[1].is_empty() {
                let attributes = self.attributes(captures.get(3).map_or("", |m| m.as_str()));
                nodes.push(Node::Start { name, attributes, raw });
            } else {
                nodes.push(Node::End { name, raw });
            }
            last = whole.end();
        }
        if last < html.len() {
            nodes.push(Node::Text(&html[last..]));
        }
        nodes
    }

    fn attributes(&self, source: &str) -> Vec<(String, String)> {
        self.attribute
            .captures_iter(source)
            .map(|c| {
                let value = c.get(2).or_else(|| c.get(3)).or_else(|| c.get(4));
                (c[1].to_ascii_lowercase(), value.map_or("", |m| m.as_str()).to_string())
            })
            .collect()
    }

    /// Removes every element with class `footnote` and returns its inner
    /// HTML as a footnote. When the footnote directly follows a `<sup>`
    /// marker, the footnote starts with a copy of that marker.
    #[must_use]
    pub fn extract_footnotes(&self, html: &str) -> (String, Vec<String>) {
        if !html.contains("footnote") {
            return (html.to_string(), Vec::new());
        }

        let mut out = String::with_capacity(html.len());
        let mut footnotes = Vec::new();
        // Footnote being collected and the number of elements open inside it.
        let mut current: Option<(String, usize)> = None;
        let mut last_start_tag = String::new();
        let mut last_text = "";

        for node in self.tokenize(html) {
            match node {
                Node::Start { name, attributes, raw } => {
                    if let Some((footnote, depth)) = current.as_mut() {
                        if !is_void(&name) {
                            *depth += 1;
                        }
                        footnote.push_str(raw);
                    } else if has_class(&attributes, "footnote") {
                        let mut footnote = String::new();
                        if last_start_tag == "sup" {
                            footnote.push_str("<sup>");
                            footnote.push_str(last_text);
                            footnote.push_str("</sup> ");
                        }
                        current = Some((footnote, 0));
                    } else {
                        out.push_str(raw);
                    }
                    last_start_tag = name;
                }
                Node::End { raw, .. } => match current.take() {
                    Some((footnote, 0)) => footnotes.push(footnote),
                    Some((mut footnote, depth)) => {
                        footnote.push_str(raw);
                        current = Some((footnote, depth - 1));
                    }
                    None => out.push_str(raw),
                },
                Node::Text(text) => {
                    match current.as_mut() {
                        Some((footnote, _)) => footnote.push_str(text),
                        None => out.push_str(text),
                    }
                    last_text = text;
                }
            }
        }
        if let Some((footnote, _)) = current {
            footnotes.push(footnote);
        }
        (out, footnotes)
    }

    /// [`Self::extract_footnotes`] over every string of `text`, collecting
    /// footnotes in document order.
    #[must_use]
    pub fn extract_footnotes_from(&self, text: &TextType) -> (TextType, Vec<String>) {
        match text {
            TextType::Text(html) => {
                let (html, footnotes) = self.extract_footnotes(html);
                (TextType::Text(html), footnotes)
            }
            TextType::List(items) => {
                let mut footnotes = Vec::new();
                let items = items
                    .iter()
                    .map(|item| {
                        let (item, found) = self.extract_footnotes_from(item);
                        footnotes.extend(found);
                        item
                    })
                    .collect();
                (TextType::List(items), footnotes)
            }
        }
    }

    /// Turns `refLink`/`namedEntityLink` anchors into spans and unwraps
    /// every other anchor, keeping its text.
    #[must_use]
    pub fn sanitize_links(&self, html: &str) -> String {
        if !html.contains("href") {
            return html.to_string();
        }

        let mut out = String::with_capacity(html.len());
        let mut anchors: Vec<bool> = Vec::new();
        for node in self.tokenize(html) {
            match node {
                Node::Start { name, attributes, raw } if name == "a" => {
                    let classes: Vec<&str> = attributes
                        .iter()
                        .filter(|(name, _)| name == "class")
                        .map(|(_, value)| value.as_str())
                        .collect();
                    let kept = matches!(classes.as_slice(), ["refLink" | "namedEntityLink"]);
                    if kept {
                        out.push_str("<span");
                        out.push_str(&raw[2..]);
                    }
                    anchors.push(kept);
                }
                Node::End { name, .. } if name == "a" => {
                    if anchors.pop() == Some(true) {
                        out.push_str("</span>");
                    }
                }
                Node::Start { raw, .. } | Node::End { raw, .. } | Node::Text(raw) => {
                    out.push_str(raw);
                }
            }
        }
        out
    }

    /// Drops a `§` (and one following space) at the start of the first text run.
    #[must_use]
    pub fn remove_leading_section_symbol(&self, html: &str) -> String {
        if !html.contains('§') {
            return html.to_string();
        }

        let mut out = String::with_capacity(html.len());
        let mut at_start = true;
        for node in self.tokenize(html) {
            match node {
                Node::Text(text) if at_start => {
                    at_start = false;
                    let text = text.strip_prefix('§').map_or(text, |rest| {
                        rest.strip_prefix(' ').unwrap_or(rest)
                    });
                    out.push_str(text);
                }
                Node::Start { raw, .. } | Node::End { raw, .. } | Node::Text(raw) => {
                    out.push_str(raw);
                }
            }
        }
        out
    }

    /// Link sanitizing followed by section-symbol removal, the standard
    /// treatment of English text.
    #[must_use]
    pub fn standard_english(&self, text: &TextType) -> TextType {
        text.map_text(&|html| self.remove_leading_section_symbol(&self.sanitize_links(html)))
    }

    /// Removes `<sup class="footnote-marker">` and `<i class="footnote">`
    /// elements, content included.
    #[must_use]
    pub fn strip_footnote_markers(&self, html: &str) -> String {
        if !html.contains("footnote") {
            return html.to_string();
        }

        let mut out = String::with_capacity(html.len());
        // Depth inside the element being removed; zero when not removing.
        let mut removing = 0usize;
        for node in self.tokenize(html) {
            match node {
                Node::Start { name, attributes, raw } => {
                    let void = is_void(&name);
                    if removing > 0 {
                        if !void {
                            removing += 1;
                        }
                    } else if (name == "sup" && has_class(&attributes, "footnote-marker"))
                        || (name == "i" && has_class(&attributes, "footnote"))
                    {
                        if !void {
                            removing = 1;
                        }
                    } else {
                        out.push_str(raw);
                    }
                }
                Node::End { raw, .. } => {
                    if removing > 0 {
                        removing -= 1;
                    } else {
                        out.push_str(raw);
                    }
                }
                Node::Text(text) => {
                    if removing == 0 {
                        out.push_str(text);
                    }
                }
            }
        }
        out
    }
}

impl HtmlRules {
    /// The formatting applied to the Hebrew of every comment, in order.
    #[must_use]
    pub fn hebrew_comment(&self, text: &TextType, commentary_type: &str) -> TextType {
        text.map_text(&|html| {
            let html = if commentary_type == OTZAR_LAAZEI_RASHI {
                format_otzar_laazei_rashi(html)
            } else {
                html.to_string()
            };
            let html = bold_dibur_hamatchil(&html, commentary_type);
            let html = self.highlight_rashi_quotations(&html);
            let html = self.small_to_emphasis(&html);
            let html = self.strip_commentary_prefix(&html);
            let html = if KEEP_PARENTHESES.contains(&commentary_type) {
                html
            } else {
                self.parenthesize(&html)
            };
            let html = self.number_images(&html);
            self.normalize(&html)
        })
    }

    /// Marks phrases where a commentary cites Rashi ("the Kuntres").
    #[must_use]
    pub fn highlight_rashi_quotations(&self, html: &str) -> String {
        self.rashi_quotation
            .replace_all(html, r#"<span class="rashi-quotation">$0</span>"#)
            .into_owned()
    }

    /// `<small>` becomes `<span class="hebrew-emphasis">`; its attributes are dropped.
    #[must_use]
    pub fn small_to_emphasis(&self, html: &str) -> String {
        if !html.contains("<small") {
            return html.to_string();
        }

        let mut out = String::with_capacity(html.len());
        for node in self.tokenize(html) {
            match node {
                Node::Start { name, .. } if name == "small" => {
                    out.push_str(r#"<span class="hebrew-emphasis">"#);
                }
                Node::End { name, .. } if name == "small" => out.push_str("</span>"),
                Node::Start { raw, .. } | Node::End { raw, .. } | Node::Text(raw) => {
                    out.push_str(raw);
                }
            }
        }
        out
    }

    /// Drops a `גמ'` or `מתני'` marker at the start of the first text run.
    #[must_use]
    pub fn strip_commentary_prefix(&self, html: &str) -> String {
        if !COMMENTARY_PREFIXES.iter().any(|prefix| html.contains(prefix)) {
            return html.to_string();
        }

        let mut out = String::with_capacity(html.len());
        let mut at_start = true;
        for node in self.tokenize(html) {
            match node {
                Node::Text(text) if at_start => {
                    at_start = false;
                    let mut text = text;
                    for prefix in COMMENTARY_PREFIXES {
                        if let Some(rest) = text.strip_prefix(prefix) {
                            text = rest;
                        }
                    }
                    out.push_str(text);
                }
                Node::Start { raw, .. } | Node::End { raw, .. } | Node::Text(raw) => {
                    out.push_str(raw);
                }
            }
        }
        out
    }

    /// Wraps every parenthesized run of text in a `parenthesized` span.
    #[must_use]
    pub fn parenthesize(&self, html: &str) -> String {
        if !html.contains(['(', ')']) {
            return html.to_string();
        }

        let mut out = String::with_capacity(html.len());
        for node in self.tokenize(html) {
            match node {
                Node::Text(text) => out.push_str(
                    &text
                        .replace('(', r#"<span class="parenthesized">("#)
                        .replace(')', ")</span>"),
                ),
                Node::Start { raw, .. } | Node::End { raw, .. } => out.push_str(raw),
            }
        }
        out
    }

    /// Moves each image into a numbered `image-ref-container` followed by a
    /// pointer with the same label. A lone image is labelled `(*)`.
    #[must_use]
    pub fn number_images(&self, html: &str) -> String {
        if !html.contains("<img") {
            return html.to_string();
        }

        let nodes = self.tokenize(html);
        let images = nodes
            .iter()
            .filter(|node| matches!(node, Node::Start { name, .. } if name == "img"))
            .count();
        let mut out = String::with_capacity(html.len());
        let mut counter = 0;
        for node in nodes {
            match node {
                Node::Start { name, attributes, .. } if name == "img" => {
                    counter += 1;
                    let label = if images == 1 { "(*)".to_string() } else { format!("({counter})") };
                    out.push_str(r#"<span class="image-ref-container">"#);
                    out.push_str(&format!(r#"<span class="image-ref-text">{label}:</span>"#));
                    out.push_str(r#"<span class="image-ref">"#);
                    push_start_tag(&mut out, &name, &attributes);
                    out.push_str("</span></span>");
                    out.push_str(&format!(r#"<span class="image-pointer">{label}</span>"#));
                }
                Node::Start { raw, .. } | Node::End { raw, .. } | Node::Text(raw) => {
                    out.push_str(raw);
                }
            }
        }
        out
    }

    /// Re-emits tags with lowercase names and double-quoted attributes,
    /// drops end tags that close nothing, and closes elements left open.
    #[must_use]
    pub fn normalize(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut open: Vec<String> = Vec::new();
        for node in self.tokenize(html) {
            match node {
                Node::Start { name, attributes, .. } => {
                    push_start_tag(&mut out, &name, &attributes);
                    if !is_void(&name) {
                        open.push(name);
                    }
                }
                Node::End { name, .. } => {
                    if let Some(depth) = open.iter().rposition(|tag| *tag == name) {
                        for tag in open.drain(depth..).rev() {
                            push_end_tag(&mut out, &tag);
                        }
                    }
                }
                Node::Text(text) => out.push_str(text),
            }
        }
        for tag in open.drain(..).rev() {
            push_end_tag(&mut out, &tag);
        }
        out
    }
}
