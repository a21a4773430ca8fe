//! Turns a root text response plus a populated link graph into rows.

use std::collections::HashMap;

use daf_core::hebrew::normalize_for_search;
use daf_core::{BookIndex, CommentaryCatalog, StaticTables, TextType};
use daf_sefaria::TextResponse;

use crate::error::ApiError;
use crate::graph::LinkGraph;
use crate::patterns::Patterns;
use crate::policy::TextKindPolicy;
use crate::postprocess::PostProcessContext;
use crate::response::Segment;
use crate::timer::Timer;
use crate::tree::{CommentaryTree, TreeBuilder};

/// A segment under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub r#ref: String,
    pub he: TextType,
    pub en: TextType,
    pub commentary: CommentaryTree,
    pub hadran: bool,
    pub sugya_start: bool,
}

fn join_text(first: TextType, second: TextType) -> TextType {
    match (first, second) {
        (first, second) if second.is_empty() => first,
        (first, second) if first.is_empty() => second,
        (TextType::Text(first), TextType::Text(second)) => TextType::Text(format!("{first} {second}")),
        (first, second) => {
            let mut rows = first.into_rows();
            rows.extend(second.into_rows());
            TextType::List(rows)
        }
    }
}

impl Row {
    #[must_use]
    pub fn new(r: impl Into<String>, he: impl Into<TextType>, en: impl Into<TextType>) -> Self {
        Self { r#ref: r.into(), he: he.into(), en: en.into(), ..Self::default() }
    }

    /// Appends `other`'s text and commentary to this row.
    pub fn absorb(&mut self, other: Self) {
        self.he = join_text(std::mem::take(&mut self.he), other.he);
        self.en = join_text(std::mem::take(&mut self.en), other.en);
        self.commentary.absorb(other.commentary);
        self.sugya_start |= other.sugya_start;
    }

    #[must_use]
    pub fn into_segment(self) -> Segment {
        Segment {
            commentary: self.commentary.to_commentary_map(),
            r#ref: self.r#ref,
            he: self.he,
            en: self.en,
            hadran: self.hadran,
            steinsaltz_start_of_sugya: self.sugya_start,
        }
    }
}

/// Aligns Hebrew and English rows, flattening one level of nesting.
///
/// A single missing English row is tolerated when the extra Hebrew row is
/// a closing Hadran; the English side is padded with an empty row.
///
/// # Errors
///
/// Returns [`ApiError::LengthMismatch`] for any other difference in length.
pub fn preformat(
    patterns: &Patterns,
    he: Vec<TextType>,
    mut en: Vec<TextType>,
) -> Result<(Vec<TextType>, Vec<TextType>), ApiError> {
    if matches!(he.first().or_else(|| en.first()), Some(TextType::List(_))) {
        if he.len() != en.len() {
            return Err(ApiError::LengthMismatch { hebrew: he.len(), english: en.len() });
        }
        let mut flat_he = Vec::new();
        let mut flat_en = Vec::new();
        for (he, en) in he.into_iter().zip(en) {
            let (he, en) = preformat(patterns, he.into_rows(), en.into_rows())?;
            flat_he.extend(he);
            flat_en.extend(en);
        }
        return Ok((flat_he, flat_en));
    }

    if he.len() == en.len() + 1 && he.last().is_some_and(|last| patterns.is_hadran(last)) {
        en.push(TextType::default());
    }
    if he.len() != en.len() {
        tracing::error!(hebrew = he.len(), english = en.len(), "unmatched text/translation");
        return Err(ApiError::LengthMismatch { hebrew: he.len(), english: en.len() });
    }
    Ok((he, en))
}

/// Ref of the `index`-th row under `main`: offset from the start of a
/// ranged ref, or one-based below an atomic one.
#[must_use]
pub fn make_sub_ref(main: &str, index: usize) -> String {
    if main.contains('-') {
        let split = main.rsplit_once(':').map(|(prefix, range)| (prefix, ':', range));
        let split = split.or_else(|| main.rsplit_once(' ').map(|(prefix, range)| (prefix, ' ', range)));
        if let Some((prefix, separator, range)) = split {
            let start = range.split('-').next().and_then(|start| start.parse::<usize>().ok());
            if let Some(start) = start {
                return format!("{prefix}{separator}{}", start + index);
            }
        }
    }
    format!("{main}:{}", index + 1)
}

/// Refs of the flattened rows of a response whose top-level nodes each
/// cover one of its spanning refs.
#[must_use]
pub fn spanning_refs(response: &TextResponse) -> Vec<String> {
    let spanning = response.spanning_refs.as_deref().unwrap_or_default();
    response
        .he
        .rows()
        .iter()
        .zip(spanning)
        .flat_map(|(node, spanning)| (0..node.flatten().len()).map(move |i| make_sub_ref(spanning, i)))
        .collect()
}

/// Row refs of one response, resolved once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRefs<'a> {
    /// One ref per row, listed by the response.
    Explicit(&'a [String]),
    /// Offsets into the response's spanning refs.
    Spanning(Vec<String>),
    /// Offsets under the response's own ref.
    Sub(&'a str),
}

impl<'a> RowRefs<'a> {
    #[must_use]
    pub fn new(response: &'a TextResponse) -> Self {
        if let Some(refs) = &response.refs_per_sub_text {
            return Self::Explicit(refs);
        }
        if response.has_spanning_refs() {
            return Self::Spanning(spanning_refs(response));
        }
        Self::Sub(&response.r#ref)
    }

    /// Ref of the `index`-th row, if it has one.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<String> {
        match self {
            Self::Explicit(refs) => refs.get(index).cloned(),
            Self::Spanning(refs) => refs.get(index).cloned(),
            Self::Sub(main) => Some(make_sub_ref(main, index)),
        }
    }
}

/// Ref of the `index`-th row of `response`.
///
/// # Errors
///
/// Returns [`ApiError::SpanningRef`] when the row has no known ref.
pub fn row_ref(response: &TextResponse, index: usize) -> Result<String, ApiError> {
    RowRefs::new(response)
        .get(index)
        .ok_or_else(|| ApiError::SpanningRef { r#ref: response.r#ref.clone(), index })
}

/// Byte offset of `marker` in `text`, falling back to a search that ignores
/// points, cantillation and whitespace differences.
fn find_marker(text: &str, marker: &str) -> Option<usize> {
    if let Some(index) = text.find(marker) {
        return Some(index);
    }
    let (normalized_text, offsets) = normalize_for_search(text);
    let (normalized_marker, _) = normalize_for_search(marker);
    let normalized_marker = normalized_marker.trim();
    if normalized_marker.is_empty() {
        return None;
    }
    let byte_index = normalized_text.find(normalized_marker)?;
    offsets.get(normalized_text[..byte_index].chars().count()).copied()
}

/// Cuts rows listed in `markers` at each of their markers. Later pieces keep
/// the ref but carry no English and no commentary.
///
/// # Errors
///
/// Returns [`ApiError::SplitMarkerNotFound`] if a marker does not occur.
pub fn split_rows(
    rows: Vec<Row>,
    markers: &HashMap<String, Vec<String>>,
) -> Result<Vec<Row>, ApiError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(row_markers) = markers.get(&row.r#ref) else {
            out.push(row);
            continue;
        };
        let Some(he) = row.he.as_text() else {
            tracing::warn!(r#ref = %row.r#ref, "split markers on a nested row, not splitting");
            out.push(row);
            continue;
        };

        let mut pieces = Vec::with_capacity(row_markers.len() + 1);
        let mut rest = he;
        for marker in row_markers {
            let index = find_marker(rest, marker).ok_or_else(|| ApiError::SplitMarkerNotFound {
                r#ref: row.r#ref.clone(),
                marker: marker.clone(),
            })?;
            pieces.push(rest[..index].to_string());
            rest = &rest[index..];
        }
        pieces.push(rest.to_string());

        let mut pieces = pieces.into_iter();
        let first = pieces.next().unwrap_or_default();
        let later: Vec<Row> = pieces.map(|piece| Row::new(row.r#ref.clone(), piece, "")).collect();
        out.push(Row { he: TextType::Text(first), ..row });
        out.extend(later);
    }
    Ok(out)
}

/// Builds the rows of a page from its root text and link graph.
#[derive(Debug, Clone, Copy)]
pub struct SegmentAssembler<'a> {
    pub graph: &'a LinkGraph,
    pub catalog: &'a CommentaryCatalog,
    pub books: &'a BookIndex,
    pub tables: &'a StaticTables,
    pub patterns: &'a Patterns,
    pub policy: TextKindPolicy,
    pub max_edge_visits: usize,
}

impl SegmentAssembler<'_> {
    /// # Errors
    ///
    /// Returns an [`ApiError`] when the Hebrew and English rows cannot be
    /// aligned, a row ref cannot be resolved, or a split marker is missing.
    pub fn assemble(&self, response: &TextResponse) -> Result<Vec<Row>, ApiError> {
        let _timer = Timer::start("assemble segments");
        let (he, en) = preformat(
            self.patterns,
            response.he.clone().into_rows(),
            response.text.clone().into_rows(),
        )?;

        let trees = TreeBuilder::new(
            self.graph,
            self.catalog,
            self.books,
            &self.patterns.html,
            self.max_edge_visits,
        );
        let row_refs = RowRefs::new(response);
        let mut rows = Vec::with_capacity(he.len());
        for (index, (he, en)) in he.into_iter().zip(en).enumerate() {
            let r = row_refs
                .get(index)
                .ok_or_else(|| ApiError::SpanningRef { r#ref: response.r#ref.clone(), index })?;
            rows.push(Row {
                commentary: trees.build(&r),
                he: self.policy.translate_hebrew_text(he),
                en: self.policy.translate_english_text(&self.patterns.html, &en),
                ..Row::new(r, "", "")
            });
        }
        if rows.is_empty() {
            tracing::info!(r#ref = %response.r#ref, "no segments");
        }

        let rows = split_rows(rows, &self.tables.split_markers)?;
        let context = PostProcessContext { patterns: self.patterns, tables: self.tables };
        Ok(self
            .policy
            .post_processors()
            .iter()
            .fold(rows, |rows, processor| processor.apply(rows, &context)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn patterns() -> Patterns {
        Patterns::new().unwrap()
    }

    fn texts(values: &[&str]) -> Vec<TextType> {
        values.iter().map(|v| TextType::from(*v)).collect()
    }

    #[rstest]
    #[case("Berakhot 2a", 0, "Berakhot 2a:1")]
    #[case("Berakhot 2a", 4, "Berakhot 2a:5")]
    #[case("Genesis 1:3-7", 2, "Genesis 1:5")]
    #[case("Siddur Ashkenaz, Berachot, Birkat HaMazon 6-20", 1, "Siddur Ashkenaz, Berachot, Birkat HaMazon 7")]
    fn sub_refs(#[case] main: &str, #[case] index: usize, #[case] expected: &str) {
        assert_eq!(make_sub_ref(main, index), expected);
    }

    #[test]
    fn hadran_row_pads_english() {
        let (he, en) = preformat(
            &patterns(),
            texts(&["א", "ב", "הדרן עלך מי שמתו"]),
            texts(&["a", "b"]),
        )
        .unwrap();
        assert_eq!(he.len(), 3);
        assert_eq!(en, texts(&["a", "b", ""]));
    }

    #[test]
    fn other_mismatches_fail_with_both_lengths() {
        let error = preformat(&patterns(), texts(&["א", "ב", "ג"]), texts(&["a"])).unwrap_err();
        assert!(matches!(error, ApiError::LengthMismatch { hebrew: 3, english: 1 }));
        assert_eq!(error.code(), Some(crate::error::LENGTH_MISMATCH_CODE));

        let error = preformat(&patterns(), texts(&["א", "ב"]), texts(&["a"])).unwrap_err();
        assert!(matches!(error, ApiError::LengthMismatch { hebrew: 2, english: 1 }));
    }

    #[test]
    fn nested_rows_are_flattened() {
        let he = vec![TextType::from(vec!["א", "ב"]), TextType::from(vec!["ג"])];
        let en = vec![TextType::from(vec!["a", "b"]), TextType::from(vec!["c"])];
        let (he, en) = preformat(&patterns(), he, en).unwrap();
        assert_eq!(he, texts(&["א", "ב", "ג"]));
        assert_eq!(en, texts(&["a", "b", "c"]));
    }

    #[test]
    fn spanning_refs_resolve_inner_offsets() {
        let response = TextResponse::spanning(
            "Genesis 1:30-2:2",
            vec![vec!["a", "b"], vec!["c", "d"]],
            vec![vec!["A", "B"], vec!["C", "D"]],
            vec!["Genesis 1:30-31".into(), "Genesis 2:1-2".into()],
        );
        assert_eq!(row_ref(&response, 1).unwrap(), "Genesis 1:31");
        assert_eq!(row_ref(&response, 2).unwrap(), "Genesis 2:1");
        assert!(matches!(row_ref(&response, 4), Err(ApiError::SpanningRef { index: 4, .. })));
    }

    #[test]
    fn spanning_refs_are_resolved_in_one_pass() {
        let response = TextResponse::spanning(
            "Genesis 1:30-2:2",
            vec![vec!["a", "b"], vec!["c", "d"]],
            vec![vec!["A", "B"], vec!["C", "D"]],
            vec!["Genesis 1:30-31".into(), "Genesis 2:1-2".into()],
        );
        assert_eq!(
            spanning_refs(&response),
            vec!["Genesis 1:30", "Genesis 1:31", "Genesis 2:1", "Genesis 2:2"]
        );
        let row_refs = RowRefs::new(&response);
        assert!(matches!(row_refs, RowRefs::Spanning(ref refs) if refs.len() == 4));
        assert_eq!(row_refs.get(3).as_deref(), Some("Genesis 2:2"));
        assert_eq!(row_refs.get(4), None);
    }

    #[test]
    fn explicit_row_refs_win() {
        let mut response = TextResponse::new("Page", vec!["a"], vec!["b"]);
        response.refs_per_sub_text = Some(vec!["Psalms 145:1".into()]);
        assert_eq!(row_ref(&response, 0).unwrap(), "Psalms 145:1");
    }

    #[test]
    fn rows_split_at_markers() {
        let markers = HashMap::from([("Berakhot 2a:1".to_string(), vec!["גמרא".to_string()])]);
        let rows = vec![Row::new("Berakhot 2a:1", "משנה גמרא", "english")];
        let rows = split_rows(rows, &markers).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].he, TextType::from("משנה "));
        assert_eq!(rows[0].en, TextType::from("english"));
        assert_eq!(rows[1].he, TextType::from("גמרא"));
        assert!(rows[1].en.is_empty());
        assert_eq!(rows[1].r#ref, "Berakhot 2a:1");
    }

    #[test]
    fn split_markers_match_without_points() {
        let markers = HashMap::from([("R".to_string(), vec!["גמרא".to_string()])]);
        let rows = split_rows(vec![Row::new("R", "משנה גְּמָרָא", "")], &markers).unwrap();
        assert_eq!(rows[1].he, TextType::from("גְּמָרָא"));
    }

    #[test]
    fn missing_split_marker_is_fatal() {
        let markers = HashMap::from([("R".to_string(), vec!["אין".to_string()])]);
        let error = split_rows(vec![Row::new("R", "משנה", "")], &markers).unwrap_err();
        assert!(matches!(error, ApiError::SplitMarkerNotFound { .. }));
    }
}
