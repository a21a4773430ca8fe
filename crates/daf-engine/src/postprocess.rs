//! Whole-page rewrites run after rows are assembled.

use daf_core::{StaticTables, TextType};

use crate::assemble::Row;
use crate::comment::{Comment, EXPLANATION, STEINSALTZ};
use crate::patterns::Patterns;
use crate::tree::CommentaryTree;

/// Shared, read-only inputs of the post-processors.
#[derive(Debug, Clone, Copy)]
pub struct PostProcessContext<'a> {
    pub patterns: &'a Patterns,
    pub tables: &'a StaticTables,
}

/// A rewrite over all rows of a page. Policies pick an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcessor {
    /// Flags rows whose Steinsaltz comment opens a new sugya.
    SugyaStart,
    /// Turns a closing Hadran row into a bare Hebrew row.
    Hadran,
    /// Collapses configured runs of rows into their first row.
    MergePairs,
    /// Moves explanation preambles into the commentary of the next row.
    ExplanationPromotion,
    /// Removes footnote markers and bodies left in the main text.
    FootnoteMarkerCleanup,
}

impl PostProcessor {
    #[must_use]
    pub fn apply(self, rows: Vec<Row>, context: &PostProcessContext<'_>) -> Vec<Row> {
        match self {
            Self::SugyaStart => mark_sugya_starts(rows, context.patterns),
            Self::Hadran => format_hadran(rows, context.patterns),
            Self::MergePairs => merge_pairs(rows, context.tables),
            Self::ExplanationPromotion => promote_explanations(rows, context.tables),
            Self::FootnoteMarkerCleanup => clean_footnote_markers(rows, context.patterns),
        }
    }
}

fn mark_sugya_starts(mut rows: Vec<Row>, patterns: &Patterns) -> Vec<Row> {
    for row in &mut rows {
        row.sugya_start = row.commentary.comments().iter().any(|comment| {
            comment.commentary_type == STEINSALTZ
                && comment.he.first_or_only().is_some_and(|he| patterns.is_sugya_start(he))
        });
    }
    rows
}

fn format_hadran(mut rows: Vec<Row>, patterns: &Patterns) -> Vec<Row> {
    for row in &mut rows {
        let TextType::Text(he) = &row.he else { continue };
        if !patterns.is_hadran_text(he) {
            continue;
        }
        row.he = TextType::Text(he.replace("<br>", ""));
        row.en = TextType::default();
        row.commentary.clear();
        row.hadran = true;
    }
    rows
}

fn merge_pairs(rows: Vec<Row>, tables: &StaticTables) -> Vec<Row> {
    if tables.merge_pairs.is_empty() {
        return rows;
    }

    let mut out: Vec<Row> = Vec::with_capacity(rows.len());
    // End ref of the run currently being merged into the last output row.
    let mut merging: Option<String> = None;
    for row in rows {
        if let Some(end) = merging.as_deref() {
            let done = row.r#ref == end;
            if let Some(first) = out.last_mut() {
                first.absorb(row);
            }
            if done {
                merging = None;
            }
            continue;
        }
        merging = tables.merge_pairs.get(&row.r#ref).cloned();
        out.push(row);
    }
    if let Some(end) = merging {
        tracing::warn!(%end, "merge range end not on page");
    }
    out
}

fn promote_explanations(rows: Vec<Row>, tables: &StaticTables) -> Vec<Row> {
    if tables.explanation_refs.is_empty() {
        return rows;
    }

    let mut out = Vec::with_capacity(rows.len());
    let mut pending: Vec<Row> = Vec::new();
    for mut row in rows {
        if tables.explanation_refs.contains(&row.r#ref) {
            pending.push(row);
            continue;
        }
        for explanation in pending.drain(..).rev() {
            promote(explanation, &mut row.commentary);
        }
        out.push(row);
    }
    // Nothing follows a trailing preamble, so it stays a row.
    out.extend(pending);
    out
}

fn promote(explanation: Row, commentary: &mut CommentaryTree) {
    let Row { r#ref, he, en, commentary: nested, .. } = explanation;
    commentary.nested_mut(&r#ref).absorb(nested);
    commentary.prepend_comment(Comment {
        commentary_type: EXPLANATION.to_string(),
        source_ref: r#ref.clone(),
        r#ref,
        he,
        en,
        ..Comment::default()
    });
}

fn clean_footnote_markers(mut rows: Vec<Row>, patterns: &Patterns) -> Vec<Row> {
    let strip = |html: &str| patterns.html.strip_footnote_markers(html);
    for row in &mut rows {
        row.he = row.he.map_text(&strip);
        row.en = row.en.map_text(&strip);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Fixture {
        patterns: Patterns,
        tables: StaticTables,
    }

    impl Fixture {
        fn new() -> Self {
            Self { patterns: Patterns::new().unwrap(), tables: StaticTables::default() }
        }

        fn apply(&self, processor: PostProcessor, rows: Vec<Row>) -> Vec<Row> {
            processor.apply(rows, &PostProcessContext { patterns: &self.patterns, tables: &self.tables })
        }
    }

    fn comment(kind: &str, r: &str, he: &str) -> Comment {
        Comment { commentary_type: kind.into(), r#ref: r.into(), he: he.into(), ..Comment::default() }
    }

    fn refs(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|row| row.r#ref.as_str()).collect()
    }

    #[test]
    fn steinsaltz_big_letter_starts_a_sugya() {
        let fixture = Fixture::new();
        let mut first = Row::new("B 2a:1", "א", "a");
        first.commentary.add_comment(comment(STEINSALTZ, "Steinsaltz on B 2a:1", "<big>מ</big>אימתי"));
        let mut second = Row::new("B 2a:2", "ב", "b");
        second.commentary.add_comment(comment(STEINSALTZ, "Steinsaltz on B 2a:2", "ותנא"));

        let rows = fixture.apply(PostProcessor::SugyaStart, vec![first, second]);
        assert!(rows[0].sugya_start);
        assert!(!rows[1].sugya_start);
    }

    #[test]
    fn hadran_rows_lose_translation_and_commentary() {
        let fixture = Fixture::new();
        let mut row = Row::new("B 64a:10", "<br><br><big><strong>הדרן עלך מי שמתו</strong></big>", "x");
        row.commentary.add_comment(comment("Rashi", "Rashi on B 64a:10:1", "ר"));

        let rows = fixture.apply(PostProcessor::Hadran, vec![row]);
        assert!(rows[0].hadran);
        assert_eq!(rows[0].he, TextType::from("<big><strong>הדרן עלך מי שמתו</strong></big>"));
        assert!(rows[0].en.is_empty());
        assert!(rows[0].commentary.is_empty());
    }

    #[test]
    fn merge_pairs_collapse_into_the_first_row() {
        let mut fixture = Fixture::new();
        fixture.tables.merge_pairs.insert("S 1".into(), "S 3".into());
        let mut second = Row::new("S 2", "ב", "b");
        second.commentary.add_comment(comment("Rashi", "Rashi on S 2", "ר"));
        let rows = vec![
            Row::new("S 1", "א", "a"),
            second,
            Row::new("S 3", "ג", "c"),
            Row::new("S 4", "ד", "d"),
        ];

        let rows = fixture.apply(PostProcessor::MergePairs, rows);
        assert_eq!(refs(&rows), vec!["S 1", "S 4"]);
        assert_eq!(rows[0].he, TextType::from("א ב ג"));
        assert_eq!(rows[0].en, TextType::from("a b c"));
        assert!(rows[0].commentary.contains("Rashi on S 2"));
    }

    #[test]
    fn explanations_move_into_the_next_row() {
        let mut fixture = Fixture::new();
        fixture.tables.explanation_refs.insert("S 1".into());
        fixture.tables.explanation_refs.insert("S 4".into());
        let mut target = Row::new("S 2", "ב", "b");
        target.commentary.add_comment(comment("Rashi", "Rashi on S 2", "ר"));
        let rows = vec![
            Row::new("S 1", "", "Say this first"),
            target,
            Row::new("S 3", "ג", "c"),
            Row::new("S 4", "", "Trailing"),
        ];

        let rows = fixture.apply(PostProcessor::ExplanationPromotion, rows);
        assert_eq!(refs(&rows), vec!["S 2", "S 3", "S 4"]);
        let comments = rows[0].commentary.comments();
        assert_eq!(comments[0].commentary_type, EXPLANATION);
        assert_eq!(comments[0].en, TextType::from("Say this first"));
        assert_eq!(comments[1].r#ref, "Rashi on S 2");
    }

    #[test]
    fn footnote_markers_are_removed_from_main_text() {
        let fixture = Fixture::new();
        let row = Row::new(
            "Genesis 1:1",
            "בראשית",
            r#"In the beginning<sup class="footnote-marker">*</sup><i class="footnote">Or "When"</i>"#,
        );
        let rows = fixture.apply(PostProcessor::FootnoteMarkerCleanup, vec![row]);
        assert_eq!(rows[0].en, TextType::from("In the beginning"));
    }
}
