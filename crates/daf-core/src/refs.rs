//! Ref algebra: ordering, merging and expansion of citation strings.
//!
//! A ref is `"<Title> <location>"`, where the location is colon structured
//! (`2a:5`, `1:3`) and may be a range (`2a:5-7`, `1:30-2:4`).

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::books::next_page_id;
use crate::error::RefError;
use crate::tables::SegmentCounts;

/// Upper bound on pages walked by a single range expansion.
const MAX_PAGES_IN_RANGE: usize = 1000;

/// Splits a ref into its title and location at the last space.
#[must_use]
pub fn split_on_book_name(r: &str) -> Option<(&str, &str)> {
    let index = r.rfind(' ')?;
    Some((&r[..index], &r[index + 1..]))
}

/// Drops everything from the first colon, e.g. `Shabbat 31a:4` → `Shabbat 31a`.
#[must_use]
pub fn strip_segment_number(r: &str) -> &str {
    r.find(':').map_or(r, |index| &r[..index])
}

enum Piece<'a> {
    Number(&'a str),
    Text(&'a str),
}

impl<'a> Piece<'a> {
    const fn as_str(&self) -> &'a str {
        match self {
            Self::Number(s) | Self::Text(s) => *s,
        }
    }
}

fn pieces(s: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_number = None;
    for (index, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        match in_number {
            Some(previous) if previous != is_digit => {
                out.push(make_piece(&s[start..index], previous));
                start = index;
            }
            _ => {}
        }
        in_number = Some(is_digit);
    }
    if let Some(is_digit) = in_number {
        out.push(make_piece(&s[start..], is_digit));
    }
    out
}

const fn make_piece(s: &str, is_digit: bool) -> Piece<'_> {
    if is_digit { Piece::Number(s) } else { Piece::Text(s) }
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Piece-wise ref ordering: runs of ASCII digits compare numerically, all
/// other runs compare lexically. `Genesis 2:9` sorts before `Genesis 2:10`.
#[must_use]
pub fn compare_refs(a: &str, b: &str) -> Ordering {
    let left = pieces(a);
    let right = pieces(b);
    for (x, y) in left.iter().zip(&right) {
        let ordering = match (x, y) {
            (Piece::Number(m), Piece::Number(n)) => compare_numeric(m, n),
            _ => x.as_str().cmp(y.as_str()),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    left.len().cmp(&right.len())
}

/// Sorts refs in place with [`compare_refs`].
pub fn sort_refs<S: AsRef<str>>(refs: &mut [S]) {
    refs.sort_by(|a, b| compare_refs(a.as_ref(), b.as_ref()));
}

fn mergeable_split(r: &str) -> Option<(&str, &str)> {
    if r.contains('-') {
        return None;
    }
    let index = r.rfind(':')?;
    Some((&r[..index], &r[index + 1..]))
}

/// Groups refs sharing a `prefix:` into one range ref per prefix.
///
/// Each key is either a merged range (`prefix:first-last`), or an input ref
/// that had nothing to merge with. Each value lists the inputs the key
/// covers, in their original order and including duplicates. Keys are
/// ordered by [`compare_refs`].
#[must_use]
pub fn merge_refs<S: AsRef<str>>(refs: &[S]) -> IndexMap<String, Vec<String>> {
    let mut groups: IndexMap<&str, Vec<(&str, &str)>> = IndexMap::new();
    let mut merged: IndexMap<String, Vec<String>> = IndexMap::new();

    for r in refs {
        let r = r.as_ref();
        match mergeable_split(r) {
            Some((prefix, suffix)) => groups.entry(prefix).or_default().push((suffix, r)),
            None => merged.entry(r.to_string()).or_default().push(r.to_string()),
        }
    }

    for (prefix, members) in groups {
        let mut suffixes: Vec<&str> = members.iter().map(|(suffix, _)| *suffix).collect();
        suffixes.sort_by(|a, b| compare_refs(a, b));
        let (Some(first), Some(last)) = (suffixes.first(), suffixes.last()) else {
            continue;
        };
        let key = if first == last {
            format!("{prefix}:{first}")
        } else {
            format!("{prefix}:{first}-{last}")
        };
        merged
            .entry(key)
            .or_default()
            .extend(members.into_iter().map(|(_, r)| r.to_string()));
    }

    merged.sort_by(|a, _, b, _| compare_refs(a, b));
    merged
}

fn parse_number(text: &str, range: &str) -> Result<u32, RefError> {
    text.trim()
        .parse()
        .map_err(|_| RefError::Malformed(range.to_string()))
}

/// Expands a range ref into every atomic ref it covers.
///
/// Non-range refs expand to themselves. When the range crosses pages or
/// chapters, every page but the last is walked to its final segment using
/// `counts`.
///
/// # Errors
///
/// Returns [`RefError`] when the ref is malformed, when the range runs
/// backwards, or when an intermediate page has no segment count.
pub fn expand_ref(r: &str, counts: &SegmentCounts) -> Result<Vec<String>, RefError> {
    let Some((start, end)) = r.split_once('-') else {
        return Ok(vec![r.to_string()]);
    };
    let (title, start_location) =
        split_on_book_name(start.trim_end()).ok_or_else(|| RefError::Malformed(r.to_string()))?;
    let end = end.trim();

    let Some((start_page, start_segment)) = start_location.rsplit_once(':') else {
        if end.contains(':') {
            return Err(RefError::InvalidRange(r.to_string()));
        }
        let first = parse_number(start_location, r)?;
        let last = parse_number(end, r)?;
        if last < first {
            return Err(RefError::InvalidRange(r.to_string()));
        }
        return Ok((first..=last).map(|n| format!("{title} {n}")).collect());
    };

    let mut first = parse_number(start_segment, r)?;
    let (end_page, end_segment) = match end.rsplit_once(':') {
        Some((page, segment)) => (page, parse_number(segment, r)?),
        None => (start_page, parse_number(end, r)?),
    };

    let mut refs = Vec::new();
    let mut page = start_page.to_string();
    for _ in 0..MAX_PAGES_IN_RANGE {
        let at_end = page == end_page;
        let last = if at_end {
            end_segment
        } else {
            let page_ref = format!("{title} {page}");
            counts
                .get(&page_ref)
                .ok_or(RefError::MissingSegmentCount(page_ref))?
        };
        if at_end && last < first {
            return Err(RefError::InvalidRange(r.to_string()));
        }
        refs.extend((first..=last).map(|segment| format!("{title} {page}:{segment}")));
        if at_end {
            return Ok(refs);
        }
        page = next_page_id(&page).ok_or_else(|| RefError::UnknownPageFormat {
            page: page.clone(),
            range: r.to_string(),
        })?;
        first = 1;
    }
    Err(RefError::InvalidRange(r.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn counts() -> SegmentCounts {
        [
            ("Berakhot 2a", 8),
            ("Berakhot 2b", 14),
            ("Berakhot 3a", 12),
            ("Genesis 1", 31),
            ("Genesis 2", 25),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn comparator_orders_numbers_numerically() {
        let mut refs = vec!["Genesis 2:10", "Genesis 10:1", "Genesis 2:9", "Genesis 2:1"];
        sort_refs(&mut refs);
        assert_eq!(refs, vec!["Genesis 2:1", "Genesis 2:9", "Genesis 2:10", "Genesis 10:1"]);
    }

    #[test]
    fn comparator_orders_amudim() {
        let mut refs = vec!["Berakhot 3a:1", "Berakhot 2b:1", "Berakhot 2a:10", "Berakhot 2a:2"];
        sort_refs(&mut refs);
        assert_eq!(
            refs,
            vec!["Berakhot 2a:2", "Berakhot 2a:10", "Berakhot 2b:1", "Berakhot 3a:1"]
        );
    }

    #[test]
    fn merges_duplicates_into_one_range() {
        let merged = merge_refs(&["Genesis 1:1", "Genesis 1:2", "Genesis 1:1", "Genesis 1:2"]);
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged.get("Genesis 1:1-2"),
            Some(&vec![
                "Genesis 1:1".to_string(),
                "Genesis 1:2".to_string(),
                "Genesis 1:1".to_string(),
                "Genesis 1:2".to_string(),
            ])
        );
    }

    #[test]
    fn merge_keeps_singletons_and_ranges_unmerged() {
        let merged = merge_refs(&[
            "Rashi on Berakhot 2a:1:1",
            "Berakhot 2a",
            "Genesis 1:1-3",
            "Genesis 1:10",
            "Genesis 1:9",
        ]);
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["Berakhot 2a", "Genesis 1:1-3", "Genesis 1:9-10", "Rashi on Berakhot 2a:1:1"]
        );
        assert_eq!(merged["Berakhot 2a"], vec!["Berakhot 2a".to_string()]);
        assert_eq!(
            merged["Genesis 1:9-10"],
            vec!["Genesis 1:10".to_string(), "Genesis 1:9".to_string()]
        );
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        assert!(merge_refs::<&str>(&[]).is_empty());
    }

    #[test]
    fn expands_within_a_page() {
        assert_eq!(
            expand_ref("Berakhot 2a:3-5", &counts()).unwrap(),
            vec!["Berakhot 2a:3", "Berakhot 2a:4", "Berakhot 2a:5"]
        );
    }

    #[test]
    fn expands_across_pages() {
        let expanded = expand_ref("Berakhot 2a:7-3a:2", &counts()).unwrap();
        assert_eq!(expanded.len(), 2 + 14 + 2);
        assert_eq!(expanded[0], "Berakhot 2a:7");
        assert_eq!(expanded[2], "Berakhot 2b:1");
        assert_eq!(expanded.last().map(String::as_str), Some("Berakhot 3a:2"));
    }

    #[test]
    fn expands_across_chapters() {
        let expanded = expand_ref("Genesis 1:30-2:2", &counts()).unwrap();
        assert_eq!(expanded, vec!["Genesis 1:30", "Genesis 1:31", "Genesis 2:1", "Genesis 2:2"]);
    }

    #[test]
    fn expands_single_level_ranges() {
        assert_eq!(
            expand_ref("Siddur Ashkenaz, Berachot, Birkat HaMazon 6-8", &counts()).unwrap(),
            vec![
                "Siddur Ashkenaz, Berachot, Birkat HaMazon 6",
                "Siddur Ashkenaz, Berachot, Birkat HaMazon 7",
                "Siddur Ashkenaz, Berachot, Birkat HaMazon 8",
            ]
        );
    }

    #[test]
    fn atomic_ref_expands_to_itself() {
        assert_eq!(expand_ref("Genesis 1:1", &counts()).unwrap(), vec!["Genesis 1:1"]);
    }

    #[test]
    fn missing_count_is_an_error() {
        assert_eq!(
            expand_ref("Exodus 1:20-2:1", &counts()),
            Err(RefError::MissingSegmentCount("Exodus 1".to_string()))
        );
    }

    #[test]
    fn backwards_range_is_an_error() {
        assert!(matches!(
            expand_ref("Genesis 1:5-3", &counts()),
            Err(RefError::InvalidRange(_))
        ));
    }

    #[test]
    fn merging_an_expansion_round_trips() {
        for range in ["Berakhot 2a:3-5", "Genesis 1:4-9"] {
            let expanded = expand_ref(range, &counts()).unwrap();
            let merged = merge_refs(&expanded);
            let key = merged.keys().next().unwrap();
            assert_eq!(key, range);
            assert_eq!(expand_ref(key, &counts()).unwrap(), expanded);
        }
    }
}
