//! The Hadran recited on finishing a masechet.

use daf_core::{Book, BookKind};

use crate::response::Segment;

/// Segments appended after the last amud of `book`. Empty for anything that
/// is not a masechet.
#[must_use]
pub fn hadran_segments(book: &Book) -> Vec<Segment> {
    let BookKind::Masechet(info) = book.kind() else {
        return Vec::new();
    };
    let name = book.canonical_name();
    let vocalized = if info.vocalized_name.is_empty() {
        book.hebrew_name()
    } else {
        info.vocalized_name.as_str()
    };

    let he = format!(
        "הַדְרָן עֲלָךְ מַסֶּכֶת <strong>{vocalized}</strong> וְהַדְרָךְ עֲלַן, \
         דַּעְתָּן עֲלָךְ מַסֶּכֶת <strong>{vocalized}</strong> וְדַעְתָּךְ עֲלַן, \
         לָא נִתְנְשֵׁי מִינָּךְ מַסֶּכֶת <strong>{vocalized}</strong> וְלָא תִתְנְשֵׁי מִינַּן, \
         לָא בְּעָלְמָא הָדֵין וְלָא בְּעָלְמָא דְאָתֵי."
    );
    let en = format!(
        "We will return to you, tractate {name}, and you will return to us; \
         our mind is on you, tractate {name}, and your mind is on us; \
         we will not forget you, tractate {name}, and you will not forget us, \
         not in this world and not in the world to come."
    );

    vec![Segment {
        r#ref: format!("Hadran {name}"),
        he: he.into(),
        en: en.into(),
        hadran: true,
        ..Segment::default()
    }]
}
