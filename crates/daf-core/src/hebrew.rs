//! Hebrew numerals and text normalization.

const ONES: [char; 9] = ['א', 'ב', 'ג', 'ד', 'ה', 'ו', 'ז', 'ח', 'ט'];
const TENS: [char; 9] = ['י', 'כ', 'ל', 'מ', 'נ', 'ס', 'ע', 'פ', 'צ'];
const HUNDREDS: [char; 4] = ['ק', 'ר', 'ש', 'ת'];

/// Geresh and gershayim, in both their Hebrew and ASCII forms.
const NUMERAL_PUNCTUATION: [char; 4] = ['׳', '״', '\'', '"'];

fn letter_value(letter: char) -> Option<(u32, u8)> {
    if let Some(i) = ONES.iter().position(|&c| c == letter) {
        return Some((u32::try_from(i).ok()? + 1, 0));
    }
    if let Some(i) = TENS.iter().position(|&c| c == letter) {
        return Some(((u32::try_from(i).ok()? + 1) * 10, 1));
    }
    if let Some(i) = HUNDREDS.iter().position(|&c| c == letter) {
        return Some(((u32::try_from(i).ok()? + 1) * 100, 2));
    }
    None
}

/// Parses a Hebrew numeral such as `קכג` (123) or `טו` (15).
///
/// Letters must appear in descending place order: hundreds, then at most one
/// tens letter, then at most one ones letter. The two conventional spellings
/// `טו`/`טז` are accepted for 15 and 16. Geresh marks are ignored.
#[must_use]
pub fn hebrew_numeral_to_int(text: &str) -> Option<u32> {
    let letters: Vec<char> = text
        .chars()
        .filter(|c| !NUMERAL_PUNCTUATION.contains(c))
        .collect();
    if letters.is_empty() {
        return None;
    }

    let (body, tail) = match letters.as_slice() {
        [rest @ .., 'ט', 'ו'] => (rest, 15),
        [rest @ .., 'ט', 'ז'] => (rest, 16),
        all => (all, 0),
    };

    let mut total = 0;
    let mut previous_place = u8::MAX;
    let mut previous_value = u32::MAX;
    for &letter in body {
        let (value, place) = letter_value(letter)?;
        if place > previous_place || (place == previous_place && place < 2) {
            return None;
        }
        if place == 2 && value > previous_value {
            return None;
        }
        total += value;
        previous_place = place;
        previous_value = value;
    }
    if tail > 0 && previous_place < 2 {
        return None;
    }
    Some(total + tail)
}

/// Formats a positive integer as a Hebrew numeral, e.g. `123` → `קכג`.
#[must_use]
pub fn int_to_hebrew_numeral(mut number: u32) -> String {
    let mut result = String::new();
    while number >= 400 {
        result.push('ת');
        number -= 400;
    }
    if number >= 100 {
        result.push(HUNDREDS[(number / 100 - 1) as usize]);
        number %= 100;
    }
    match number {
        15 => result.push_str("טו"),
        16 => result.push_str("טז"),
        _ => {
            if number >= 10 {
                result.push(TENS[(number / 10 - 1) as usize]);
                number %= 10;
            }
            if number > 0 {
                result.push(ONES[(number - 1) as usize]);
            }
        }
    }
    result
}

/// Whether `c` is a Hebrew point, cantillation mark or other non-letter in
/// the Hebrew block.
const fn is_hebrew_nonletter(c: char) -> bool {
    matches!(c, '\u{0591}'..='\u{05C7}') && !matches!(c, '\u{05BE}' | '\u{05C0}' | '\u{05C3}' | '\u{05C6}')
}

/// Removes vowel points and cantillation marks, keeping letters and
/// punctuation.
#[must_use]
pub fn strip_hebrew_nonletters(text: &str) -> String {
    text.chars().filter(|&c| !is_hebrew_nonletter(c)).collect()
}

/// Normalized form used for fuzzy substring searches: points and cantillation
/// stripped, whitespace runs collapsed to one space, maqaf treated as a space.
///
/// Returns the normalized text together with, for every normalized char, the
/// byte offset of the char it came from in `text`.
#[must_use]
pub fn normalize_for_search(text: &str) -> (String, Vec<usize>) {
    let mut normalized = String::with_capacity(text.len());
    let mut offsets = Vec::with_capacity(text.len());
    let mut last_was_space = false;
    for (offset, c) in text.char_indices() {
        if is_hebrew_nonletter(c) {
            continue;
        }
        if c.is_whitespace() || c == '\u{05BE}' {
            if last_was_space {
                continue;
            }
            normalized.push(' ');
            offsets.push(offset);
            last_was_space = true;
        } else {
            normalized.push(c);
            offsets.push(offset);
            last_was_space = false;
        }
    }
    (normalized, offsets)
}
