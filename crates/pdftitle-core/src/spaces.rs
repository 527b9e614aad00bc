//! Reinsert word spaces into titles assembled from glyph runs.
//!
//! Glyph runs often lack explicit space glyphs because PDF producers position
//! words with text matrix moves instead. The plain-text rendering of the
//! page does contain the spaces, so the spaceless title is aligned against
//! it with a greedy single-pass matcher.

fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Aligns `title` (expected to contain no spaces) against `corpus`.
///
/// Characters are compared case-insensitively and the corpus casing is kept.
/// Spaces and newlines met inside a partial match become single spaces in
/// the result; any other mismatch restarts the search. Returns an empty
/// string when no alignment completes before the corpus runs out.
pub fn retrieve_spaces(corpus: &str, title: &str) -> String {
    let corpus: Vec<char> = corpus.chars().collect();
    let title: Vec<char> = title.chars().collect();

    let mut result = String::new();
    let mut t = 0;
    for &c in &corpus {
        if t >= title.len() {
            break;
        }
        if same_letter(c, title[t]) {
            result.push(c);
            t += 1;
        } else if t != 0 {
            if c == ' ' || c == '\n' {
                result.push(' ');
            } else {
                t = 0;
                result.clear();
            }
        }
    }
    result
}

/// Collapses runs of spaces into one, trimming the ends.
///
/// Strings without a double space come back unchanged.
pub fn collapse_spaces(title: &str) -> String {
    if title.contains("  ") {
        title.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        title.to_string()
    }
}

/// Post-processes a raw selection result.
///
/// A title without any space is realigned against `corpus`; the realigned
/// string replaces it only when non-empty. Double spaces are then collapsed.
pub fn repair_title(corpus: &str, raw: &str) -> String {
    let mut title = raw.to_string();
    if !title.contains(' ') {
        let spaced = retrieve_spaces(corpus, &title);
        if !spaced.is_empty() {
            title = spaced;
        }
    }
    collapse_spaces(&title)
}
