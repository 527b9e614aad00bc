//! Ligature un-folding for extracted titles.
//!
//! Fonts frequently map ligature glyphs to the Latin presentation forms
//! U+FB00..U+FB06. Only those seven code points are expanded; every other
//! character passes through untouched.

/// Expansion of each presentation form, indexed from U+FB00.
const LATIN_LIGATURES: [&str; 7] = ["ff", "fi", "fl", "ffi", "ffl", "ft", "st"];

/// Component letters of a Latin presentation-form ligature.
pub fn expand_ligature(ch: char) -> Option<&'static str> {
    let index = u32::from(ch).checked_sub(0xFB00)?;
    LATIN_LIGATURES.get(index as usize).copied()
}

/// Replaces ff, fi, fl, ffi, ffl, ft and st ligatures with their component
/// letters.
pub fn convert_ligatures(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match expand_ligature(ch) {
            Some(letters) => out.push_str(letters),
            None => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_each_ligature() {
        assert_eq!(convert_ligatures("\u{FB00}"), "ff");
        assert_eq!(convert_ligatures("\u{FB01}"), "fi");
        assert_eq!(convert_ligatures("\u{FB02}"), "fl");
        assert_eq!(convert_ligatures("\u{FB03}"), "ffi");
        assert_eq!(convert_ligatures("\u{FB04}"), "ffl");
        assert_eq!(convert_ligatures("\u{FB05}"), "ft");
        assert_eq!(convert_ligatures("\u{FB06}"), "st");
    }

    #[test]
    fn long_s_t_is_not_folded_to_st() {
        assert_eq!(convert_ligatures("So\u{FB05}ware"), "Software");
        assert_eq!(expand_ligature('\u{FB05}'), Some("ft"));
    }

    #[test]
    fn expands_inside_words() {
        assert_eq!(
            convert_ligatures("E\u{FB03}cient \u{FB01}le systems"),
            "Efficient file systems"
        );
    }

    #[test]
    fn leaves_other_compatibility_chars_alone() {
        assert_eq!(convert_ligatures("x\u{00B2} \u{2126}"), "x\u{00B2} \u{2126}");
        assert_eq!(convert_ligatures("\u{FB07}\u{FB13}\u{FAFF}"), "\u{FB07}\u{FB13}\u{FAFF}");
        assert_eq!(expand_ligature('a'), None);
    }

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(convert_ligatures("On Computable Numbers"), "On Computable Numbers");
    }
}
