//! Casing and file-name helpers applied to a finished title.

/// Upper-cases the first letter of every run of letters and lower-cases the
/// rest, so `"they're O'NEIL"` becomes `"They'Re O'Neil"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// Derives a file name from a title: lower case, only ASCII letters, digits
/// and spaces kept, spaces turned into underscores, `.pdf` appended.
pub fn new_file_name(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    format!("{kept}.pdf")
}
