//! Single-byte font encodings.
//!
//! Simple fonts map each byte to a glyph through a base encoding, optionally
//! patched by a `/Differences` array of glyph names. Unicode for a glyph
//! name comes from a trimmed Adobe glyph list plus the `uniXXXX`/`uXXXX`
//! conventions and accented-letter names such as `eacute`.

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

/// A predefined base encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseEncoding {
    Standard,
    WinAnsi,
    MacRoman,
}

impl BaseEncoding {
    /// Maps `/WinAnsiEncoding` and friends; `None` for anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "StandardEncoding" => Some(Self::Standard),
            "WinAnsiEncoding" => Some(Self::WinAnsi),
            "MacRomanEncoding" => Some(Self::MacRoman),
            _ => None,
        }
    }

    pub fn decode(&self, code: u8) -> Option<char> {
        if code < 0x20 {
            return None;
        }
        match self {
            Self::Standard => standard_char(code),
            Self::WinAnsi => single_byte(encoding_rs::WINDOWS_1252, code),
            Self::MacRoman => single_byte(encoding_rs::MACINTOSH, code),
        }
    }
}

fn single_byte(encoding: &'static encoding_rs::Encoding, code: u8) -> Option<char> {
    let bytes = [code];
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes);
    if had_errors {
        return None;
    }
    text.chars().next().filter(|c| !c.is_control())
}

/// Adobe StandardEncoding. Differs from ASCII at the two quote positions and
/// carries its own high half.
fn standard_char(code: u8) -> Option<char> {
    let c = match code {
        0x27 => '\u{2019}',
        0x60 => '\u{2018}',
        0x20..=0x7E => char::from(code),
        0xA1 => '¡',
        0xA2 => '¢',
        0xA3 => '£',
        0xA4 => '\u{2044}',
        0xA5 => '¥',
        0xA6 => 'ƒ',
        0xA7 => '§',
        0xA8 => '¤',
        0xA9 => '\'',
        0xAA => '\u{201C}',
        0xAB => '«',
        0xAC => '\u{2039}',
        0xAD => '\u{203A}',
        0xAE => '\u{FB01}',
        0xAF => '\u{FB02}',
        0xB1 => '\u{2013}',
        0xB2 => '\u{2020}',
        0xB3 => '\u{2021}',
        0xB4 => '·',
        0xB6 => '¶',
        0xB7 => '\u{2022}',
        0xB8 => '\u{201A}',
        0xB9 => '\u{201E}',
        0xBA => '\u{201D}',
        0xBB => '»',
        0xBC => '\u{2026}',
        0xBD => '\u{2030}',
        0xBF => '¿',
        0xC1 => '`',
        0xC2 => '´',
        0xC3 => '\u{02C6}',
        0xC4 => '\u{02DC}',
        0xC5 => '¯',
        0xC6 => '\u{02D8}',
        0xC7 => '\u{02D9}',
        0xC8 => '¨',
        0xCA => '\u{02DA}',
        0xCB => '¸',
        0xCD => '\u{02DD}',
        0xCE => '\u{02DB}',
        0xCF => '\u{02C7}',
        0xD0 => '\u{2014}',
        0xE1 => 'Æ',
        0xE3 => 'ª',
        0xE8 => 'Ł',
        0xE9 => 'Ø',
        0xEA => 'Œ',
        0xEB => 'º',
        0xF1 => 'æ',
        0xF5 => 'ı',
        0xF8 => 'ł',
        0xF9 => 'ø',
        0xFA => 'œ',
        0xFB => 'ß',
        _ => return None,
    };
    Some(c)
}

/// A base encoding with `/Differences` applied on top.
#[derive(Debug, Clone)]
pub struct SimpleEncoding {
    base: BaseEncoding,
    /// `None` marks a glyph name with no known unicode.
    differences: HashMap<u8, Option<char>>,
}

impl SimpleEncoding {
    pub fn new(base: BaseEncoding) -> Self {
        Self {
            base,
            differences: HashMap::new(),
        }
    }

    pub fn base(&self) -> BaseEncoding {
        self.base
    }

    /// Overrides `code` with the glyph called `glyph_name`.
    pub fn set_difference(&mut self, code: u8, glyph_name: &str) {
        self.differences.insert(code, glyph_name_to_char(glyph_name));
    }

    pub fn decode(&self, code: u8) -> Option<char> {
        match self.differences.get(&code) {
            Some(mapped) => *mapped,
            None => self.base.decode(code),
        }
    }
}

/// Resolves a glyph name to unicode.
pub fn glyph_name_to_char(name: &str) -> Option<char> {
    // "a.sc", "one.oldstyle", "f_i" style suffixes name variants of a base glyph
    let name = name.split('.').next().unwrap_or(name);
    if name.chars().count() == 1 && name.is_ascii() {
        return name.chars().next();
    }
    if let Some(c) = named_glyph(name) {
        return Some(c);
    }
    if let Some(hex) = name.strip_prefix("uni") {
        if hex.len() == 4 {
            return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
        }
    }
    if let Some(hex) = name.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) {
            return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
        }
    }
    accented_letter(name)
}

/// `eacute`, `Udieresis`, `ccedilla`... composed with NFC.
fn accented_letter(name: &str) -> Option<char> {
    const MARKS: [(&str, char); 9] = [
        ("acute", '\u{0301}'),
        ("grave", '\u{0300}'),
        ("circumflex", '\u{0302}'),
        ("dieresis", '\u{0308}'),
        ("tilde", '\u{0303}'),
        ("ring", '\u{030A}'),
        ("cedilla", '\u{0327}'),
        ("caron", '\u{030C}'),
        ("macron", '\u{0304}'),
    ];
    let mut chars = name.chars();
    let base = chars.next().filter(char::is_ascii_alphabetic)?;
    let rest = chars.as_str();
    let (_, mark) = MARKS.iter().find(|(suffix, _)| *suffix == rest)?;
    let mut composed = [base, *mark].into_iter().nfc();
    let c = composed.next()?;
    // only accept a single precomposed character
    match composed.next() {
        None => Some(c),
        Some(_) => None,
    }
}

fn named_glyph(name: &str) -> Option<char> {
    let c = match name {
        "space" | "nbspace" => ' ',
        "exclam" => '!',
        "quotedbl" => '"',
        "numbersign" => '#',
        "dollar" => '$',
        "percent" => '%',
        "ampersand" => '&',
        "quotesingle" => '\'',
        "parenleft" => '(',
        "parenright" => ')',
        "asterisk" => '*',
        "plus" => '+',
        "comma" => ',',
        "hyphen" | "minus" => '-',
        "period" => '.',
        "slash" => '/',
        "zero" => '0',
        "one" => '1',
        "two" => '2',
        "three" => '3',
        "four" => '4',
        "five" => '5',
        "six" => '6',
        "seven" => '7',
        "eight" => '8',
        "nine" => '9',
        "colon" => ':',
        "semicolon" => ';',
        "less" => '<',
        "equal" => '=',
        "greater" => '>',
        "question" => '?',
        "at" => '@',
        "bracketleft" => '[',
        "backslash" => '\\',
        "bracketright" => ']',
        "asciicircum" => '^',
        "underscore" => '_',
        "grave" => '`',
        "braceleft" => '{',
        "bar" => '|',
        "braceright" => '}',
        "asciitilde" => '~',
        "quoteleft" => '\u{2018}',
        "quoteright" => '\u{2019}',
        "quotedblleft" => '\u{201C}',
        "quotedblright" => '\u{201D}',
        "quotesinglbase" => '\u{201A}',
        "quotedblbase" => '\u{201E}',
        "guillemotleft" => '«',
        "guillemotright" => '»',
        "guilsinglleft" => '\u{2039}',
        "guilsinglright" => '\u{203A}',
        "endash" => '\u{2013}',
        "emdash" => '\u{2014}',
        "bullet" => '\u{2022}',
        "ellipsis" => '\u{2026}',
        "dagger" => '\u{2020}',
        "daggerdbl" => '\u{2021}',
        "perthousand" => '\u{2030}',
        "trademark" => '\u{2122}',
        "copyright" => '©',
        "registered" => '®',
        "degree" => '°',
        "section" => '§',
        "paragraph" => '¶',
        "periodcentered" => '·',
        "exclamdown" => '¡',
        "questiondown" => '¿',
        "cent" => '¢',
        "sterling" => '£',
        "yen" => '¥',
        "Euro" => '€',
        "currency" => '¤',
        "florin" => 'ƒ',
        "fraction" => '\u{2044}',
        "multiply" => '×',
        "divide" => '÷',
        "plusminus" => '±',
        "mu" => 'µ',
        "ordfeminine" => 'ª',
        "ordmasculine" => 'º',
        "onehalf" => '½',
        "onequarter" => '¼',
        "threequarters" => '¾',
        "AE" => 'Æ',
        "ae" => 'æ',
        "OE" => 'Œ',
        "oe" => 'œ',
        "Oslash" => 'Ø',
        "oslash" => 'ø',
        "Lslash" => 'Ł',
        "lslash" => 'ł',
        "germandbls" => 'ß',
        "dotlessi" => 'ı',
        "Eth" => 'Ð',
        "eth" => 'ð',
        "Thorn" => 'Þ',
        "thorn" => 'þ',
        "ff" | "f_f" => '\u{FB00}',
        "fi" | "f_i" => '\u{FB01}',
        "fl" | "f_l" => '\u{FB02}',
        "ffi" | "f_f_i" => '\u{FB03}',
        "ffl" | "f_f_l" => '\u{FB04}',
        "acute" => '´',
        "dieresis" => '¨',
        "macron" => '¯',
        "cedilla" => '¸',
        "circumflex" => '\u{02C6}',
        "tilde" => '\u{02DC}',
        "caron" => '\u{02C7}',
        "breve" => '\u{02D8}',
        "dotaccent" => '\u{02D9}',
        "ring" => '\u{02DA}',
        "ogonek" => '\u{02DB}',
        "hungarumlaut" => '\u{02DD}',
        _ => return None,
    };
    Some(c)
}
