//! Glyph advance widths.
//!
//! Widths are kept in glyph space (1/1000 of text space). Simple fonts read
//! `/Widths` + `/FirstChar`, falling back to `/FontDescriptor /MissingWidth`
//! and then to built-in tables for the standard 14 fonts. Type0 fonts read
//! `/DW` and `/W` from their descendant CIDFont.

use std::collections::HashMap;

use crate::lopdf_backend::{object_to_f64, resolve_object};

/// Width used by CIDFonts without `/DW`.
pub const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// Width of simple-font codes that no table covers.
const DEFAULT_SIMPLE_WIDTH: f64 = 500.0;

/// Advance widths of a simple (single-byte) font.
#[derive(Debug, Clone)]
pub struct SimpleWidths {
    first_char: u32,
    widths: Vec<f64>,
    missing_width: Option<f64>,
    standard: Option<&'static [u16; 95]>,
}

impl SimpleWidths {
    pub fn new(first_char: u32, widths: Vec<f64>) -> Self {
        Self {
            first_char,
            widths,
            missing_width: None,
            standard: None,
        }
    }

    pub fn with_missing_width(mut self, width: f64) -> Self {
        self.missing_width = Some(width);
        self
    }

    /// Adds the built-in table of a standard 14 font, used for codes the
    /// explicit `/Widths` do not cover.
    pub fn with_standard_font(mut self, base_font: &str) -> Self {
        self.standard = standard_widths(base_font);
        self
    }

    /// Reads `/FirstChar`, `/Widths` and `/FontDescriptor /MissingWidth`.
    pub fn from_dict(doc: &lopdf::Document, dict: &lopdf::Dictionary) -> Self {
        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| object_to_f64(resolve_object(doc, o)))
            .map_or(0, |v| v.max(0.0) as u32);
        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve_object(doc, o).as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|o| object_to_f64(resolve_object(doc, o)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();
        let mut metrics = Self::new(first_char, widths);
        let missing = dict
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| resolve_object(doc, o).as_dict().ok())
            .and_then(|desc| desc.get(b"MissingWidth").ok())
            .and_then(|o| object_to_f64(resolve_object(doc, o)));
        if let Some(missing) = missing {
            metrics = metrics.with_missing_width(missing);
        }
        metrics
    }

    /// Glyph-space width of `code`.
    pub fn width(&self, code: u32) -> f64 {
        if let Some(w) = code
            .checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
        {
            return *w;
        }
        if let Some(w) = self.missing_width {
            return w;
        }
        if let Some(table) = self.standard {
            if (32..=126).contains(&code) {
                return f64::from(table[(code - 32) as usize]);
            }
        }
        DEFAULT_SIMPLE_WIDTH
    }
}

/// Advance widths of a CIDFont.
#[derive(Debug, Clone)]
pub struct CidWidths {
    default_width: f64,
    widths: HashMap<u32, f64>,
}

impl Default for CidWidths {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_CID_WIDTH,
            widths: HashMap::new(),
        }
    }
}

impl CidWidths {
    /// Reads `/DW` and `/W` from a descendant CIDFont dictionary.
    pub fn from_dict(doc: &lopdf::Document, dict: &lopdf::Dictionary) -> Self {
        let default_width = dict
            .get(b"DW")
            .ok()
            .and_then(|o| object_to_f64(resolve_object(doc, o)))
            .unwrap_or(DEFAULT_CID_WIDTH);
        let widths = dict
            .get(b"W")
            .ok()
            .and_then(|o| resolve_object(doc, o).as_array().ok())
            .map(|arr| parse_w_array(doc, arr))
            .unwrap_or_default();
        Self {
            default_width,
            widths,
        }
    }

    pub fn width(&self, cid: u32) -> f64 {
        self.widths.get(&cid).copied().unwrap_or(self.default_width)
    }
}

/// `/W` holds `c [w1 w2 ...]` and `c_first c_last w` groups.
fn parse_w_array(doc: &lopdf::Document, items: &[lopdf::Object]) -> HashMap<u32, f64> {
    let number = |o: &lopdf::Object| object_to_f64(resolve_object(doc, o));
    let mut widths = HashMap::new();
    let mut i = 0;
    while i < items.len() {
        let Some(start) = number(&items[i]) else {
            i += 1;
            continue;
        };
        let start = start.max(0.0) as u32;
        let Some(next) = items.get(i + 1) else {
            break;
        };
        if let Ok(list) = resolve_object(doc, next).as_array() {
            for (offset, w) in list.iter().enumerate() {
                if let Some(w) = number(w) {
                    widths.insert(start + offset as u32, w);
                }
            }
            i += 2;
        } else {
            let end = number(next).map(|v| v.max(0.0) as u32);
            let w = items.get(i + 2).and_then(number);
            if let (Some(end), Some(w)) = (end, w) {
                for cid in start..=end.min(start.saturating_add(0xFFFF)) {
                    widths.insert(cid, w);
                }
            }
            i += 3;
        }
    }
    widths
}

/// Widths of codes 32..=126 for the standard 14 fonts that have a Latin
/// repertoire. Bold and italic faces share their family's regular table.
fn standard_widths(base_font: &str) -> Option<&'static [u16; 95]> {
    // subset prefixes look like "ABCDEF+Helvetica"
    let name = base_font.split_once('+').map_or(base_font, |(_, rest)| rest);
    if name.starts_with("Helvetica") || name.starts_with("Arial") {
        Some(&HELVETICA)
    } else if name.starts_with("Times") {
        Some(&TIMES_ROMAN)
    } else if name.starts_with("Courier") {
        Some(&COURIER)
    } else {
        None
    }
}

static COURIER: [u16; 95] = [600; 95];

#[rustfmt::skip]
static HELVETICA: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9 : ; < = > ?
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    // @ A-O
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    // P-Z [ \ ] ^ _
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    // ` a-o
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    // p-z { | } ~
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
static TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];
