//! [`Font`] implementation backed by a PDF font dictionary.

use lopdf::{Dictionary, Document, Object};
use tracing::warn;

use crate::cmap::ToUnicodeCMap;
use crate::encoding::{BaseEncoding, SimpleEncoding};
use crate::error::BackendError;
use crate::font::Font;
use crate::font_metrics::{CidWidths, SimpleWidths};
use crate::lopdf_backend::{object_to_f64, resolve_object, stream_content};

#[derive(Debug, Clone)]
enum FontKind {
    /// Type1, TrueType, Type3 and MMType1: one byte per code.
    Simple {
        encoding: SimpleEncoding,
        widths: SimpleWidths,
        /// Glyph space to text space; 1/1000 except for Type3 `/FontMatrix`.
        width_scale: f64,
    },
    /// Type0: two bytes per code, CID = code.
    Composite { widths: CidWidths, vertical: bool },
}

/// A font loaded from a page's `/Resources /Font` entry.
#[derive(Debug, Clone)]
pub struct PdfFont {
    name: String,
    kind: FontKind,
    to_unicode: Option<ToUnicodeCMap>,
}

fn name_of(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    let obj = resolve_object(doc, dict.get(key).ok()?);
    obj.as_name().ok().map(|n| String::from_utf8_lossy(n).into_owned())
}

impl PdfFont {
    pub fn load(doc: &Document, dict: &Dictionary) -> Result<Self, BackendError> {
        let name = name_of(doc, dict, b"BaseFont").unwrap_or_else(|| "unnamed".to_string());
        let subtype = name_of(doc, dict, b"Subtype").unwrap_or_default();
        let to_unicode = load_to_unicode(doc, dict, &name);

        let kind = if subtype == "Type0" {
            let encoding = name_of(doc, dict, b"Encoding").unwrap_or_default();
            let widths = descendant_font(doc, dict)
                .map(|desc| CidWidths::from_dict(doc, desc))
                .unwrap_or_default();
            FontKind::Composite {
                widths,
                vertical: encoding.ends_with("-V"),
            }
        } else {
            let default_base = if subtype == "TrueType" {
                BaseEncoding::WinAnsi
            } else {
                BaseEncoding::Standard
            };
            let width_scale = if subtype == "Type3" {
                type3_width_scale(doc, dict)
            } else {
                0.001
            };
            FontKind::Simple {
                encoding: simple_encoding(doc, dict, default_base),
                widths: SimpleWidths::from_dict(doc, dict).with_standard_font(&name),
                width_scale,
            }
        };

        Ok(Self {
            name,
            kind,
            to_unicode,
        })
    }
}

impl Font for PdfFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, bytes: &[u8]) -> Vec<u32> {
        match self.kind {
            FontKind::Simple { .. } => bytes.iter().map(|&b| u32::from(b)).collect(),
            FontKind::Composite { .. } => bytes
                .chunks(2)
                .map(|pair| pair.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
                .collect(),
        }
    }

    fn to_unicode(&self, cid: u32) -> Option<String> {
        if let Some(text) = self.to_unicode.as_ref().and_then(|m| m.lookup(cid)) {
            return Some(text.to_string());
        }
        match &self.kind {
            FontKind::Simple { encoding, .. } => u8::try_from(cid)
                .ok()
                .and_then(|code| encoding.decode(code))
                .map(String::from),
            FontKind::Composite { .. } => None,
        }
    }

    fn char_width(&self, cid: u32) -> f64 {
        match &self.kind {
            FontKind::Simple {
                widths,
                width_scale,
                ..
            } => widths.width(cid) * width_scale,
            FontKind::Composite { widths, .. } => widths.width(cid) / 1000.0,
        }
    }

    fn is_vertical(&self) -> bool {
        matches!(self.kind, FontKind::Composite { vertical: true, .. })
    }
}

fn load_to_unicode(doc: &Document, dict: &Dictionary, font_name: &str) -> Option<ToUnicodeCMap> {
    let stream = resolve_object(doc, dict.get(b"ToUnicode").ok()?)
        .as_stream()
        .ok()?;
    let parsed = stream_content(stream).and_then(|data| ToUnicodeCMap::parse(&data));
    match parsed {
        Ok(cmap) => Some(cmap),
        Err(e) => {
            warn!(font = font_name, error = %e, "ignoring unreadable ToUnicode CMap");
            None
        }
    }
}

fn descendant_font<'a>(doc: &'a Document, dict: &'a Dictionary) -> Option<&'a Dictionary> {
    let descendants = resolve_object(doc, dict.get(b"DescendantFonts").ok()?);
    let first = descendants.as_array().ok()?.first()?;
    resolve_object(doc, first).as_dict().ok()
}

fn type3_width_scale(doc: &Document, dict: &Dictionary) -> f64 {
    dict.get(b"FontMatrix")
        .ok()
        .and_then(|o| resolve_object(doc, o).as_array().ok())
        .and_then(|m| m.first())
        .and_then(|a| object_to_f64(resolve_object(doc, a)))
        .unwrap_or(0.001)
}

/// `/Encoding` is either a base encoding name or a dictionary with an
/// optional `/BaseEncoding` and a `/Differences` array.
fn simple_encoding(doc: &Document, dict: &Dictionary, default_base: BaseEncoding) -> SimpleEncoding {
    let Ok(encoding) = dict.get(b"Encoding") else {
        return SimpleEncoding::new(default_base);
    };
    match resolve_object(doc, encoding) {
        Object::Name(name) => SimpleEncoding::new(
            BaseEncoding::from_name(&String::from_utf8_lossy(name)).unwrap_or(default_base),
        ),
        Object::Dictionary(enc) => {
            let base = name_of(doc, enc, b"BaseEncoding")
                .and_then(|n| BaseEncoding::from_name(&n))
                .unwrap_or(default_base);
            let mut encoding = SimpleEncoding::new(base);
            if let Some(differences) = enc
                .get(b"Differences")
                .ok()
                .and_then(|o| resolve_object(doc, o).as_array().ok())
            {
                apply_differences(doc, &mut encoding, differences);
            }
            encoding
        }
        _ => SimpleEncoding::new(default_base),
    }
}

/// `[code name name ... code name ...]`: each number restarts the code.
fn apply_differences(doc: &Document, encoding: &mut SimpleEncoding, items: &[Object]) {
    let mut code: Option<u32> = None;
    for item in items {
        match resolve_object(doc, item) {
            Object::Name(glyph) => {
                if let Some(c) = code {
                    if let Ok(byte) = u8::try_from(c) {
                        encoding.set_difference(byte, &String::from_utf8_lossy(glyph));
                    }
                    code = Some(c.saturating_add(1));
                }
            }
            other => {
                if let Some(n) = object_to_f64(other) {
                    code = Some(n.clamp(0.0, f64::from(u32::MAX)) as u32);
                }
            }
        }
    }
}
