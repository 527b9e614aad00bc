//! Text blocks: maximal runs of glyphs drawn with one font at one size.

use std::fmt;

/// Identity of a loaded font within one page pass.
///
/// Ids are handed out in the order fonts are first resolved, so two passes
/// over the same content stream always produce the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontId(pub u32);

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A run of consecutively drawn glyphs sharing font and effective size.
///
/// `x`/`y` are the device-space coordinates of the first glyph. `size` is
/// the font size after scaling by the text matrix, not the raw `Tf` operand.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    pub font: FontId,
    /// Base font name, for diagnostics only.
    pub font_name: String,
    pub size: f64,
    pub x: f64,
    pub y: f64,
    /// Decoded glyphs in rendering order. A glyph may map to several chars.
    pub glyphs: Vec<String>,
}

impl Block {
    pub fn new(
        font: FontId,
        font_name: impl Into<String>,
        size: f64,
        x: f64,
        y: f64,
        first: impl Into<String>,
    ) -> Self {
        Self {
            font,
            font_name: font_name.into(),
            size,
            x,
            y,
            glyphs: vec![first.into()],
        }
    }

    /// Whether a glyph drawn with `font` at `size` continues this block.
    pub fn accepts(&self, font: FontId, size: f64) -> bool {
        self.font == font && self.size == size
    }

    pub fn push(&mut self, glyph: impl Into<String>) {
        self.glyphs.push(glyph.into());
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// The glyphs joined into one string.
    pub fn text(&self) -> String {
        self.glyphs.concat()
    }
}
