//! Font capabilities needed to place and decode glyphs.
//!
//! [`Font`] is the seam between the text devices and font loading: the
//! devices only ever decode byte strings to CIDs, map CIDs to unicode, and
//! ask for advance widths. [`PdfFont`](crate::pdf_font::PdfFont) implements
//! it from PDF font dictionaries; tests implement it directly.

use std::fmt;
use std::rc::Rc;

use pdftitle_core::FontId;

use crate::error::BackendError;

pub trait Font {
    /// Base font name, for diagnostics.
    fn name(&self) -> &str;

    /// Splits a shown byte string into character identifiers.
    fn decode(&self, bytes: &[u8]) -> Vec<u32>;

    /// Unicode text for a CID, `None` when the font defines no mapping.
    fn to_unicode(&self, cid: u32) -> Option<String>;

    /// Advance width in text space units (glyph units / 1000).
    fn char_width(&self, cid: u32) -> f64;

    /// Whether glyphs advance downwards instead of to the right.
    fn is_vertical(&self) -> bool {
        false
    }
}

/// A resolved font together with its page-local identity.
#[derive(Clone)]
pub struct FontHandle {
    pub id: FontId,
    pub font: Rc<dyn Font>,
}

impl FontHandle {
    pub fn new(id: FontId, font: Rc<dyn Font>) -> Self {
        Self { id, font }
    }
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontHandle")
            .field("id", &self.id)
            .field("name", &self.font.name())
            .finish()
    }
}

/// Looks up the font a `Tf` operator names.
pub trait FontResolver {
    /// `Ok(None)` means the name is not in the page's font resources.
    fn resolve(&mut self, name: &str) -> Result<Option<FontHandle>, BackendError>;
}

/// A fixed name-to-font table. Ids follow insertion order.
#[derive(Default)]
pub struct FontMap {
    fonts: Vec<(String, FontHandle)>,
}

impl FontMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, font: Rc<dyn Font>) -> FontId {
        let id = FontId(self.fonts.len() as u32);
        self.fonts.push((name.into(), FontHandle::new(id, font)));
        id
    }
}

impl FontResolver for FontMap {
    fn resolve(&mut self, name: &str) -> Result<Option<FontHandle>, BackendError> {
        Ok(self
            .fonts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, handle)| handle.clone()))
    }
}
