//! Plain-text rendering of a page, used as the corpus for space recovery.
//!
//! Glyphs are written in drawing order. A jump to another line starts a new
//! line and a horizontal gap wider than a fraction of the font size becomes
//! a space, so words split into separate show operations come out apart.

use tracing::trace;

use crate::device::{DeviceOptions, SPACE_CID, TextDevice, TjElement, active_font, advance};
use crate::error::BackendError;
use crate::font::FontHandle;
use crate::text_state::TextState;

/// Line change threshold, as a fraction of the glyph size.
const LINE_THRESHOLD: f64 = 0.5;
/// Word gap threshold, as a fraction of the glyph size.
const WORD_THRESHOLD: f64 = 0.1;

/// Where the previous glyph ended, in device space.
#[derive(Debug, Clone, Copy)]
struct Pen {
    x: f64,
    y: f64,
    size: f64,
    vertical: bool,
}

/// Collects the text of a page.
#[derive(Debug, Default)]
pub struct PlainTextDevice {
    options: DeviceOptions,
    text: String,
    pen: Option<Pen>,
}

impl PlainTextDevice {
    pub fn new(options: DeviceOptions) -> Self {
        Self {
            options,
            text: String::new(),
            pen: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    fn separate(&mut self, x: f64, y: f64) {
        let Some(pen) = self.pen else {
            return;
        };
        // along the writing direction, and across it
        let (along, across) = if pen.vertical {
            (y - pen.y, x - pen.x)
        } else {
            (x - pen.x, y - pen.y)
        };
        let size = pen.size.abs();
        if across.abs() > LINE_THRESHOLD * size {
            if !self.text.ends_with('\n') {
                self.text.push('\n');
            }
        } else if along.abs() > WORD_THRESHOLD * size && !self.text.ends_with([' ', '\n']) {
            self.text.push(' ');
        }
    }

    fn draw_cid(
        &mut self,
        state: &mut TextState,
        font: &FontHandle,
        cid: u32,
    ) -> Result<(), BackendError> {
        let trm = state.rendering_matrix().ok_or_else(|| {
            BackendError::Interpreter("text shown outside a text object".to_string())
        })?;
        let (x, y) = trm.transform_point(0.0, 0.0);
        self.separate(x, y);

        let glyph = font
            .font
            .to_unicode(cid)
            .or_else(|| self.options.missing_char.clone());
        if let Some(glyph) = glyph {
            trace!(%glyph, x, y, "plain glyph");
            self.text.push_str(&glyph);
        }

        let vertical = font.font.is_vertical();
        let width = font.font.char_width(cid);
        let displacement = state.glyph_displacement(width, cid == SPACE_CID, vertical);
        advance(state, displacement)?;
        if let Some(next) = state.rendering_matrix() {
            let (x, y) = next.transform_point(0.0, 0.0);
            self.pen = Some(Pen {
                x,
                y,
                size: trm.a.abs().max(trm.d.abs()),
                vertical,
            });
        }
        Ok(())
    }
}

impl TextDevice for PlainTextDevice {
    fn show_array(
        &mut self,
        state: &mut TextState,
        elements: &[TjElement],
    ) -> Result<(), BackendError> {
        let font = active_font(state)?;
        for element in elements {
            match element {
                TjElement::Adjustment(adj) => {
                    let displacement = state.adjustment_displacement(*adj, font.font.is_vertical());
                    advance(state, displacement)?;
                }
                TjElement::String(bytes) => {
                    for cid in font.font.decode(bytes) {
                        self.draw_cid(state, &font, cid)?;
                    }
                }
            }
        }
        Ok(())
    }
}
