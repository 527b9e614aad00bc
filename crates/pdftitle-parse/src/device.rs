//! Text devices: consumers of text-show events.
//!
//! The interpreter turns `Tj`, `TJ`, `'` and `"` into a single
//! [`TextDevice::show_array`] call. [`BlockBuilder`] places every glyph with
//! the text rendering matrix and groups consecutive glyphs that share font
//! and effective size into [`Block`]s.

use pdftitle_core::{Block, TitleError};
use tracing::{debug, trace};

use crate::error::BackendError;
use crate::font::FontHandle;
use crate::text_state::TextState;

/// An element of a `TJ` array operand.
#[derive(Debug, Clone, PartialEq)]
pub enum TjElement {
    /// Bytes to decode with the active font.
    String(Vec<u8>),
    /// Position adjustment in thousandths of text space. Positive moves
    /// back against the writing direction.
    Adjustment(f64),
}

/// Receives text-show events from the interpreter.
pub trait TextDevice {
    fn show_array(&mut self, state: &mut TextState, elements: &[TjElement])
    -> Result<(), BackendError>;
}

/// Options shared by the text devices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceOptions {
    /// Text used for glyphs without a unicode mapping. `None` makes such
    /// glyphs fatal.
    pub missing_char: Option<String>,
    /// Insert a space when a `TJ` adjustment is nearly as wide as a space.
    pub translation_heuristic: bool,
}

/// Code whose advance also gets the word spacing.
pub(crate) const SPACE_CID: u32 = 32;

/// Fraction of a space advance an adjustment needs to count as a space.
const SPACE_ADJUSTMENT_RATIO: f64 = 0.9;

/// The active font, or the fatal undefined-font error.
pub(crate) fn active_font(state: &TextState) -> Result<FontHandle, BackendError> {
    state
        .font
        .clone()
        .ok_or_else(|| TitleError::UndefinedFont("no font selected before text".to_string()).into())
}

/// Moves `Tm` by a text space offset, failing outside `BT`/`ET`.
pub(crate) fn advance(state: &mut TextState, (tx, ty): (f64, f64)) -> Result<(), BackendError> {
    if state.translate(tx, ty) {
        Ok(())
    } else {
        Err(BackendError::Interpreter(
            "text shown outside a text object".to_string(),
        ))
    }
}

/// Groups drawn glyphs into blocks.
#[derive(Debug, Default)]
pub struct BlockBuilder {
    options: DeviceOptions,
    blocks: Vec<Block>,
    current: Option<Block>,
}

impl BlockBuilder {
    pub fn new(options: DeviceOptions) -> Self {
        Self {
            options,
            blocks: Vec::new(),
            current: None,
        }
    }

    /// Completed blocks so far, without the open one.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Closes the open block and returns every block in rendering order.
    ///
    /// Fails with [`TitleError::NoTextDrawn`] if no glyph was ever drawn.
    pub fn finish(mut self) -> Result<Vec<Block>, BackendError> {
        let Some(current) = self.current.take() else {
            return Err(TitleError::NoTextDrawn.into());
        };
        if !current.is_empty() {
            self.blocks.push(current);
        }
        Ok(self.blocks)
    }

    fn assign(&mut self, font: &FontHandle, size: f64, x: f64, y: f64, glyph: String) {
        match &mut self.current {
            Some(block) if block.accepts(font.id, size) => block.push(glyph),
            slot => {
                let opened = Block::new(font.id, font.font.name(), size, x, y, glyph);
                if let Some(closed) = slot.replace(opened) {
                    debug!(size = closed.size, text = %closed.text(), "block closed");
                    self.blocks.push(closed);
                }
            }
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
        let glyph = match font.font.to_unicode(cid) {
            Some(text) => text,
            None => match &self.options.missing_char {
                Some(replacement) => replacement.clone(),
                None => {
                    return Err(TitleError::UndefinedUnicode {
                        font: font.font.name().to_string(),
                        cid,
                    }
                    .into());
                }
            },
        };
        let (gx, gy) = trm.transform_point(0.0, 0.0);
        trace!(%glyph, x = gx, y = gy, size = trm.a, "glyph");
        self.assign(font, trm.a, gx, gy, glyph);

        let width = font.font.char_width(cid);
        let displacement =
            state.glyph_displacement(width, cid == SPACE_CID, font.font.is_vertical());
        advance(state, displacement)
    }

    fn adjust(
        &mut self,
        state: &mut TextState,
        font: &FontHandle,
        adjustment: f64,
    ) -> Result<(), BackendError> {
        let vertical = font.font.is_vertical();
        let displacement = state.adjustment_displacement(adjustment, vertical);
        if self.options.translation_heuristic {
            self.maybe_insert_space(state, font, displacement, vertical);
        }
        advance(state, displacement)
    }

    /// Appends `" "` to the open block when the adjustment is wide enough
    /// to separate words. The space does not advance the text position.
    fn maybe_insert_space(
        &mut self,
        state: &TextState,
        font: &FontHandle,
        (tx, ty): (f64, f64),
        vertical: bool,
    ) {
        let Some(block) = self.current.as_mut() else {
            return;
        };
        let space_width = font.font.char_width(SPACE_CID);
        let (sx, sy) = state.glyph_displacement(space_width, true, vertical);
        let (moved, space) = if vertical { (ty, sy) } else { (tx, sx) };
        if space > 0.0 && moved >= SPACE_ADJUSTMENT_RATIO * space {
            trace!(moved, space, "adjustment taken as a space");
            block.push(" ");
        }
    }
}

impl TextDevice for BlockBuilder {
    fn show_array(
        &mut self,
        state: &mut TextState,
        elements: &[TjElement],
    ) -> Result<(), BackendError> {
        let font = active_font(state)?;
        for element in elements {
            match element {
                TjElement::Adjustment(adj) => self.adjust(state, &font, *adj)?,
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

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pdftitle_core::{Ctm, FontId};

    use super::*;
    use crate::font::testing::MockFont;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn handle(id: u32, font: MockFont) -> FontHandle {
        FontHandle::new(FontId(id), Rc::new(font))
    }

    fn state_with(font: FontHandle, size: f64) -> TextState {
        let mut ts = TextState::new();
        ts.begin_text();
        ts.set_font(font, size);
        ts
    }

    fn show(builder: &mut BlockBuilder, ts: &mut TextState, text: &str) {
        builder
            .show_array(ts, &[TjElement::String(text.as_bytes().to_vec())])
            .unwrap();
    }

    #[test]
    fn same_font_and_size_merge_into_one_block() {
        let font = handle(0, MockFont::new("F", 0.5));
        let mut ts = state_with(font, 12.0);
        ts.move_text_position(72.0, 700.0);
        let mut builder = BlockBuilder::default();
        show(&mut builder, &mut ts, "Ab");
        show(&mut builder, &mut ts, "c");

        let blocks = builder.finish().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text(), "Abc");
        assert_approx(blocks[0].size, 12.0);
        assert_approx(blocks[0].x, 72.0);
        assert_approx(blocks[0].y, 700.0);
    }

    #[test]
    fn size_change_closes_block() {
        let font = handle(0, MockFont::new("F", 0.5));
        let mut ts = state_with(font.clone(), 24.0);
        let mut builder = BlockBuilder::default();
        show(&mut builder, &mut ts, "Title");
        ts.set_font(font, 10.0);
        ts.move_text_position(0.0, -30.0);
        show(&mut builder, &mut ts, "body");

        let blocks = builder.finish().unwrap();
        let texts: Vec<_> = blocks.iter().map(|b| (b.size, b.text())).collect();
        assert_eq!(
            texts,
            vec![(24.0, "Title".to_string()), (10.0, "body".to_string())]
        );
        assert_approx(blocks[1].y, -30.0);
    }

    #[test]
    fn font_change_closes_block_even_at_same_size() {
        let mut ts = state_with(handle(0, MockFont::new("A", 0.5)), 10.0);
        let mut builder = BlockBuilder::default();
        show(&mut builder, &mut ts, "x");
        ts.set_font(handle(1, MockFont::new("B", 0.5)), 10.0);
        show(&mut builder, &mut ts, "y");
        let blocks = builder.finish().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].font_name, "A");
        assert_eq!(blocks[1].font, FontId(1));
    }

    #[test]
    fn effective_size_comes_from_text_matrix() {
        let mut ts = state_with(handle(0, MockFont::new("F", 0.5)), 1.0);
        ts.set_text_matrix(Ctm::new(18.0, 0.0, 0.0, 18.0, 50.0, 600.0));
        let mut builder = BlockBuilder::default();
        show(&mut builder, &mut ts, "T");
        let blocks = builder.finish().unwrap();
        assert_approx(blocks[0].size, 18.0);
        assert_approx(blocks[0].x, 50.0);
        assert_approx(blocks[0].y, 600.0);
    }

    #[test]
    fn glyphs_advance_the_text_matrix() {
        let mut ts = state_with(handle(0, MockFont::new("F", 0.5)), 10.0);
        ts.char_spacing = 1.0;
        ts.word_spacing = 4.0;
        let mut builder = BlockBuilder::default();
        show(&mut builder, &mut ts, "a b");
        // a: 5+1, space: 5+1+4, b: 5+1
        assert_approx(ts.text_matrix().unwrap().e, 22.0);
    }

    #[test]
    fn adjustment_translates_without_drawing() {
        let mut ts = state_with(handle(0, MockFont::new("F", 0.5)), 10.0);
        let mut builder = BlockBuilder::default();
        builder
            .show_array(
                &mut ts,
                &[
                    TjElement::String(b"A".to_vec()),
                    TjElement::Adjustment(-1000.0),
                    TjElement::String(b"B".to_vec()),
                ],
            )
            .unwrap();
        assert_approx(ts.text_matrix().unwrap().e, 20.0);
        let blocks = builder.finish().unwrap();
        assert_eq!(blocks[0].text(), "AB");
    }

    #[test]
    fn vertical_font_advances_along_y() {
        let mut font = MockFont::new("V", 1.0);
        font.vertical = true;
        let mut ts = state_with(handle(0, font), 10.0);
        let mut builder = BlockBuilder::default();
        show(&mut builder, &mut ts, "ab");
        let tm = ts.text_matrix().unwrap();
        assert_approx(tm.e, 0.0);
        assert_approx(tm.f, 20.0);
    }

    #[test]
    fn translation_heuristic_inserts_space() {
        let mut font = MockFont::new("F", 0.5);
        font.widths.insert(SPACE_CID, 0.25);
        let mut ts = state_with(handle(0, font), 10.0);
        let mut builder = BlockBuilder::new(DeviceOptions {
            translation_heuristic: true,
            ..DeviceOptions::default()
        });
        builder
            .show_array(
                &mut ts,
                &[
                    TjElement::String(b"Deep".to_vec()),
                    TjElement::Adjustment(-300.0),
                    TjElement::String(b"Learning".to_vec()),
                    TjElement::Adjustment(-50.0),
                    TjElement::String(b"!".to_vec()),
                ],
            )
            .unwrap();
        let blocks = builder.finish().unwrap();
        assert_eq!(blocks[0].text(), "Deep Learning!");
    }

    #[test]
    fn heuristic_off_keeps_words_joined() {
        let mut ts = state_with(handle(0, MockFont::new("F", 0.25)), 10.0);
        let mut builder = BlockBuilder::default();
        builder
            .show_array(
                &mut ts,
                &[
                    TjElement::String(b"Deep".to_vec()),
                    TjElement::Adjustment(-300.0),
                    TjElement::String(b"Learning".to_vec()),
                ],
            )
            .unwrap();
        assert_eq!(builder.finish().unwrap()[0].text(), "DeepLearning");
    }

    #[test]
    fn heuristic_space_goes_to_open_block_after_font_change() {
        let mut ts = state_with(handle(0, MockFont::new("Title", 0.5)), 20.0);
        let mut builder = BlockBuilder::new(DeviceOptions {
            translation_heuristic: true,
            ..DeviceOptions::default()
        });
        show(&mut builder, &mut ts, "Deep");

        let mut body = MockFont::new("Body", 0.5);
        body.widths.insert(SPACE_CID, 0.25);
        ts.set_font(handle(1, body), 10.0);
        builder
            .show_array(
                &mut ts,
                &[
                    TjElement::Adjustment(-300.0),
                    TjElement::String(b"Learning".to_vec()),
                ],
            )
            .unwrap();

        let blocks = builder.finish().unwrap();
        assert_eq!(blocks[0].text(), "Deep ");
        assert_eq!(blocks[1].text(), "Learning");
    }

    #[test]
    fn heuristic_needs_an_open_block() {
        let mut font = MockFont::new("F", 0.5);
        font.widths.insert(SPACE_CID, 0.25);
        let mut ts = state_with(handle(0, font), 10.0);
        let mut builder = BlockBuilder::new(DeviceOptions {
            translation_heuristic: true,
            ..DeviceOptions::default()
        });
        builder
            .show_array(
                &mut ts,
                &[
                    TjElement::Adjustment(-500.0),
                    TjElement::String(b"x".to_vec()),
                ],
            )
            .unwrap();
        assert_eq!(builder.finish().unwrap()[0].text(), "x");
    }

    #[test]
    fn missing_unicode_is_fatal_without_replacement() {
        let mut font = MockFont::new("Symbolic", 0.5);
        font.unmapped.push(u32::from(b'?'));
        let mut ts = state_with(handle(0, font), 10.0);
        let mut builder = BlockBuilder::default();
        let err = builder
            .show_array(&mut ts, &[TjElement::String(b"a?".to_vec())])
            .unwrap_err();
        assert!(matches!(
            err,
            BackendError::Core(TitleError::UndefinedUnicode { cid: 63, .. })
        ));
    }

    #[test]
    fn missing_unicode_uses_replacement() {
        let mut font = MockFont::new("Symbolic", 0.5);
        font.unmapped.push(u32::from(b'?'));
        let mut ts = state_with(handle(0, font), 10.0);
        let mut builder = BlockBuilder::new(DeviceOptions {
            missing_char: Some("_".to_string()),
            ..DeviceOptions::default()
        });
        show(&mut builder, &mut ts, "a?b");
        assert_eq!(builder.finish().unwrap()[0].text(), "a_b");
    }

    #[test]
    fn show_without_font_is_undefined_font() {
        let mut ts = TextState::new();
        ts.begin_text();
        let mut builder = BlockBuilder::default();
        let err = builder
            .show_array(&mut ts, &[TjElement::String(b"x".to_vec())])
            .unwrap_err();
        assert!(matches!(err, BackendError::Core(TitleError::UndefinedFont(_))));
    }

    #[test]
    fn show_outside_text_object_is_interpreter_error() {
        let mut ts = TextState::new();
        ts.set_font(handle(0, MockFont::new("F", 0.5)), 10.0);
        let mut builder = BlockBuilder::default();
        let err = builder
            .show_array(&mut ts, &[TjElement::String(b"x".to_vec())])
            .unwrap_err();
        assert!(matches!(err, BackendError::Interpreter(_)));
    }

    #[test]
    fn finish_without_text_is_no_text_drawn() {
        let err = BlockBuilder::default().finish().unwrap_err();
        assert!(matches!(err, BackendError::Core(TitleError::NoTextDrawn)));
    }

    #[test]
    fn completed_and_open_blocks_cover_every_glyph() {
        let font = handle(0, MockFont::new("F", 0.5));
        let mut ts = state_with(font.clone(), 10.0);
        let mut builder = BlockBuilder::default();
        for (size, text) in [(10.0, "ab"), (12.0, "cd"), (10.0, "e"), (10.0, "f")] {
            ts.set_font(font.clone(), size);
            show(&mut builder, &mut ts, text);
        }
        assert_eq!(builder.blocks().len(), 2);
        let all: String = builder.finish().unwrap().iter().map(|b| b.text()).collect();
        assert_eq!(all, "abcdef");
    }

    #[test]
    fn identical_input_gives_identical_blocks() {
        let run = || {
            let mut ts = state_with(handle(0, MockFont::new("F", 0.5)), 10.0);
            let mut builder = BlockBuilder::default();
            show(&mut builder, &mut ts, "same");
            builder.finish().unwrap()
        };
        assert_eq!(run(), run());
    }
}
