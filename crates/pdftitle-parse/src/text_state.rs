//! Text state for the content stream interpreter.
//!
//! Holds the nine PDF text state parameters plus the text matrix (Tm) and
//! text line matrix (Tlm). Both matrices exist only inside a text object:
//! `BT` sets them to identity and `ET` clears them.

use pdftitle_core::Ctm;

use crate::font::FontHandle;

/// Text rendering mode values (Tr operator). Stored, never acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextRenderMode {
    #[default]
    Fill = 0,
    Stroke = 1,
    FillStroke = 2,
    Invisible = 3,
    FillClip = 4,
    StrokeClip = 5,
    FillStrokeClip = 6,
    Clip = 7,
}

impl TextRenderMode {
    /// Returns `None` outside 0..=7.
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Fill),
            1 => Some(Self::Stroke),
            2 => Some(Self::FillStroke),
            3 => Some(Self::Invisible),
            4 => Some(Self::FillClip),
            5 => Some(Self::StrokeClip),
            6 => Some(Self::FillStrokeClip),
            7 => Some(Self::Clip),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextState {
    /// Tc, unscaled text space units added after every glyph.
    pub char_spacing: f64,
    /// Tw, added after glyphs whose code is 32.
    pub word_spacing: f64,
    /// Th as a fraction (`Tz 50` stores 0.5).
    pub h_scaling: f64,
    /// Tl.
    pub leading: f64,
    /// Tf font, `None` until the first `Tf`.
    pub font: Option<FontHandle>,
    /// Tfs.
    pub font_size: f64,
    pub render_mode: TextRenderMode,
    /// Ts.
    pub rise: f64,
    text_matrix: Option<Ctm>,
    line_matrix: Option<Ctm>,
}

impl Default for TextState {
    fn default() -> Self {
        Self::new()
    }
}

impl TextState {
    pub fn new() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scaling: 1.0,
            leading: 0.0,
            font: None,
            font_size: 0.0,
            render_mode: TextRenderMode::Fill,
            rise: 0.0,
            text_matrix: None,
            line_matrix: None,
        }
    }

    pub fn in_text_object(&self) -> bool {
        self.text_matrix.is_some()
    }

    pub fn text_matrix(&self) -> Option<&Ctm> {
        self.text_matrix.as_ref()
    }

    pub fn line_matrix(&self) -> Option<&Ctm> {
        self.line_matrix.as_ref()
    }

    /// `BT`.
    pub fn begin_text(&mut self) {
        self.text_matrix = Some(Ctm::identity());
        self.line_matrix = Some(Ctm::identity());
    }

    /// `ET`.
    pub fn end_text(&mut self) {
        self.text_matrix = None;
        self.line_matrix = None;
    }

    /// `Tf`.
    pub fn set_font(&mut self, font: FontHandle, size: f64) {
        self.font = Some(font);
        self.font_size = size;
    }

    /// `Tz`, given as a percentage.
    pub fn set_h_scaling(&mut self, percent: f64) {
        self.h_scaling = percent / 100.0;
    }

    /// `Tr`. Out-of-range modes leave the current mode in place.
    pub fn set_render_mode(&mut self, mode: i64) {
        if let Some(mode) = TextRenderMode::from_i64(mode) {
            self.render_mode = mode;
        }
    }

    /// `Tm`: replaces both matrices.
    pub fn set_text_matrix(&mut self, matrix: Ctm) {
        self.text_matrix = Some(matrix);
        self.line_matrix = Some(matrix);
    }

    /// `Td`: translates the line matrix and resets the text matrix to it.
    ///
    /// Returns `false` (and changes nothing) outside a text object.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) -> bool {
        let Some(line) = self.line_matrix else {
            return false;
        };
        let moved = line.translate(tx, ty);
        self.line_matrix = Some(moved);
        self.text_matrix = Some(moved);
        true
    }

    /// `TD`: `-ty TL` followed by `tx ty Td`.
    pub fn move_text_position_and_set_leading(&mut self, tx: f64, ty: f64) -> bool {
        self.leading = -ty;
        self.move_text_position(tx, ty)
    }

    /// `T*`: `0 -Tl Td`.
    pub fn move_to_next_line(&mut self) -> bool {
        self.move_text_position(0.0, -self.leading)
    }

    /// Moves the text matrix (not the line matrix) by a text space offset.
    pub fn translate(&mut self, tx: f64, ty: f64) -> bool {
        match self.text_matrix {
            Some(tm) => {
                self.text_matrix = Some(tm.translate(tx, ty));
                true
            }
            None => false,
        }
    }

    /// `Trm = [[Tfs*Th, 0], [0, Tfs], [0, Trise]] × Tm`.
    pub fn rendering_matrix(&self) -> Option<Ctm> {
        let params = Ctm::new(
            self.font_size * self.h_scaling,
            0.0,
            0.0,
            self.font_size,
            0.0,
            self.rise,
        );
        self.text_matrix.map(|tm| params.concat(&tm))
    }

    /// Text space offset produced by a `TJ` number.
    pub fn adjustment_displacement(&self, adjustment: f64, vertical: bool) -> (f64, f64) {
        let advance = (0.0 - adjustment / 1000.0) * self.font_size
            + self.char_spacing
            + self.word_spacing;
        if vertical {
            (0.0, advance)
        } else {
            (advance * self.h_scaling, 0.0)
        }
    }

    /// Text space offset after drawing a glyph of `width` (text space units).
    /// Word spacing applies only to `is_space` glyphs.
    pub fn glyph_displacement(&self, width: f64, is_space: bool, vertical: bool) -> (f64, f64) {
        let word_spacing = if is_space { self.word_spacing } else { 0.0 };
        let advance = width * self.font_size + self.char_spacing + word_spacing;
        if vertical {
            (0.0, advance)
        } else {
            (advance * self.h_scaling, 0.0)
        }
    }
}
