//! Classification of content stream operators.
//!
//! The interpreter only acts on text operators and `Do`; every other
//! operator (paths, painting, clipping, colour, shading, marked content,
//! inline images, graphics state) falls into [`OperatorKind::Other`].

/// The operators the title interpreter dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    // text objects
    /// `BT`
    BeginText,
    /// `ET`
    EndText,

    // text state
    /// `Tc`
    CharSpacing,
    /// `Tw`
    WordSpacing,
    /// `Tz`
    HorizontalScaling,
    /// `TL`
    Leading,
    /// `Tf`
    Font,
    /// `Tr`
    RenderMode,
    /// `Ts`
    Rise,

    // text positioning
    /// `Td`
    MoveText,
    /// `TD`
    MoveTextSetLeading,
    /// `Tm`
    TextMatrix,
    /// `T*`
    NextLine,

    // text showing
    /// `Tj`
    ShowText,
    /// `'`
    NextLineShowText,
    /// `"`
    SpacingNextLineShowText,
    /// `TJ`
    ShowTextArray,

    /// `Do`
    XObject,

    /// Anything else; ignored.
    Other,
}

impl OperatorKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "BT" => Self::BeginText,
            "ET" => Self::EndText,
            "Tc" => Self::CharSpacing,
            "Tw" => Self::WordSpacing,
            "Tz" => Self::HorizontalScaling,
            "TL" => Self::Leading,
            "Tf" => Self::Font,
            "Tr" => Self::RenderMode,
            "Ts" => Self::Rise,
            "Td" => Self::MoveText,
            "TD" => Self::MoveTextSetLeading,
            "Tm" => Self::TextMatrix,
            "T*" => Self::NextLine,
            "Tj" => Self::ShowText,
            "'" => Self::NextLineShowText,
            "\"" => Self::SpacingNextLineShowText,
            "TJ" => Self::ShowTextArray,
            "Do" => Self::XObject,
            _ => Self::Other,
        }
    }

    /// Number of operands the operator requires.
    pub fn arity(&self) -> usize {
        match self {
            Self::BeginText | Self::EndText | Self::NextLine | Self::Other => 0,
            Self::CharSpacing
            | Self::WordSpacing
            | Self::HorizontalScaling
            | Self::Leading
            | Self::RenderMode
            | Self::Rise
            | Self::ShowText
            | Self::NextLineShowText
            | Self::ShowTextArray
            | Self::XObject => 1,
            Self::Font | Self::MoveText | Self::MoveTextSetLeading => 2,
            Self::SpacingNextLineShowText => 3,
            Self::TextMatrix => 6,
        }
    }
}
