//! pdftitle-parse: PDF loading and content stream interpretation.
//!
//! Loads documents with lopdf, decodes fonts, and replays page content
//! streams through the text-state [`Interpreter`] into a [`TextDevice`]:
//! either the [`BlockBuilder`] that groups glyphs into blocks for title
//! selection, or the [`PlainTextDevice`] that renders the page as text.
//! It depends on pdftitle-core for the block model and error type.

pub mod cmap;
pub mod device;
pub mod encoding;
pub mod error;
pub mod font;
pub mod font_metrics;
pub mod interpreter;
pub mod lopdf_backend;
pub mod metadata;
pub mod operator;
pub mod pdf_font;
pub mod plain_text;
pub mod text_state;
pub mod tokenizer;

pub use device::{BlockBuilder, DeviceOptions, TextDevice, TjElement};
pub use error::BackendError;
pub use font::{Font, FontHandle, FontMap, FontResolver};
pub use interpreter::Interpreter;
pub use lopdf_backend::{LopdfDocument, LopdfPage, PageFonts};
pub use pdf_font::PdfFont;
pub use pdftitle_core;
pub use plain_text::PlainTextDevice;
pub use text_state::TextState;
