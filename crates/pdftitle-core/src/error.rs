//! Error type for title extraction.
//!
//! [`TitleError`] covers every condition that aborts extraction for a page.
//! None of them are retried internally; callers may try again with another
//! page, a replacement character, or a different algorithm.

use std::fmt;

/// Fatal errors raised while extracting a title.
#[derive(Debug, Clone, PartialEq)]
pub enum TitleError {
    /// The document's permissions forbid text extraction.
    ExtractionNotAllowed,
    /// The requested 1-based page does not exist.
    PageNotFound {
        /// The page number that was asked for.
        requested: usize,
        /// How many pages the document has.
        available: usize,
    },
    /// The document has no pages at all.
    NoPages,
    /// A `Tf` operator named a font missing from the page resources.
    UndefinedFont(String),
    /// A glyph has no unicode mapping and no replacement was configured.
    UndefinedUnicode {
        /// Base name of the font that drew the glyph.
        font: String,
        /// The character identifier that could not be mapped.
        cid: u32,
    },
    /// The page did not draw a single glyph.
    NoTextDrawn,
    /// A selection algorithm was given an empty block list.
    NoBlocks,
    /// The algorithm name is not one of `original`, `max2`, `eliot`.
    UnsupportedAlgorithm(String),
    /// An eliot rank points past the distinct font sizes of the page.
    InvalidRank {
        /// The offending zero-based rank.
        rank: usize,
        /// Number of distinct font sizes on the page.
        available: usize,
    },
    /// The XMP metadata stream holds more than one `dc:title`.
    DuplicateXmpTitle,
    /// Error parsing PDF structure or metadata.
    Parse(String),
    /// Error loading a font program or its encoding.
    Font(String),
    /// Malformed content stream.
    Interpreter(String),
    /// I/O error reading PDF data.
    Io(String),
}

impl fmt::Display for TitleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TitleError::ExtractionNotAllowed => write!(f, "PDF does not allow extraction"),
            TitleError::PageNotFound {
                requested,
                available,
            } => write!(
                f,
                "specified page does not exist: page {requested} requested, document has {available}"
            ),
            TitleError::NoPages => write!(f, "file has no pages"),
            TitleError::UndefinedFont(name) => write!(f, "undefined font id: {name}"),
            TitleError::UndefinedUnicode { font, cid } => write!(
                f,
                "PDF contains a unicode char that does not exist in the font \
                 (font {font}, cid {cid}), consider using --replace-missing-char option"
            ),
            TitleError::NoTextDrawn => write!(f, "no text was drawn on the page"),
            TitleError::NoBlocks => write!(f, "no text blocks to select a title from"),
            TitleError::UnsupportedAlgorithm(name) => write!(f, "unsupported algorithm: {name}"),
            TitleError::InvalidRank { rank, available } => write!(
                f,
                "font size rank {rank} is out of range, page has {available} distinct font sizes"
            ),
            TitleError::DuplicateXmpTitle => write!(f, "more than one title metadata"),
            TitleError::Parse(msg) => write!(f, "parse error: {msg}"),
            TitleError::Font(msg) => write!(f, "font error: {msg}"),
            TitleError::Interpreter(msg) => write!(f, "interpreter error: {msg}"),
            TitleError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for TitleError {}

impl From<std::io::Error> for TitleError {
    fn from(err: std::io::Error) -> Self {
        TitleError::Io(err.to_string())
    }
}
