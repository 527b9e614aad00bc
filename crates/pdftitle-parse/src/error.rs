//! Error types for the parsing and interpreter layers.
//!
//! [`BackendError`] is what the lopdf backend, fonts and the interpreter
//! return; it converts losslessly into the public [`TitleError`].

use pdftitle_core::TitleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error resolving font or encoding information.
    #[error("font error: {0}")]
    Font(String),

    /// Malformed content stream.
    #[error("interpreter error: {0}")]
    Interpreter(String),

    /// A title extraction failure raised while interpreting.
    #[error(transparent)]
    Core(#[from] TitleError),
}

impl From<BackendError> for TitleError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => TitleError::Parse(msg),
            BackendError::Io(e) => TitleError::Io(e.to_string()),
            BackendError::Font(msg) => TitleError::Font(msg),
            BackendError::Interpreter(msg) => TitleError::Interpreter(msg),
            BackendError::Core(e) => e,
        }
    }
}
