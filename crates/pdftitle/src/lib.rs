//! pdftitle: Extract the title of a PDF document from its page layout.
//!
//! This is the public API facade crate for pdftitle-rs. It re-exports types
//! from pdftitle-core and uses pdftitle-parse for PDF reading and
//! interpretation.
//!
//! # Architecture
//!
//! - **pdftitle-core**: Backend-independent block model and selection algorithms
//! - **pdftitle-parse**: PDF loading, content stream interpreter and text devices
//! - **pdftitle** (this crate): Public API that ties everything together

mod options;
mod pdf;

pub use options::TitleOptions;
pub use pdf::{Pdf, extract_title, extract_title_from_file};
pub use pdftitle_core::{
    Algorithm, Block, FontId, TitleError, convert_ligatures, new_file_name, title_case,
};

pub use pdftitle_core;
pub use pdftitle_parse;
