//! pdftitle-core: Backend-independent types and algorithms.
//!
//! This crate provides the block model produced by the text device, the
//! title selection algorithms that run over it, and the string
//! post-processing (space recovery, ligatures, casing, file names) applied
//! to the selected title. It knows nothing about PDF syntax.

pub mod block;
pub mod error;
pub mod geometry;
pub mod ligature;
pub mod naming;
pub mod select;
pub mod spaces;

pub use block::{Block, FontId};
pub use error::TitleError;
pub use geometry::Ctm;
pub use ligature::convert_ligatures;
pub use naming::{new_file_name, title_case};
pub use select::{Algorithm, distinct_sizes, select_eliot, select_max2, select_original};
pub use spaces::{collapse_spaces, repair_title, retrieve_spaces};
