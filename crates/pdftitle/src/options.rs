//! Options controlling title extraction.

use pdftitle_core::Algorithm;
use pdftitle_parse::DeviceOptions;

/// Options for [`Pdf::extract_title`](crate::Pdf::extract_title) and
/// [`Pdf::blocks`](crate::Pdf::blocks).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TitleOptions {
    /// 1-based page to read the title from.
    pub page_number: usize,
    /// Substitute for glyphs without a unicode mapping. `None` makes such a
    /// glyph an error.
    pub missing_char: Option<String>,
    pub algorithm: Algorithm,
    /// Font size ranks collected by [`Algorithm::Eliot`], 0 being the
    /// largest size on the page.
    pub eliot_ranks: Vec<usize>,
    /// Turn large `TJ` adjustments into spaces inside the current block.
    pub translation_heuristic: bool,
}

impl Default for TitleOptions {
    fn default() -> Self {
        Self {
            page_number: 1,
            missing_char: None,
            algorithm: Algorithm::default(),
            eliot_ranks: vec![0],
            translation_heuristic: false,
        }
    }
}

impl TitleOptions {
    pub fn with_page_number(mut self, page_number: usize) -> Self {
        self.page_number = page_number;
        self
    }

    pub fn with_missing_char(mut self, missing_char: impl Into<String>) -> Self {
        self.missing_char = Some(missing_char.into());
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_eliot_ranks(mut self, ranks: Vec<usize>) -> Self {
        self.eliot_ranks = ranks;
        self
    }

    pub fn with_translation_heuristic(mut self, enabled: bool) -> Self {
        self.translation_heuristic = enabled;
        self
    }

    /// The subset of options the text devices read.
    pub fn device_options(&self) -> DeviceOptions {
        DeviceOptions {
            missing_char: self.missing_char.clone(),
            translation_heuristic: self.translation_heuristic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_read_first_page_with_original() {
        let opts = TitleOptions::default();
        assert_eq!(opts.page_number, 1);
        assert_eq!(opts.algorithm, Algorithm::Original);
        assert_eq!(opts.eliot_ranks, vec![0]);
        assert!(opts.missing_char.is_none());
        assert!(!opts.translation_heuristic);
    }

    #[test]
    fn builders_set_fields() {
        let opts = TitleOptions::default()
            .with_page_number(3)
            .with_missing_char("?")
            .with_algorithm(Algorithm::Eliot)
            .with_eliot_ranks(vec![0, 1])
            .with_translation_heuristic(true);
        assert_eq!(opts.page_number, 3);
        assert_eq!(opts.algorithm, Algorithm::Eliot);
        assert_eq!(opts.eliot_ranks, vec![0, 1]);

        let device = opts.device_options();
        assert_eq!(device.missing_char.as_deref(), Some("?"));
        assert!(device.translation_heuristic);
    }
}
