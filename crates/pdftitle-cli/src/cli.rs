use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use pdftitle::Algorithm;

/// Extracts the title from a PDF file.
#[derive(Debug, Parser)]
#[command(name = "pdftitle", about, version)]
pub struct Cli {
    /// Path to the PDF file
    #[arg(short, long, value_name = "FILE")]
    pub pdf: PathBuf,

    /// Algorithm to derive the title. `original` takes the text with the
    /// largest font size
    #[arg(short, long, value_enum, default_value_t = AlgoArg::Original)]
    pub algo: AlgoArg,

    /// Replace glyphs without a unicode mapping with this text
    #[arg(long, value_name = "TEXT")]
    pub replace_missing_char: Option<String>,

    /// Do not convert ligatures like ﬁ to individual chars
    #[arg(long)]
    pub do_not_convert_ligatures: bool,

    /// Rename the PDF file after its title
    #[arg(short, long)]
    pub change_name: bool,

    /// Convert the final title to title case
    #[arg(short, long)]
    pub title_case: bool,

    /// Enable verbose logging, use -vv for debug logging
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Font size ranks for the eliot algorithm, comma separated (e.g.
    /// 0,1,2). 0 is the largest size
    #[arg(long, value_name = "RANKS", value_delimiter = ',', default_value = "0")]
    pub eliot_tfs: Vec<usize>,

    /// Page to extract the title from, starting at 1
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub page_number: usize,

    /// Use the title stored in the document metadata when there is one
    #[arg(long)]
    pub use_metadata: bool,

    /// Treat TJ adjustments about as wide as a space as a space
    #[arg(long)]
    pub translation_heuristic: bool,

    /// Print the text blocks of the page instead of a title
    #[arg(long)]
    pub list_blocks: bool,
}

/// Title selection algorithm choices.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlgoArg {
    Original,
    Max2,
    Eliot,
}

impl From<AlgoArg> for Algorithm {
    fn from(arg: AlgoArg) -> Self {
        match arg {
            AlgoArg::Original => Algorithm::Original,
            AlgoArg::Max2 => Algorithm::Max2,
            AlgoArg::Eliot => Algorithm::Eliot,
        }
    }
}

impl Cli {
    /// Log filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["pdftitle", "-p", "paper.pdf"]).unwrap();
        assert_eq!(cli.pdf, PathBuf::from("paper.pdf"));
        assert!(matches!(cli.algo, AlgoArg::Original));
        assert_eq!(cli.eliot_tfs, vec![0]);
        assert_eq!(cli.page_number, 1);
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn eliot_ranks_are_comma_separated() {
        let cli = Cli::try_parse_from([
            "pdftitle", "-p", "a.pdf", "-a", "eliot", "--eliot-tfs", "0,2,1", "-vv",
        ])
        .unwrap();
        assert_eq!(Algorithm::from(cli.algo), Algorithm::Eliot);
        assert_eq!(cli.eliot_tfs, vec![0, 2, 1]);
        assert_eq!(cli.log_level(), "debug");
    }

    #[test]
    fn pdf_is_required() {
        assert!(Cli::try_parse_from(["pdftitle", "-t"]).is_err());
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        assert!(Cli::try_parse_from(["pdftitle", "-p", "a.pdf", "-a", "biggest"]).is_err());
    }
}
