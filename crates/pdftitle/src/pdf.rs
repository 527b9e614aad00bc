//! Top-level PDF document type for title extraction.

use std::path::Path;

use pdftitle_core::{Block, TitleError, repair_title};
use pdftitle_parse::tokenizer::tokenize;
use pdftitle_parse::{
    BlockBuilder, Interpreter, LopdfDocument, PageFonts, PlainTextDevice, metadata,
};
use tracing::{debug, info};

use crate::TitleOptions;

/// A PDF document opened for title extraction.
///
/// # Example
///
/// ```ignore
/// let pdf = Pdf::open_file("paper.pdf")?;
/// let title = pdf.extract_title(&TitleOptions::default())?;
/// ```
#[derive(Debug)]
pub struct Pdf {
    doc: LopdfDocument,
}

impl Pdf {
    /// Opens a PDF from bytes.
    ///
    /// Fails with [`TitleError::ExtractionNotAllowed`] when the document's
    /// permissions forbid text extraction.
    pub fn open(bytes: &[u8]) -> Result<Self, TitleError> {
        let doc = LopdfDocument::open(bytes)?;
        Ok(Self { doc })
    }

    /// Opens a PDF file from disk.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, TitleError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening PDF");
        let bytes = std::fs::read(path)?;
        Self::open(&bytes)
    }

    pub fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    /// The text blocks of the configured page, in rendering order.
    pub fn blocks(&self, options: &TitleOptions) -> Result<Vec<Block>, TitleError> {
        let page = self.doc.page(options.page_number)?;
        let content = self.doc.page_content(page)?;
        let mut fonts = self.doc.page_fonts(page)?;
        block_pass(&content, &mut fonts, options)
    }

    /// Extracts the title of the configured page.
    ///
    /// The page is interpreted twice: once into blocks for the selection
    /// algorithm and once into plain text, which is used to put back spaces
    /// missing from the selected blocks.
    pub fn extract_title(&self, options: &TitleOptions) -> Result<String, TitleError> {
        let page = self.doc.page(options.page_number)?;
        let content = self.doc.page_content(page)?;
        let mut fonts = self.doc.page_fonts(page)?;

        let blocks = block_pass(&content, &mut fonts, options)?;
        let corpus = plain_text_pass(&content, &mut fonts, options)?;

        let raw = options.algorithm.select(&blocks, &options.eliot_ranks)?;
        info!(algorithm = %options.algorithm, title = %raw, "selected title blocks");
        let title = repair_title(&corpus, &raw);
        info!(%title, "title after space recovery");
        Ok(title)
    }

    /// The title recorded in the document metadata, if any.
    ///
    /// The Info dictionary `/Title` wins over the XMP `dc:title`.
    pub fn metadata_title(&self) -> Result<Option<String>, TitleError> {
        Ok(metadata::metadata_title(self.doc.inner())?)
    }

    /// Names of the XObjects drawn by a page's content stream.
    ///
    /// Text inside XObjects is not interpreted, so a non-empty result hints
    /// at why a page yields no title.
    pub fn xobject_names(&self, page_number: usize) -> Result<Vec<String>, TitleError> {
        let page = self.doc.page(page_number)?;
        let content = self.doc.page_content(page)?;
        let names = tokenize(&content)?
            .into_iter()
            .filter(|op| op.name == "Do")
            .filter_map(|op| {
                op.operands
                    .last()
                    .and_then(|operand| operand.as_name())
                    .map(str::to_string)
            })
            .collect();
        Ok(names)
    }
}

fn block_pass(
    content: &[u8],
    fonts: &mut PageFonts<'_>,
    options: &TitleOptions,
) -> Result<Vec<Block>, TitleError> {
    let mut builder = BlockBuilder::new(options.device_options());
    let mut xobjects: Vec<String> = Vec::new();
    let run = Interpreter::new(fonts, &mut builder)
        .with_xobject_hook(|name| xobjects.push(name.to_string()))
        .run(content);
    if !xobjects.is_empty() {
        info!(?xobjects, "page draws XObjects, their text is not interpreted");
    }
    run?;

    let blocks = builder.finish()?;
    for block in &blocks {
        info!(
            size = block.size,
            x = block.x,
            y = block.y,
            font = %block.font_name,
            text = %block.text(),
            "block"
        );
    }
    Ok(blocks)
}

fn plain_text_pass(
    content: &[u8],
    fonts: &mut PageFonts<'_>,
    options: &TitleOptions,
) -> Result<String, TitleError> {
    let mut device = PlainTextDevice::new(options.device_options());
    Interpreter::new(fonts, &mut device).run(content)?;
    let text = device.into_text();
    debug!(chars = text.chars().count(), "plain text corpus");
    Ok(text)
}

/// Extracts the title of a PDF held in memory.
pub fn extract_title(bytes: &[u8], options: &TitleOptions) -> Result<String, TitleError> {
    Pdf::open(bytes)?.extract_title(options)
}

/// Extracts the title of a PDF file.
pub fn extract_title_from_file(
    path: impl AsRef<Path>,
    options: &TitleOptions,
) -> Result<String, TitleError> {
    Pdf::open_file(path)?.extract_title(options)
}
