//! Title from document metadata rather than page layout.
//!
//! Two sources are consulted in order: the `/Title` entry of the document
//! information dictionary and the `dc:title` property of the catalog's XMP
//! `/Metadata` stream. Blank values count as absent.

use lopdf::{Document, Object};
use pdftitle_core::TitleError;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, info};

use crate::error::BackendError;
use crate::lopdf_backend::{resolve_object, stream_content};

/// The first non-blank metadata title, Info dictionary first.
pub fn metadata_title(doc: &Document) -> Result<Option<String>, BackendError> {
    if let Some(title) = info_title(doc) {
        info!(%title, "title found in document information dictionary");
        return Ok(Some(title));
    }
    let title = xmp_title(doc)?;
    if let Some(title) = &title {
        info!(%title, "title found in XMP metadata");
    }
    Ok(title)
}

/// `/Info /Title`, decoded as a PDF text string.
pub fn info_title(doc: &Document) -> Option<String> {
    let info = resolve_object(doc, doc.trailer.get(b"Info").ok()?)
        .as_dict()
        .ok()?;
    match resolve_object(doc, info.get(b"Title").ok()?) {
        Object::String(bytes, _) => non_blank(decode_text_string(bytes)),
        _ => None,
    }
}

/// `dc:title` of the catalog's `/Metadata` stream.
pub fn xmp_title(doc: &Document) -> Result<Option<String>, BackendError> {
    let Some(stream) = doc
        .catalog()
        .ok()
        .and_then(|catalog| catalog.get(b"Metadata").ok())
        .and_then(|obj| resolve_object(doc, obj).as_stream().ok())
    else {
        return Ok(None);
    };
    let data = stream_content(stream)?;
    parse_xmp_title(String::from_utf8_lossy(&data).trim())
}

/// UTF-16BE with a byte order mark, UTF-8, or else Windows-1252 (a superset
/// of the printable PDFDocEncoding range).
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let (text, _) = encoding_rs::UTF_16BE.decode_without_bom_handling(utf16);
        return text.into_owned();
    }
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}

fn non_blank(text: String) -> Option<String> {
    if text.trim().is_empty() { None } else { Some(text) }
}

fn lang_of(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"xml:lang")
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// State of the single `dc:title` element being read.
#[derive(Default)]
struct TitleElement {
    /// Stack depth of the `dc:title` start tag.
    depth: usize,
    text: String,
    has_alternatives: bool,
    default: Option<String>,
    /// Language and text of the `rdf:li` currently open.
    item: Option<(Option<String>, String)>,
}

impl TitleElement {
    fn value(self) -> Option<String> {
        if self.has_alternatives {
            self.default
        } else {
            Some(self.text)
        }
    }
}

/// Extracts `dc:title` from an XMP packet.
///
/// With `rdf:Alt` alternatives the `x-default` item is taken; otherwise the
/// element's own text. More than one `dc:title` is an error.
pub fn parse_xmp_title(xml: &str) -> Result<Option<String>, BackendError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut titles = 0usize;
    let mut current: Option<TitleElement> = None;
    let mut found: Option<TitleElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "dc:title" {
                    titles += 1;
                    current = Some(TitleElement {
                        depth: stack.len(),
                        ..TitleElement::default()
                    });
                } else if name == "rdf:li" && stack.last().map(String::as_str) == Some("rdf:Alt") {
                    if let Some(title) = current.as_mut() {
                        if stack.len() == title.depth + 2 {
                            title.has_alternatives = true;
                            title.item = Some((lang_of(&e), String::new()));
                        }
                    }
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                if name.as_ref() == b"dc:title" {
                    titles += 1;
                    found = Some(TitleElement::default());
                } else if name.as_ref() == b"rdf:li"
                    && stack.last().map(String::as_str) == Some("rdf:Alt")
                {
                    if let Some(title) = current.as_mut() {
                        title.has_alternatives = true;
                    }
                }
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| BackendError::Parse(format!("invalid XMP text: {e}")))?;
                if let Some(title) = current.as_mut() {
                    if let Some((_, item)) = title.item.as_mut() {
                        item.push_str(&text);
                    } else if stack.len() == title.depth + 1 {
                        title.text.push_str(&text);
                    }
                }
            }
            Ok(Event::End(_)) => {
                let name = stack.pop().unwrap_or_default();
                if let Some(title) = current.as_mut() {
                    if name == "rdf:li" {
                        if let Some((lang, text)) = title.item.take() {
                            if lang.as_deref() == Some("x-default") && title.default.is_none() {
                                title.default = Some(text);
                            }
                        }
                    } else if name == "dc:title" && stack.len() == title.depth {
                        found = current.take();
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(BackendError::Parse(format!("malformed XMP metadata: {e}")));
            }
            _ => {}
        }
    }

    debug!(count = titles, "dc:title elements");
    if titles > 1 {
        return Err(TitleError::DuplicateXmpTitle.into());
    }
    Ok(found.and_then(TitleElement::value).and_then(non_blank))
}
