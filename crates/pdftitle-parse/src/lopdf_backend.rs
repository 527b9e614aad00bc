//! lopdf-based document access.
//!
//! Loads the PDF container, enforces the extraction permission, finds pages
//! and their content and font resources. Everything above this module works
//! on decoded content bytes and [`FontResolver`]s.

use std::collections::HashMap;
use std::rc::Rc;

use lopdf::{Dictionary, Document, Object, ObjectId, Permissions};
use pdftitle_core::{FontId, TitleError};
use tracing::debug;

use crate::error::BackendError;
use crate::font::{FontHandle, FontResolver};
use crate::pdf_font::PdfFont;

/// Permission bit (bit 5 of `/P`) that allows copying or extracting text.
const EXTRACT_PERMISSION: i64 = 1 << 4;

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    inner: Document,
    /// Page object ids in page order.
    page_ids: Vec<ObjectId>,
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

/// A page of a [`LopdfDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LopdfPage {
    pub object_id: ObjectId,
    /// 1-based page number.
    pub number: usize,
}

impl LopdfDocument {
    /// Parses `bytes`, refusing documents whose permissions forbid text
    /// extraction. Encrypted documents that allow it are opened with the
    /// empty user password.
    pub fn open(bytes: &[u8]) -> Result<Self, BackendError> {
        let mut inner = Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;

        if !extraction_allowed(&inner) {
            return Err(TitleError::ExtractionNotAllowed.into());
        }
        if inner.is_encrypted() {
            inner
                .decrypt("")
                .map_err(|e| BackendError::Parse(format!("decryption failed: {e}")))?;
        }

        let page_ids: Vec<ObjectId> = inner.get_pages().values().copied().collect();
        debug!(pages = page_ids.len(), "document loaded");
        Ok(Self { inner, page_ids })
    }

    pub fn inner(&self) -> &Document {
        &self.inner
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Looks up a 1-based page number.
    pub fn page(&self, number: usize) -> Result<LopdfPage, BackendError> {
        if self.page_ids.is_empty() {
            return Err(TitleError::NoPages.into());
        }
        let object_id = number
            .checked_sub(1)
            .and_then(|i| self.page_ids.get(i))
            .copied()
            .ok_or(TitleError::PageNotFound {
                requested: number,
                available: self.page_ids.len(),
            })?;
        Ok(LopdfPage { object_id, number })
    }

    /// Decoded content of a page, with multiple streams joined by a space.
    pub fn page_content(&self, page: LopdfPage) -> Result<Vec<u8>, BackendError> {
        let dict = self
            .inner
            .get_dictionary(page.object_id)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;
        let Ok(contents) = dict.get(b"Contents") else {
            return Ok(Vec::new());
        };
        match resolve_object(&self.inner, contents) {
            Object::Stream(stream) => stream_content(stream),
            Object::Array(items) => {
                let mut content = Vec::new();
                for item in items {
                    let stream = resolve_object(&self.inner, item).as_stream().map_err(|e| {
                        BackendError::Parse(format!("/Contents array item is not a stream: {e}"))
                    })?;
                    if !content.is_empty() {
                        content.push(b' ');
                    }
                    content.extend_from_slice(&stream_content(stream)?);
                }
                Ok(content)
            }
            _ => Err(BackendError::Parse(
                "/Contents is not a stream or array".to_string(),
            )),
        }
    }

    /// The page's `/Resources` dictionary, inherited through `/Parent`.
    pub fn page_resources(&self, page: LopdfPage) -> Result<Option<&Dictionary>, BackendError> {
        let Some(resources) = resolve_inherited(&self.inner, page.object_id, b"Resources")? else {
            return Ok(None);
        };
        resolve_object(&self.inner, resources)
            .as_dict()
            .map(Some)
            .map_err(|_| BackendError::Parse("/Resources is not a dictionary".to_string()))
    }

    /// A font resolver over the page's `/Resources /Font` map.
    pub fn page_fonts(&self, page: LopdfPage) -> Result<PageFonts<'_>, BackendError> {
        let fonts = self
            .page_resources(page)?
            .and_then(|res| res.get(b"Font").ok())
            .and_then(|obj| resolve_object(&self.inner, obj).as_dict().ok());
        Ok(PageFonts::new(&self.inner, fonts))
    }
}

/// Whether the document permits text extraction. Unencrypted documents
/// always do.
///
/// lopdf decrypts while loading when the empty password fits, dropping
/// `/Encrypt` from the trailer; the permissions then live on the decoded
/// encryption state.
pub fn extraction_allowed(doc: &Document) -> bool {
    if let Some(state) = &doc.encryption_state {
        return state.permissions().contains(Permissions::COPYABLE);
    }
    let permissions = doc
        .trailer
        .get(b"Encrypt")
        .ok()
        .and_then(|obj| resolve_object(doc, obj).as_dict().ok())
        .and_then(|encrypt| encrypt.get(b"P").ok())
        .and_then(|p| p.as_i64().ok());
    permissions.is_none_or(|p| p & EXTRACT_PERMISSION != 0)
}

/// Resolves the fonts named by `Tf` operators on one page.
///
/// Fonts load lazily and are cached by resource name. A font object reached
/// through two names is loaded once and keeps one [`FontId`].
pub struct PageFonts<'d> {
    doc: &'d Document,
    fonts: Option<&'d Dictionary>,
    by_name: HashMap<String, FontHandle>,
    by_object: Vec<(ObjectId, FontHandle)>,
    next_id: u32,
}

impl<'d> PageFonts<'d> {
    pub fn new(doc: &'d Document, fonts: Option<&'d Dictionary>) -> Self {
        Self {
            doc,
            fonts,
            by_name: HashMap::new(),
            by_object: Vec::new(),
            next_id: 0,
        }
    }

    fn allocate(&mut self, font: PdfFont) -> FontHandle {
        let handle = FontHandle::new(FontId(self.next_id), Rc::new(font));
        self.next_id += 1;
        handle
    }
}

impl FontResolver for PageFonts<'_> {
    fn resolve(&mut self, name: &str) -> Result<Option<FontHandle>, BackendError> {
        if let Some(handle) = self.by_name.get(name) {
            return Ok(Some(handle.clone()));
        }
        let Some(entry) = self.fonts.and_then(|f| f.get(name.as_bytes()).ok()) else {
            return Ok(None);
        };

        let handle = match entry {
            Object::Reference(id) => {
                if let Some((_, handle)) = self.by_object.iter().find(|(oid, _)| oid == id) {
                    handle.clone()
                } else {
                    let dict = self.doc.get_dictionary(*id).map_err(|e| {
                        BackendError::Font(format!("font /{name} is not a dictionary: {e}"))
                    })?;
                    let handle = self.allocate(PdfFont::load(self.doc, dict)?);
                    self.by_object.push((*id, handle.clone()));
                    handle
                }
            }
            Object::Dictionary(dict) => self.allocate(PdfFont::load(self.doc, dict)?),
            other => {
                return Err(BackendError::Font(format!(
                    "font /{name} is not a dictionary: {other:?}"
                )));
            }
        };
        debug!(font = name, id = %handle.id, base = handle.font.name(), "font loaded");
        self.by_name.insert(name.to_string(), handle.clone());
        Ok(Some(handle))
    }
}

/// Follows an indirect reference; non-references and dangling references
/// come back unchanged.
pub(crate) fn resolve_object<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

pub(crate) fn object_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

/// Stream data with its filters applied.
pub(crate) fn stream_content(stream: &lopdf::Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// Looks up `key` on the page, then up the `/Parent` chain.
fn resolve_inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, BackendError> {
    let mut current = page_id;
    // guards against /Parent cycles
    for _ in 0..64 {
        let dict = doc
            .get_dictionary(current)
            .map_err(|e| BackendError::Parse(format!("failed to get page tree node: {e}")))?;
        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }
        match dict.get(b"Parent") {
            Ok(parent) => {
                current = parent
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

#[cfg(test)]
pub(crate) mod test_pdf {
    //! Builds small PDFs in memory.

    use lopdf::{Document, Object, ObjectId, Stream, dictionary};

    /// One page per content string, all sharing `/F1` Helvetica and `/F2`
    /// Times-Roman from the page tree root.
    pub(crate) fn with_pages(contents: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id: ObjectId = doc.new_object_id();
        let helvetica = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let times = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Times-Roman",
        });

        let mut kids: Vec<Object> = Vec::new();
        for content in contents {
            let stream = Stream::new(dictionary! {}, content.as_bytes().to_vec());
            let content_id = doc.add_object(stream);
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => dictionary! {
                    "Font" => dictionary! {
                        "F1" => helvetica,
                        "F2" => times,
                        "F3" => helvetica,
                    },
                },
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("failed to save test PDF");
        buf
    }
}

#[cfg(test)]
mod tests {
    use lopdf::{Stream, StringFormat, dictionary};

    use super::*;
    use crate::device::{BlockBuilder, DeviceOptions};
    use crate::interpreter::Interpreter;

    #[test]
    fn open_counts_pages() {
        let doc = LopdfDocument::open(&test_pdf::with_pages(&["", ""])).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert!(format!("{doc:?}").contains("page_count: 2"));
    }

    #[test]
    fn open_garbage_is_parse_error() {
        let err = LopdfDocument::open(b"not a pdf").unwrap_err();
        assert!(matches!(err, BackendError::Parse(_)));
    }

    #[test]
    fn page_lookup_is_one_based() {
        let doc = LopdfDocument::open(&test_pdf::with_pages(&["a", "b"])).unwrap();
        assert_eq!(doc.page(2).unwrap().number, 2);
        let err = doc.page(3).unwrap_err();
        assert!(matches!(
            err,
            BackendError::Core(TitleError::PageNotFound {
                requested: 3,
                available: 2
            })
        ));
        assert!(matches!(
            doc.page(0).unwrap_err(),
            BackendError::Core(TitleError::PageNotFound { requested: 0, .. })
        ));
    }

    #[test]
    fn page_content_is_returned() {
        let doc = LopdfDocument::open(&test_pdf::with_pages(&["BT ET", "0 0 m"])).unwrap();
        let page = doc.page(2).unwrap();
        assert_eq!(doc.page_content(page).unwrap(), b"0 0 m");
    }

    #[test]
    fn fonts_are_inherited_and_deduplicated() {
        let doc = LopdfDocument::open(&test_pdf::with_pages(&[""])).unwrap();
        let mut fonts = doc.page_fonts(doc.page(1).unwrap()).unwrap();
        let f2 = fonts.resolve("F2").unwrap().unwrap();
        let f1 = fonts.resolve("F1").unwrap().unwrap();
        let f3 = fonts.resolve("F3").unwrap().unwrap();
        assert_eq!(f2.id, FontId(0));
        assert_eq!(f1.id, FontId(1));
        assert_eq!(f3.id, f1.id);
        assert_eq!(f2.font.name(), "Times-Roman");
        assert!(fonts.resolve("F9").unwrap().is_none());
    }

    #[test]
    fn interprets_generated_page() {
        let pdf = test_pdf::with_pages(&[
            "BT /F1 24 Tf 72 720 Td (Title Text) Tj ET BT /F2 10 Tf 72 680 Td (Body) Tj ET",
        ]);
        let doc = LopdfDocument::open(&pdf).unwrap();
        let page = doc.page(1).unwrap();
        let content = doc.page_content(page).unwrap();
        let mut fonts = doc.page_fonts(page).unwrap();
        let mut builder = BlockBuilder::new(DeviceOptions::default());
        Interpreter::new(&mut fonts, &mut builder)
            .run(&content)
            .unwrap();
        let blocks = builder.finish().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text(), "Title Text");
        assert_eq!(blocks[0].size, 24.0);
        assert_eq!(blocks[1].font_name, "Times-Roman");
    }

    #[test]
    fn multiple_content_streams_are_joined() {
        let mut doc = Document::with_version("1.5");
        let first = doc.add_object(Stream::new(dictionary! {}, b"BT".to_vec()));
        let second = doc.add_object(Stream::new(dictionary! {}, b"ET".to_vec()));
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => vec![Object::Reference(first), Object::Reference(second)],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1_i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);
        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();

        let doc = LopdfDocument::open(&buf).unwrap();
        let page = doc.page(1).unwrap();
        assert_eq!(doc.page_content(page).unwrap(), b"BT ET");
        assert!(doc.page_resources(page).unwrap().is_none());
        assert!(doc.page_fonts(page).unwrap().resolve("F1").unwrap().is_none());
    }

    #[test]
    fn permission_bit_controls_extraction() {
        let mut doc = Document::with_version("1.5");
        assert!(extraction_allowed(&doc));

        let encrypt = doc.add_object(dictionary! { "Filter" => "Standard", "P" => -4_i64 });
        doc.trailer.set("Encrypt", Object::Reference(encrypt));
        assert!(extraction_allowed(&doc));

        let locked = doc.add_object(dictionary! { "Filter" => "Standard", "P" => -20_i64 });
        doc.trailer.set("Encrypt", Object::Reference(locked));
        assert!(!extraction_allowed(&doc));
    }

    // RC4 40-bit (V=1, R=2) with the empty user password.
    const PAD_BYTES: [u8; 32] = [
        0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01,
        0x08, 0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53,
        0x69, 0x7A,
    ];

    fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
        let mut s: Vec<u8> = (0..=255).collect();
        let mut j: usize = 0;
        for i in 0..256 {
            j = (j + s[i] as usize + key[i % key.len()] as usize) & 0xFF;
            s.swap(i, j);
        }
        let (mut i, mut j) = (0usize, 0usize);
        data.iter()
            .map(|&byte| {
                i = (i + 1) & 0xFF;
                j = (j + s[i] as usize) & 0xFF;
                s.swap(i, j);
                byte ^ s[(s[i] as usize + s[j] as usize) & 0xFF]
            })
            .collect()
    }

    fn encrypted_pdf(content: &[u8], permissions: i32) -> Vec<u8> {
        let file_id = b"pdftitletestid16";
        let o_value = rc4(&md5::compute(PAD_BYTES)[..5], &PAD_BYTES);

        let mut key_input = Vec::new();
        key_input.extend_from_slice(&PAD_BYTES);
        key_input.extend_from_slice(&o_value);
        key_input.extend_from_slice(&(permissions as u32).to_le_bytes());
        key_input.extend_from_slice(file_id);
        let key = md5::compute(&key_input)[..5].to_vec();
        let u_value = rc4(&key, &PAD_BYTES);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1_i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);

        for (&(num, generation), obj) in doc.objects.iter_mut() {
            let mut obj_key = key.clone();
            obj_key.extend_from_slice(&num.to_le_bytes()[..3]);
            obj_key.extend_from_slice(&generation.to_le_bytes()[..2]);
            let digest = md5::compute(&obj_key);
            let obj_key = &digest[..10];
            match obj {
                Object::Stream(stream) => {
                    let encrypted = rc4(obj_key, &stream.content);
                    stream.set_content(encrypted);
                }
                Object::String(bytes, _) => *bytes = rc4(obj_key, bytes),
                _ => {}
            }
        }

        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1_i64,
            "R" => 2_i64,
            "Length" => 40_i64,
            "O" => Object::String(o_value, StringFormat::Literal),
            "U" => Object::String(u_value, StringFormat::Literal),
            "P" => permissions as i64,
        });
        doc.trailer.set("Encrypt", Object::Reference(encrypt_id));
        doc.trailer.set(
            "ID",
            Object::Array(vec![
                Object::String(file_id.to_vec(), StringFormat::Literal),
                Object::String(file_id.to_vec(), StringFormat::Literal),
            ]),
        );
        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("failed to save encrypted test PDF");
        buf
    }

    #[test]
    fn encrypted_document_opens_with_empty_password() {
        let pdf = encrypted_pdf(b"BT /F1 12 Tf (Secret) Tj ET", -4);
        let doc = LopdfDocument::open(&pdf).unwrap();
        assert!(extraction_allowed(doc.inner()));
        let page = doc.page(1).unwrap();
        assert_eq!(doc.page_content(page).unwrap(), b"BT /F1 12 Tf (Secret) Tj ET");
    }

    #[test]
    fn encrypted_document_forbidding_extraction_is_refused() {
        // bit 5 cleared
        let pdf = encrypted_pdf(b"BT /F1 12 Tf (Secret) Tj ET", -20);
        let err = LopdfDocument::open(&pdf).unwrap_err();
        assert!(matches!(
            err,
            BackendError::Core(TitleError::ExtractionNotAllowed)
        ));
    }

    #[test]
    fn document_without_pages() {
        let doc = LopdfDocument::open(&test_pdf::with_pages(&[])).unwrap();
        assert_eq!(doc.page_count(), 0);
        assert!(matches!(
            doc.page(1).unwrap_err(),
            BackendError::Core(TitleError::NoPages)
        ));
    }
}
