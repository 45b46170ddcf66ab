//! PDF rendering and protection
//!
//! Pages are drawn with `printpdf`, then the finished document is reloaded
//! with `lopdf` and encrypted with AES-256 (revision 6): the access password
//! opens it, a random owner secret guards the permissions, and only printing
//! is allowed. Revision 6 takes the password as UTF-8, so non-Latin
//! passwords are used exactly as typed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lopdf::encryption::crypt_filters::{Aes256CryptFilter, CryptFilter};
use lopdf::{EncryptionState, EncryptionVersion, Object, Permissions, StringFormat};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::fonts::{FontProvider, FontResolution, TextMode};
use super::layout::{compose, DocumentLayout, FontStyle, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use super::metrics::{HelveticaMetrics, TextMeasure, TrueTypeMetrics};
use crate::crypto::generate_owner_secret;
use crate::error::{ExportError, ExportResult};
use crate::models::{Entry, RenderOptions};

pub const DOCUMENT_TITLE: &str = "Password Export";
const LAYER_NAME: &str = "Content";
/// AES-256 revision 6 is defined by PDF 2.0
const PDF_VERSION: &str = "2.0";
const FILE_KEY_BYTES: usize = 32;
const FILE_ID_BYTES: usize = 16;
const CRYPT_FILTER: &[u8] = b"StdCF";

/// A rendered, protected document
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub pages: usize,
    /// Whether a Unicode face was embedded
    pub unicode: bool,
}

/// Regular and bold font handles for one document
struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn for_style(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
        }
    }
}

fn render_err(context: &str, e: impl std::fmt::Debug) -> ExportError {
    ExportError::Render(format!("{}: {:?}", context, e))
}

/// Renders entries into a password-protected PDF
pub struct PdfRenderer<F: FontProvider> {
    fonts: F,
}

impl<F: FontProvider> PdfRenderer<F> {
    pub fn new(fonts: F) -> Self {
        Self { fonts }
    }

    /// Lay out and draw `entries`, then protect the result.
    ///
    /// Fails before any drawing when the access password is blank.
    pub fn render(
        &self,
        entries: &[Entry],
        options: &RenderOptions,
        exported_at: &str,
    ) -> ExportResult<RenderedDocument> {
        if !options.has_access_password() {
            return Err(ExportError::MissingAccessPassword);
        }

        let (doc, page, layer) = PdfDocument::new(
            DOCUMENT_TITLE,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            LAYER_NAME,
        );

        let font_file = self.read_unicode_font();
        let embedded = font_file
            .as_ref()
            .and_then(|(path, data)| embed_font(&doc, path, data));
        let (fonts, mode, measure): (Fonts, TextMode, &dyn TextMeasure) = match &embedded {
            Some((font, metrics)) => (
                Fonts {
                    regular: font.clone(),
                    bold: font.clone(),
                },
                TextMode::Unicode,
                metrics as &dyn TextMeasure,
            ),
            None => (
                builtin_fonts(&doc)?,
                TextMode::Ascii,
                &HelveticaMetrics as &dyn TextMeasure,
            ),
        };

        let layout = compose(entries, options, exported_at, mode, measure);
        debug!(pages = layout.page_count(), "composed document layout");
        draw(&doc, (page, layer), &layout, &fonts);

        let plain = doc
            .save_to_bytes()
            .map_err(|e| render_err("Failed to serialize PDF", e))?;
        let bytes = protect(&plain, options.access_password.as_str())?;

        info!(
            pages = layout.page_count(),
            bytes = bytes.len(),
            "rendered protected document"
        );

        Ok(RenderedDocument {
            bytes,
            pages: layout.page_count(),
            unicode: mode == TextMode::Unicode,
        })
    }

    /// Bytes of the Unicode face, if one is available and readable
    fn read_unicode_font(&self) -> Option<(PathBuf, Vec<u8>)> {
        match self.fonts.unicode_font() {
            FontResolution::Available(path) => match std::fs::read(&path) {
                Ok(data) => Some((path, data)),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "could not read Unicode font, falling back to built-in face"
                    );
                    None
                }
            },
            FontResolution::Unavailable => {
                warn!("no Unicode font available, non-ASCII text will be transliterated");
                None
            }
        }
    }
}

/// Embed a TrueType face, returning its handle and metrics
fn embed_font<'d>(
    doc: &PdfDocumentReference,
    path: &Path,
    data: &'d [u8],
) -> Option<(IndirectFontRef, TrueTypeMetrics<'d>)> {
    let Some(metrics) = TrueTypeMetrics::parse(data) else {
        warn!(path = %path.display(), "not a TrueType font, falling back to built-in face");
        return None;
    };
    match doc.add_external_font(data) {
        Ok(font) => Some((font, metrics)),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = ?e,
                "could not embed Unicode font, falling back to built-in face"
            );
            None
        }
    }
}

fn builtin_fonts(doc: &PdfDocumentReference) -> ExportResult<Fonts> {
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| render_err("Failed to load built-in font", e))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| render_err("Failed to load built-in font", e))?;
    Ok(Fonts { regular, bold })
}

fn draw(
    doc: &PdfDocumentReference,
    first: (printpdf::PdfPageIndex, printpdf::PdfLayerIndex),
    layout: &DocumentLayout,
    fonts: &Fonts,
) {
    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            first
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME)
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for run in &page.runs {
            layer.use_text(
                run.text.clone(),
                run.size,
                Mm(run.x),
                Mm(PAGE_HEIGHT_MM - run.y),
                fonts.for_style(run.style),
            );
        }
    }
}

/// Encrypt a serialized PDF so it only opens with `access_password`
pub fn protect(pdf: &[u8], access_password: &str) -> ExportResult<Vec<u8>> {
    if access_password.trim().is_empty() {
        return Err(ExportError::MissingAccessPassword);
    }

    let mut doc =
        lopdf::Document::load_mem(pdf).map_err(|e| render_err("Failed to reload PDF", e))?;
    doc.version = PDF_VERSION.to_string();

    if doc.trailer.get(b"ID").is_err() {
        let mut id = [0u8; FILE_ID_BYTES];
        OsRng.fill_bytes(&mut id);
        let id = Object::String(id.to_vec(), StringFormat::Hexadecimal);
        doc.trailer.set("ID", Object::Array(vec![id.clone(), id]));
    }

    let mut file_key = Zeroizing::new([0u8; FILE_KEY_BYTES]);
    OsRng.fill_bytes(&mut *file_key);
    let filter: Arc<dyn CryptFilter> = Arc::new(Aes256CryptFilter);
    let owner_secret = generate_owner_secret();

    let version = EncryptionVersion::V5 {
        encrypt_metadata: true,
        crypt_filters: BTreeMap::from([(CRYPT_FILTER.to_vec(), filter)]),
        file_encryption_key: &file_key[..],
        stream_filter: CRYPT_FILTER.to_vec(),
        string_filter: CRYPT_FILTER.to_vec(),
        owner_password: owner_secret.as_str(),
        user_password: access_password,
        permissions: Permissions::PRINTABLE,
    };
    let state =
        EncryptionState::try_from(version).map_err(|e| render_err("Failed to derive keys", e))?;
    doc.encrypt(&state)
        .map_err(|e| render_err("Failed to encrypt PDF", e))?;

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| render_err("Failed to write PDF", e))?;
    Ok(bytes)
}
