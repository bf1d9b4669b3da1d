//! PDF text extraction using lopdf and pdf-extract.

use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::{debug, trace};

use super::{DocumentDecoder, DocumentKind, Result};
use crate::error::DecodeError;

/// Page-document decoder.
///
/// Text is read page by page with lopdf. A page that yields no text, or whose
/// content cannot be decoded, contributes an empty string. When no page yields
/// anything, pdf-extract gets one whole-document attempt.
pub struct PdfDecoder {
    whole_document_fallback: bool,
}

impl PdfDecoder {
    /// Create a new PDF decoder.
    pub fn new() -> Self {
        Self {
            whole_document_fallback: true,
        }
    }

    /// Enable or disable the pdf-extract pass for documents with no per-page text.
    pub fn with_whole_document_fallback(mut self, enabled: bool) -> Self {
        self.whole_document_fallback = enabled;
        self
    }

    /// Parse the document, decrypting it if it uses an empty password.
    ///
    /// Returns the document together with the bytes pdf-extract should read.
    fn load<'a>(&self, data: &'a [u8]) -> Result<(Document, Cow<'a, [u8]>)> {
        let mut doc = Document::load_mem(data).map_err(|e| DecodeError::Pdf(e.to_string()))?;

        if !doc.is_encrypted() {
            return Ok((doc, Cow::Borrowed(data)));
        }

        if doc.decrypt("").is_err() {
            return Err(DecodeError::Encrypted);
        }
        debug!("Decrypted PDF with empty password");

        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| DecodeError::Pdf(format!("failed to save decrypted PDF: {}", e)))?;
        Ok((doc, Cow::Owned(decrypted)))
    }

    /// Extract the text of every page, in page order.
    pub fn page_texts(&self, data: &[u8]) -> Result<Vec<String>> {
        let (doc, _) = self.load(data)?;
        Ok(Self::read_pages(&doc))
    }

    fn read_pages(doc: &Document) -> Vec<String> {
        doc.get_pages()
            .keys()
            .map(|&number| match doc.extract_text(&[number]) {
                Ok(text) => text.trim_end().to_string(),
                Err(e) => {
                    trace!("No text on page {}: {}", number, e);
                    String::new()
                }
            })
            .collect()
    }
}

impl Default for PdfDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentDecoder for PdfDecoder {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    fn decode(&self, data: &[u8]) -> Result<String> {
        let (doc, raw) = self.load(data)?;
        let pages = Self::read_pages(&doc);

        debug!(
            "PDF has {} pages, {} with text",
            pages.len(),
            pages.iter().filter(|p| !p.trim().is_empty()).count()
        );

        let text = pages.join("\n");
        if !text.trim().is_empty() || !self.whole_document_fallback || pages.is_empty() {
            return Ok(text);
        }

        // pdf-extract panics on some documents lopdf reads fine
        let whole = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(&raw)));
        match whole {
            Ok(Ok(whole)) if !whole.trim().is_empty() => {
                debug!("Per-page extraction was empty, using whole-document text");
                Ok(whole)
            }
            Ok(Ok(_)) => Ok(text),
            Ok(Err(e)) => {
                debug!("Whole-document extraction failed: {}", e);
                Ok(text)
            }
            Err(_) => {
                debug!("Whole-document extraction panicked, keeping per-page text");
                Ok(text)
            }
        }
    }
}
