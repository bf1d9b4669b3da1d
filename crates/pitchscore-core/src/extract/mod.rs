//! Document text extraction.
//!
//! Two container formats are supported: PDF (text per page) and PPTX (text
//! per shape per slide). The filename hint picks the decoder; without a usable
//! hint every decoder is tried in order until one succeeds.

mod pdf;
mod slides;

pub use pdf::PdfDecoder;
pub use slides::SlideDecoder;

use std::fmt;

use tracing::debug;

use crate::error::DecodeError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Container format of a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Page-based document.
    Pdf,
    /// Slide/shape-based document.
    Pptx,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Pdf, DocumentKind::Pptx];

    /// Infer the container format from a filename. Case-insensitive.
    pub fn from_filename(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        let (_, ext) = name.rsplit_once('.')?;
        Self::ALL.into_iter().find(|kind| kind.extensions().contains(&ext))
    }

    /// File extensions routed to this format.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            DocumentKind::Pdf => &["pdf"],
            DocumentKind::Pptx => &["pptx", "ppt"],
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Pdf => f.write_str("pdf"),
            DocumentKind::Pptx => f.write_str("pptx"),
        }
    }
}

/// A decoder for one container format.
pub trait DocumentDecoder: Send + Sync {
    /// Format handled by this decoder.
    fn kind(&self) -> DocumentKind;

    /// Decode the container and return its newline-joined text.
    fn decode(&self, data: &[u8]) -> Result<String>;
}

/// Turns document bytes into plain text.
pub trait TextExtractor: Send + Sync {
    /// Extract text from `data`. The filename is only a format hint.
    fn extract(&self, data: &[u8], filename: Option<&str>) -> Result<String>;
}

/// Extractor over an ordered list of decoders.
pub struct DeckExtractor {
    decoders: Vec<Box<dyn DocumentDecoder>>,
}

impl DeckExtractor {
    /// PDF first, then PPTX.
    pub fn new() -> Self {
        Self::with_decoders(vec![
            Box::new(PdfDecoder::new()),
            Box::new(SlideDecoder::new()),
        ])
    }

    /// Build an extractor over custom decoders, tried in the given order.
    pub fn with_decoders(decoders: Vec<Box<dyn DocumentDecoder>>) -> Self {
        Self { decoders }
    }

    fn decoder_for(&self, kind: DocumentKind) -> Option<&dyn DocumentDecoder> {
        self.decoders
            .iter()
            .find(|d| d.kind() == kind)
            .map(|d| d.as_ref())
    }

    fn try_all(&self, data: &[u8]) -> Result<String> {
        let mut attempts = Vec::with_capacity(self.decoders.len());

        for decoder in &self.decoders {
            match decoder.decode(data) {
                Ok(text) => {
                    debug!("Decoded document as {}", decoder.kind());
                    return Ok(text);
                }
                Err(e) => {
                    debug!("Decoding as {} failed: {}", decoder.kind(), e);
                    attempts.push(format!("{}: {}", decoder.kind(), e));
                }
            }
        }

        Err(DecodeError::Unrecognized { attempts })
    }
}

impl Default for DeckExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for DeckExtractor {
    fn extract(&self, data: &[u8], filename: Option<&str>) -> Result<String> {
        let hinted = filename
            .and_then(DocumentKind::from_filename)
            .and_then(|kind| self.decoder_for(kind));

        let text = match hinted {
            Some(decoder) => {
                debug!("Decoding {} bytes as {} (from filename)", data.len(), decoder.kind());
                decoder.decode(data)?
            }
            None => {
                debug!("No usable filename hint, trying all decoders");
                self.try_all(data)?
            }
        };

        debug!("Extracted {} chars of text", text.chars().count());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedDecoder {
        kind: DocumentKind,
        outcome: std::result::Result<&'static str, &'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl DocumentDecoder for FixedDecoder {
        fn kind(&self) -> DocumentKind {
            self.kind
        }

        fn decode(&self, _data: &[u8]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome
                .map(str::to_string)
                .map_err(|e| DecodeError::Pdf(e.to_string()))
        }
    }

    fn fixed(
        kind: DocumentKind,
        outcome: std::result::Result<&'static str, &'static str>,
    ) -> (Box<dyn DocumentDecoder>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let decoder = FixedDecoder { kind, outcome, calls: calls.clone() };
        (Box::new(decoder), calls)
    }

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(DocumentKind::from_filename("deck.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_filename("deck.pptx"), Some(DocumentKind::Pptx));
        assert_eq!(DocumentKind::from_filename("old.ppt"), Some(DocumentKind::Pptx));
        assert_eq!(DocumentKind::from_filename("notes.txt"), None);
        assert_eq!(DocumentKind::from_filename(""), None);
        assert_eq!(DocumentKind::from_filename("deck.pdf.bak"), None);
        assert_eq!(DocumentKind::from_filename("pdf"), None);
    }

    #[test]
    fn test_hint_selects_single_decoder() {
        let (pdf, pdf_calls) = fixed(DocumentKind::Pdf, Ok("pdf text"));
        let (pptx, pptx_calls) = fixed(DocumentKind::Pptx, Ok("slide text"));
        let extractor = DeckExtractor::with_decoders(vec![pdf, pptx]);

        let text = extractor.extract(b"..", Some("deck.pptx")).unwrap();
        assert_eq!(text, "slide text");
        assert_eq!(pdf_calls.load(Ordering::SeqCst), 0);
        assert_eq!(pptx_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hinted_failure_propagates() {
        let (pdf, _) = fixed(DocumentKind::Pdf, Err("broken xref"));
        let (pptx, pptx_calls) = fixed(DocumentKind::Pptx, Ok("slide text"));
        let extractor = DeckExtractor::with_decoders(vec![pdf, pptx]);

        let err = extractor.extract(b"..", Some("deck.pdf")).unwrap_err();
        assert!(matches!(err, DecodeError::Pdf(_)));
        assert_eq!(pptx_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_hint_falls_through_in_order() {
        let (pdf, pdf_calls) = fixed(DocumentKind::Pdf, Err("not a pdf"));
        let (pptx, pptx_calls) = fixed(DocumentKind::Pptx, Ok("slide text"));
        let extractor = DeckExtractor::with_decoders(vec![pdf, pptx]);

        let text = extractor.extract(b"..", None).unwrap();
        assert_eq!(text, "slide text");
        assert_eq!(pdf_calls.load(Ordering::SeqCst), 1);
        assert_eq!(pptx_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_first_success_stops_trial() {
        let (pdf, _) = fixed(DocumentKind::Pdf, Ok("pdf text"));
        let (pptx, pptx_calls) = fixed(DocumentKind::Pptx, Ok("slide text"));
        let extractor = DeckExtractor::with_decoders(vec![pdf, pptx]);

        assert_eq!(extractor.extract(b"..", Some("upload.bin")).unwrap(), "pdf text");
        assert_eq!(pptx_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_all_decoders_fail() {
        let (pdf, _) = fixed(DocumentKind::Pdf, Err("a"));
        let (pptx, _) = fixed(DocumentKind::Pptx, Err("b"));
        let extractor = DeckExtractor::with_decoders(vec![pdf, pptx]);

        match extractor.extract(b"..", None) {
            Err(DecodeError::Unrecognized { attempts }) => assert_eq!(attempts.len(), 2),
            other => panic!("expected Unrecognized, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_bytes_with_real_decoders() {
        let extractor = DeckExtractor::new();
        let garbage = b"this is neither a pdf nor a zip archive";

        assert!(matches!(
            extractor.extract(garbage, None),
            Err(DecodeError::Unrecognized { .. })
        ));
        assert!(extractor.extract(garbage, Some("deck.pdf")).is_err());
        assert!(extractor.extract(garbage, Some("deck.pptx")).is_err());
    }
}
