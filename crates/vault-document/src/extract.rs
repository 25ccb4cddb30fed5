//! Turning raw document bytes into indexable text.

use std::{fmt, panic, sync::Arc};

use crate::{
    DocKind, ExtractWarning, ExtractionError, StructuredFields, frontmatter::split_structured_block,
};

/// Extracts plain text from a binary document format.
pub trait TextExtractor: Send + Sync {
    /// Returns the document's text, or why it could not be read.
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// PDF text extraction via `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        // pdf-extract panics on some malformed inputs.
        match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractionError::new(e.to_string())),
            Err(_) => Err(ExtractionError::new("pdf extractor panicked")),
        }
    }
}

/// The text and fields extracted from one document.
#[derive(Debug)]
pub struct Extraction {
    /// Text used for full-text matching.
    pub body_text: String,
    /// Fields from the structured block (text documents only).
    pub structured_fields: StructuredFields,
    /// True when a binary document's text could not be extracted.
    pub extraction_failed: bool,
    /// The soft failure, if any, for the caller to log.
    pub warning: Option<ExtractWarning>,
}

/// Separates body text from structured fields and reads binary documents.
///
/// Extraction is pure and the extractor is cheap to clone, so it can run on any thread.
#[derive(Clone)]
pub struct ContentExtractor {
    /// Extractor for binary documents.
    binary: Arc<dyn TextExtractor>,
}

impl fmt::Debug for ContentExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentExtractor").finish_non_exhaustive()
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor {
    /// Creates an extractor that reads binary documents as PDF.
    pub fn new() -> Self {
        Self::with_binary_extractor(PdfTextExtractor)
    }

    /// Creates an extractor with a custom binary text extractor.
    pub fn with_binary_extractor(extractor: impl TextExtractor + 'static) -> Self {
        Self {
            binary: Arc::new(extractor),
        }
    }

    /// Extracts body text and structured fields from raw bytes.
    ///
    /// Never fails: problems degrade the result and are reported in
    /// [`Extraction::warning`].
    pub fn extract(&self, bytes: &[u8], kind: DocKind) -> Extraction {
        match kind {
            DocKind::Text => extract_text_document(bytes),
            DocKind::Binary => match self.binary.extract_text(bytes) {
                Ok(body_text) => Extraction {
                    body_text,
                    structured_fields: StructuredFields::new(),
                    extraction_failed: false,
                    warning: None,
                },
                Err(error) => Extraction {
                    body_text: String::new(),
                    structured_fields: StructuredFields::new(),
                    extraction_failed: true,
                    warning: Some(error.into()),
                },
            },
        }
    }
}

/// Decodes a text document and splits off its structured block.
fn extract_text_document(bytes: &[u8]) -> Extraction {
    let text = String::from_utf8_lossy(bytes);
    let split = split_structured_block(&text);
    Extraction {
        body_text: split.body.to_string(),
        structured_fields: split.fields,
        extraction_failed: false,
        warning: split.error.map(ExtractWarning::from),
    }
}
