//! Error types for content extraction.
//!
//! Every error here is soft: extraction still produces a document, with reduced fidelity.

use thiserror::Error;

/// A structured block that could not be used.
#[derive(Debug, Error)]
pub enum StructuredBlockError {
    /// The opening `---` line has no matching closing line.
    #[error("structured block is not terminated")]
    Unterminated,

    /// The block is not valid YAML.
    #[error("structured block is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The block is valid YAML but not a mapping.
    #[error("structured block is not a mapping")]
    NotMapping,
}

/// Binary document text could not be extracted.
#[derive(Debug, Error)]
#[error("text extraction failed: {message}")]
pub struct ExtractionError {
    /// Description from the extractor.
    pub message: String,
}

impl ExtractionError {
    /// Creates an extraction error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The soft failure reported alongside an extraction.
#[derive(Debug, Error)]
pub enum ExtractWarning {
    /// Problem with a text document's structured block.
    #[error(transparent)]
    StructuredBlock(#[from] StructuredBlockError),

    /// Problem extracting a binary document's text.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}
