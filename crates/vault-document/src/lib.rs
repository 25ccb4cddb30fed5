//! Content extraction for vault documents.
//!
//! Turns raw file bytes into the text and fields that get indexed:
//! - Text documents are decoded as UTF-8 and split into an optional YAML structured block
//!   and the body.
//! - Binary documents (PDF) are read through a [`TextExtractor`].
//!
//! Extraction never rejects a document. A broken structured block or an unreadable PDF
//! produces a degraded [`Extraction`] plus an [`ExtractWarning`].

#![warn(missing_docs)]

mod document;
mod error;
mod extract;
mod fields;
mod frontmatter;
mod hash;

pub use document::{DocKind, Document};
pub use error::{ExtractWarning, ExtractionError, StructuredBlockError};
pub use extract::{ContentExtractor, Extraction, PdfTextExtractor, TextExtractor};
pub use fields::{FieldValue, StructuredFields};
pub use frontmatter::{BlockSplit, split_structured_block};
pub use hash::content_hash;
