//! The indexable document record.

use std::time::SystemTime;

use crate::{ExtractWarning, Extraction, StructuredFields};

/// How a document's bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocKind {
    /// UTF-8 text, optionally with a leading structured block.
    Text,
    /// A binary format read through a text extractor.
    Binary,
}

impl DocKind {
    /// Classifies a file by its lowercase extension.
    pub fn for_extension(extension: &str) -> Self {
        if extension.eq_ignore_ascii_case("pdf") {
            Self::Binary
        } else {
            Self::Text
        }
    }

    /// Returns the stored name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Binary => "binary",
        }
    }

    /// Parses a stored name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "binary" => Some(Self::Binary),
            _ => None,
        }
    }
}

/// One indexable file.
#[derive(Debug, Clone)]
pub struct Document {
    /// Relative, slash-separated path within the vault. Unique.
    pub path: String,
    /// Extracted text used for matching.
    pub body_text: String,
    /// Fields from the structured block.
    pub structured_fields: StructuredFields,
    /// Last write time reported by the filesystem.
    pub modified_at: SystemTime,
    /// Hex SHA-256 of the raw bytes.
    pub content_hash: String,
    /// How the bytes were read.
    pub doc_kind: DocKind,
    /// True when binary text extraction failed.
    pub extraction_failed: bool,
}

impl Extraction {
    /// Combines the extraction with file metadata, returning the document and any warning.
    pub fn into_document(
        self,
        path: String,
        doc_kind: DocKind,
        modified_at: SystemTime,
        content_hash: String,
    ) -> (Document, Option<ExtractWarning>) {
        let document = Document {
            path,
            body_text: self.body_text,
            structured_fields: self.structured_fields,
            modified_at,
            content_hash,
            doc_kind,
            extraction_failed: self.extraction_failed,
        };
        (document, self.warning)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ContentExtractor, content_hash};

    #[test]
    fn kind_from_extension() {
        assert_eq!(DocKind::for_extension("pdf"), DocKind::Binary);
        assert_eq!(DocKind::for_extension("PDF"), DocKind::Binary);
        assert_eq!(DocKind::for_extension("md"), DocKind::Text);
        assert_eq!(DocKind::for_extension("txt"), DocKind::Text);
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in [DocKind::Text, DocKind::Binary] {
            assert_eq!(DocKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(DocKind::parse("image"), None);
    }

    #[test]
    fn into_document_carries_metadata() {
        let bytes = b"---\ntitle: T\n---\nbody";
        let (doc, warning) = ContentExtractor::new()
            .extract(bytes, DocKind::Text)
            .into_document(
                "notes/t.md".into(),
                DocKind::Text,
                SystemTime::UNIX_EPOCH,
                content_hash(bytes),
            );

        assert!(warning.is_none());
        assert_eq!(doc.path, "notes/t.md");
        assert_eq!(doc.body_text, "body");
        assert_eq!(doc.structured_fields.len(), 1);
        assert_eq!(doc.content_hash, content_hash(bytes));
        assert_eq!(doc.modified_at, SystemTime::UNIX_EPOCH);
    }
}
