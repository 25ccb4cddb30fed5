//! Index schema definition for the vault search index.
//!
//! One Tantivy document per vault file:
//! - `path`: vault-relative path, the unique key (string, stored)
//! - `path_text`: path tokenized for `path:` queries (text)
//! - `body`: extracted body text (text with positions, stored)
//! - `tags`: tags from the structured block (text with positions)
//! - `fields_json`: all structured fields as JSON (stored only)
//! - `modified`: filesystem write time, second precision (date, indexed, fast, stored)
//! - `content_hash`: SHA-256 of the raw bytes (string, stored)
//! - `doc_kind`: `text` or `binary` (string, stored)
//! - `extraction_failed`: binary text extraction failed (bool, indexed, stored)

use tantivy::schema::{
    DateOptions, Field, INDEXED, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing,
    TextOptions,
};

use crate::analyzer::VAULT_TOKENIZER;

/// Handles to all fields in the index schema.
#[derive(Debug, Clone)]
pub struct IndexSchema {
    /// The underlying Tantivy schema.
    schema: Schema,
    /// Vault-relative path.
    pub path: Field,
    /// Tokenized path.
    pub path_text: Field,
    /// Body text.
    pub body: Field,
    /// Tags.
    pub tags: Field,
    /// Structured fields as JSON.
    pub fields_json: Field,
    /// Modification time.
    pub modified: Field,
    /// Content hash.
    pub content_hash: Field,
    /// Document kind.
    pub doc_kind: Field,
    /// Extraction failure flag.
    pub extraction_failed: Field,
}

/// Text indexing with the vault analyzer and positions, for phrase queries.
fn analyzed_text() -> TextOptions {
    TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(VAULT_TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions),
    )
}

impl IndexSchema {
    /// Creates a new index schema with all fields configured.
    pub fn new() -> Self {
        let mut builder = Schema::builder();

        let path = builder.add_text_field("path", STRING | STORED);
        let path_text = builder.add_text_field("path_text", analyzed_text());
        let body = builder.add_text_field("body", analyzed_text().set_stored());
        let tags = builder.add_text_field("tags", analyzed_text());
        let fields_json = builder.add_text_field("fields_json", STORED);
        let modified = builder.add_date_field(
            "modified",
            DateOptions::default().set_indexed().set_fast().set_stored(),
        );
        let content_hash = builder.add_text_field("content_hash", STRING | STORED);
        let doc_kind = builder.add_text_field("doc_kind", STRING | STORED);
        let extraction_failed = builder.add_bool_field("extraction_failed", INDEXED | STORED);

        let schema = builder.build();

        Self {
            schema,
            path,
            path_text,
            body,
            tags,
            fields_json,
            modified,
            content_hash,
            doc_kind,
            extraction_failed,
        }
    }

    /// Returns a reference to the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl Default for IndexSchema {
    fn default() -> Self {
        Self::new()
    }
}
