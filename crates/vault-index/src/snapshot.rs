//! Point-in-time read views of the index.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tantivy::{
    IndexReader, Searcher, TantivyDocument, Term,
    collector::TopDocs,
    query::{AllQuery, TermQuery},
    schema::{Field, IndexRecordOption, Value},
};
use vault_document::DocKind;

use crate::{IndexError, schema::IndexSchema};

/// The searcher and generation of the most recent commit.
#[derive(Clone)]
struct Published {
    /// Searcher over the committed segments.
    searcher: Searcher,
    /// Commit generation the searcher reflects.
    generation: u64,
}

/// Cloneable handle that hands out snapshots of the committed index.
///
/// Handles never touch the writer, so they can be shared with query threads while
/// the index manager keeps committing.
#[derive(Clone)]
pub struct IndexReaderHandle {
    /// Tantivy reader, reloaded manually after each commit.
    reader: IndexReader,
    /// Latest published view.
    published: Arc<RwLock<Published>>,
    /// Schema with field handles.
    schema: IndexSchema,
}

impl IndexReaderHandle {
    /// Wraps a reader whose current searcher reflects `generation`.
    pub(crate) fn new(reader: IndexReader, schema: IndexSchema, generation: u64) -> Self {
        let published = Published {
            searcher: reader.searcher(),
            generation,
        };
        Self {
            reader,
            published: Arc::new(RwLock::new(published)),
            schema,
        }
    }

    /// Reloads the reader and publishes the view of `generation`.
    pub(crate) fn publish(&self, generation: u64) -> Result<(), IndexError> {
        self.reader.reload().map_err(|e| IndexError::read(&e))?;
        *self.published.write() = Published {
            searcher: self.reader.searcher(),
            generation,
        };
        Ok(())
    }

    /// Takes a snapshot of the last committed state.
    ///
    /// Never waits on a commit in progress.
    pub fn snapshot(&self) -> IndexSnapshot {
        let published = self.published.read().clone();
        IndexSnapshot {
            searcher: published.searcher,
            generation: published.generation,
            schema: self.schema.clone(),
        }
    }

    /// Returns the generation of the last published commit.
    pub fn generation(&self) -> u64 {
        self.published.read().generation
    }
}

/// A document as stored in the index.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Vault-relative path.
    pub path: String,
    /// Stored body text.
    pub body_text: String,
    /// Structured fields as JSON.
    pub structured_fields: serde_json::Value,
    /// Modification time, second precision.
    pub modified: DateTime<Utc>,
    /// Content hash.
    pub content_hash: String,
    /// Document kind.
    pub doc_kind: DocKind,
    /// True when binary text extraction failed.
    pub extraction_failed: bool,
}

/// An immutable view of the index at one commit.
#[derive(Clone)]
pub struct IndexSnapshot {
    /// Searcher pinned to the snapshot's segments.
    searcher: Searcher,
    /// Commit generation.
    generation: u64,
    /// Schema with field handles.
    schema: IndexSchema,
}

impl IndexSnapshot {
    /// Commit generation this snapshot was taken at.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of documents visible in this snapshot.
    pub fn num_docs(&self) -> u64 {
        self.searcher.num_docs()
    }

    /// The underlying searcher.
    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    /// The schema field handles.
    pub fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    /// Looks up the stored document for a path.
    pub fn get(&self, path: &str) -> Result<Option<StoredDocument>, IndexError> {
        let term = Term::from_field_text(self.schema.path, path);
        let query = TermQuery::new(term, IndexRecordOption::Basic);
        let top = self
            .searcher
            .search(&query, &TopDocs::with_limit(1))
            .map_err(|e| IndexError::read(&e))?;

        match top.first() {
            Some((_, address)) => {
                let doc: TantivyDocument =
                    self.searcher.doc(*address).map_err(|e| IndexError::read(&e))?;
                Ok(Some(self.stored(&doc)))
            }
            None => Ok(None),
        }
    }

    /// Returns every stored document, sorted by path.
    pub fn documents(&self) -> Result<Vec<StoredDocument>, IndexError> {
        let limit = usize::try_from(self.num_docs()).unwrap_or(usize::MAX).max(1);
        let top = self
            .searcher
            .search(&AllQuery, &TopDocs::with_limit(limit))
            .map_err(|e| IndexError::read(&e))?;

        let mut docs = Vec::with_capacity(top.len());
        for (_, address) in top {
            let doc: TantivyDocument = self.searcher.doc(address).map_err(|e| IndexError::read(&e))?;
            docs.push(self.stored(&doc));
        }
        docs.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(docs)
    }

    /// Converts a retrieved Tantivy document.
    fn stored(&self, doc: &TantivyDocument) -> StoredDocument {
        let schema = &self.schema;
        StoredDocument {
            path: text_value(doc, schema.path),
            body_text: text_value(doc, schema.body),
            structured_fields: serde_json::from_str(&text_value(doc, schema.fields_json))
                .unwrap_or_default(),
            modified: date_value(doc, schema.modified),
            content_hash: text_value(doc, schema.content_hash),
            doc_kind: DocKind::parse(&text_value(doc, schema.doc_kind)).unwrap_or(DocKind::Text),
            extraction_failed: doc
                .get_first(schema.extraction_failed)
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        }
    }
}

/// Reads the first value of a text field.
pub fn text_value(doc: &TantivyDocument, field: Field) -> String {
    doc.get_first(field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Reads the first value of a date field as UTC.
pub fn date_value(doc: &TantivyDocument, field: Field) -> DateTime<Utc> {
    doc.get_first(field)
        .and_then(|v| v.as_datetime())
        .and_then(|dt| DateTime::from_timestamp(dt.into_timestamp_secs(), 0))
        .unwrap_or_default()
}
