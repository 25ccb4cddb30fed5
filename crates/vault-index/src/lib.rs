//! Tantivy-based index and query engine for vault.
//!
//! This crate keeps a persistent full-text index of a vault and answers ranked queries
//! against it. It handles:
//! - Index creation, incremental update and atomic commits ([`IndexManager`])
//! - Crash recovery through a batch journal and commit generations
//! - Schema and analyzer fingerprints for index versioning
//! - Reconciliation of the index against the files of a [`FileStore`]
//! - Query evaluation, ranking and snippets ([`QueryEngine`])
//!
//! # Example
//!
//! ```no_run
//! use vault_document::ContentExtractor;
//! use vault_index::{IndexManager, IndexOptions, LocalFileStore, QueryEngine};
//!
//! let store = LocalFileStore::new("./notes", &["md".to_string()]);
//! let mut manager = IndexManager::open(&IndexOptions::new("./.vault/index")).unwrap();
//! manager
//!     .rebuild_from(&store, &ContentExtractor::new(), 200)
//!     .unwrap();
//!
//! let engine = QueryEngine::new("english", 200).unwrap();
//! for hit in engine.search("fox", &manager.snapshot(), 10).unwrap() {
//!     println!("{} {:.2} {}", hit.path, hit.score, hit.content_preview);
//! }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod error;
mod fingerprint;
mod journal;
mod manager;
mod rebuild;
mod schema;
mod search;
mod snapshot;
mod status;
mod store;

pub use analyzer::{
    VAULT_TOKENIZER, analyze, build_analyzer, build_analyzer_from_name, parse_language,
};
pub use error::{IndexError, StoreError};
pub use fingerprint::{FINGERPRINT_FILENAME, IndexFingerprint, SCHEMA_VERSION};
pub use journal::{BatchJournal, JOURNAL_FILENAME};
pub use manager::{
    CommitStats, IndexManager, IndexOptions, OpenReport, ResetReason, UpsertOutcome, has_index,
    open_reader,
};
pub use rebuild::{FileError, IndexStats};
pub use schema::IndexSchema;
pub use search::{QueryCompiler, QueryEngine, ScoredResult, build_snippet, first_match};
pub use snapshot::{IndexReaderHandle, IndexSnapshot, StoredDocument};
pub use status::{IndexStatus, detect_index_status};
pub use store::{FileMeta, FileStore, LocalFileStore};
