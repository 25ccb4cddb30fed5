//! Error types for the vault-index crate.

use std::{io, path::PathBuf};

use tantivy::TantivyError;
use thiserror::Error;
use vault_query::QueryError;

/// Errors that can occur when working with the search index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Failed to open or create the index.
    #[error("failed to open index at {path}: {message}")]
    OpenIndex {
        /// Path to the index directory.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// The index files exist but cannot be read.
    #[error("index at {path} is corrupt: {message}")]
    Corrupt {
        /// Path to the index directory.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Another process holds the index writer lock.
    #[error("index at {path} is locked by another process")]
    Locked {
        /// Path to the index directory.
        path: PathBuf,
    },

    /// Failed to write to the index.
    #[error("failed to write to index: {0}")]
    Write(String),

    /// Failed to commit changes to the index.
    #[error("failed to commit index: {0}")]
    Commit(String),

    /// Failed to read from the index.
    #[error("failed to read index: {0}")]
    Read(String),

    /// The query string was rejected.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The vault could not be listed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid stemmer language.
    #[error("unsupported stemmer language: {0}")]
    InvalidLanguage(String),
}

impl IndexError {
    /// Creates an `OpenIndex` error from a path and Tantivy error.
    pub(crate) fn open_index(path: PathBuf, source: &TantivyError) -> Self {
        Self::OpenIndex {
            path,
            message: source.to_string(),
        }
    }

    /// Creates a `Write` error from a Tantivy error.
    pub(crate) fn write(source: &TantivyError) -> Self {
        Self::Write(source.to_string())
    }

    /// Creates a `Commit` error from a Tantivy error.
    pub(crate) fn commit(source: &TantivyError) -> Self {
        Self::Commit(source.to_string())
    }

    /// Creates a `Read` error from a Tantivy error.
    pub(crate) fn read(source: &TantivyError) -> Self {
        Self::Read(source.to_string())
    }

    /// Returns true when the index store itself cannot be written.
    ///
    /// Such failures affect every later write, unlike per-document problems.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::Commit(_) | Self::Io(_) | Self::Locked { .. } | Self::OpenIndex { .. }
        )
    }
}

/// Errors from reading the vault through a [`FileStore`](crate::FileStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The path does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other I/O failure.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The vault-relative path.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl StoreError {
    /// Classifies an I/O error for a vault-relative path.
    pub fn from_io(path: &str, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(path.to_string())
        } else {
            Self::Io {
                path: path.to_string(),
                source,
            }
        }
    }

    /// Returns true for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
