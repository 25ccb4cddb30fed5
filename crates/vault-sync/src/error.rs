//! Error types for vault-sync.

use std::path::PathBuf;

use thiserror::Error;
use vault_index::IndexError;

/// A directory could not be registered with the watcher.
///
/// Non-fatal: the directory and everything below it go unwatched.
#[derive(Debug, Error)]
#[error("cannot watch {path}: {source}")]
pub struct WatchSetupError {
    /// The directory that could not be watched.
    pub path: PathBuf,
    /// Underlying watcher error.
    pub source: notify::Error,
}

/// Errors from the reconciler and change detector.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The index store cannot be written. The reconciler stops.
    #[error("index store failure: {0}")]
    Fatal(IndexError),

    /// An index operation failed without affecting later writes.
    #[error(transparent)]
    Index(IndexError),

    /// The filesystem watcher could not be created.
    #[error("failed to start file watcher: {0}")]
    Watch(#[from] notify::Error),

    /// The reconciler is no longer running.
    #[error("reconciler has stopped")]
    Stopped,

    /// A background task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

impl SyncError {
    /// Returns true if the reconciler cannot continue after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_) | Self::Task(_))
    }
}

impl From<IndexError> for SyncError {
    fn from(err: IndexError) -> Self {
        if err.is_store_failure() {
            Self::Fatal(err)
        } else {
            Self::Index(err)
        }
    }
}
