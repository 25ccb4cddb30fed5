//! Index status detection.
//!
//! Determines the state of the index on disk without opening a writer, so it can be
//! reported while another process owns the index.

use std::path::Path;

use crate::{
    IndexOptions,
    fingerprint::{IndexFingerprint, read_fingerprint},
    journal::BatchJournal,
    manager::has_index,
};

/// Status of the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    /// Index exists and matches the current schema and analyzer.
    Current,
    /// Index exists but was built with different settings (needs full rebuild).
    FingerprintChanged,
    /// An interrupted batch left a journal behind.
    RecoveryPending,
    /// No index exists.
    Missing,
}

impl IndexStatus {
    /// Returns a human-readable description for display.
    pub fn description(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::FingerprintChanged => "stale (schema or stemmer changed)",
            Self::RecoveryPending => "interrupted batch pending recovery",
            Self::Missing => "missing",
        }
    }

    /// Returns true if the next open wipes the index.
    pub fn needs_rebuild(self) -> bool {
        matches!(self, Self::FingerprintChanged | Self::Missing)
    }
}

/// Determines the current status of the index.
pub fn detect_index_status(options: &IndexOptions) -> IndexStatus {
    let root: &Path = &options.root;
    if !has_index(root) {
        return IndexStatus::Missing;
    }

    let expected = IndexFingerprint::new(&options.stemmer).hash_string();
    match read_fingerprint(root) {
        Ok(Some(stored)) if stored == expected => {}
        _ => return IndexStatus::FingerprintChanged,
    }

    if BatchJournal::exists(root) {
        IndexStatus::RecoveryPending
    } else {
        IndexStatus::Current
    }
}
