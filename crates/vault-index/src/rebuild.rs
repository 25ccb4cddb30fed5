//! Bringing the index in line with the vault on disk.
//!
//! [`rebuild_from`] diffs every supported file against the committed hashes.
//! [`sync_path`] does the same for one path, which may be a file, a directory or
//! something that no longer exists.

use std::{collections::BTreeSet, fmt};

use tracing::{info, warn};
use vault_document::{ContentExtractor, DocKind, content_hash};

use crate::{FileStore, IndexError, IndexManager, StoreError, UpsertOutcome};

/// A file that could not be indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    /// Vault-relative path.
    pub path: String,
    /// What went wrong.
    pub message: String,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Statistics from an indexing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Documents added.
    pub added: usize,
    /// Documents replaced with new content.
    pub updated: usize,
    /// Documents removed.
    pub removed: usize,
    /// Files whose content hash matched the index.
    pub unchanged: usize,
    /// Files that could not be read.
    pub failed: usize,
    /// Per-file errors.
    pub errors: Vec<FileError>,
}

impl IndexStats {
    /// Returns true if no errors occurred.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the total number of documents that changed.
    pub fn total_changes(&self) -> usize {
        self.added + self.updated + self.removed
    }

    /// Adds another pass's counts to this one.
    pub fn merge(&mut self, other: Self) {
        self.added += other.added;
        self.updated += other.updated;
        self.removed += other.removed;
        self.unchanged += other.unchanged;
        self.failed += other.failed;
        self.errors.extend(other.errors);
    }

    /// Records a file that could not be read.
    fn record_failure(&mut self, path: &str, error: &StoreError) {
        warn!(path = %path, error = %error, "failed to read file");
        self.failed += 1;
        self.errors.push(FileError {
            path: path.to_string(),
            message: error.to_string(),
        });
    }
}

/// Reconciles the whole vault, committing every `batch_size` changes.
pub fn rebuild_from(
    manager: &mut IndexManager,
    store: &dyn FileStore,
    extractor: &ContentExtractor,
    batch_size: usize,
) -> Result<IndexStats, IndexError> {
    let batch_size = batch_size.max(1);
    let files = store.list_tree()?;
    let mut stale: BTreeSet<String> = manager.indexed_hashes()?.into_keys().collect();
    let mut stats = IndexStats::default();

    for path in &files {
        stale.remove(path);
        if let Some(kind) = store.doc_kind(path) {
            sync_file(manager, store, extractor, path, kind, &mut stats)?;
        }
        if manager.pending_len() >= batch_size {
            manager.commit()?;
        }
    }

    for path in &stale {
        if manager.delete(path)? {
            stats.removed += 1;
        }
        if manager.pending_len() >= batch_size {
            manager.commit()?;
        }
    }

    manager.commit()?;

    info!(
        files = files.len(),
        added = stats.added,
        updated = stats.updated,
        removed = stats.removed,
        unchanged = stats.unchanged,
        failed = stats.failed,
        "reconciled vault"
    );
    Ok(stats)
}

/// Re-reads one path from disk and buffers the matching index changes.
///
/// - Missing path: the document and everything indexed below it are deleted.
/// - Directory: every supported file below it is synced and vanished files are deleted.
/// - File: hashed and re-extracted when the content changed.
///
/// Nothing is committed.
pub fn sync_path(
    manager: &mut IndexManager,
    store: &dyn FileStore,
    extractor: &ContentExtractor,
    path: &str,
) -> Result<IndexStats, IndexError> {
    let mut stats = IndexStats::default();

    match store.stat(path) {
        Err(e) if e.is_not_found() => remove_tree(manager, path, &mut stats)?,
        Err(e) => stats.record_failure(path, &e),
        Ok(meta) if meta.is_dir => {
            let files = match store.list_under(path) {
                Ok(files) => files,
                Err(e) if e.is_not_found() => {
                    remove_tree(manager, path, &mut stats)?;
                    return Ok(stats);
                }
                Err(e) => {
                    stats.record_failure(path, &e);
                    return Ok(stats);
                }
            };
            let mut stale: BTreeSet<String> = manager.paths_under(path)?.into_iter().collect();
            for file in &files {
                stale.remove(file);
                if let Some(kind) = store.doc_kind(file) {
                    sync_file(manager, store, extractor, file, kind, &mut stats)?;
                }
            }
            for file in &stale {
                if manager.delete(file)? {
                    stats.removed += 1;
                }
            }
        }
        Ok(_) => match store.doc_kind(path) {
            Some(kind) => sync_file(manager, store, extractor, path, kind, &mut stats)?,
            None => {
                if manager.delete(path)? {
                    stats.removed += 1;
                }
            }
        },
    }

    Ok(stats)
}

/// Deletes a path and every document indexed below it.
fn remove_tree(
    manager: &mut IndexManager,
    path: &str,
    stats: &mut IndexStats,
) -> Result<(), IndexError> {
    if manager.delete(path)? {
        stats.removed += 1;
    }
    for child in manager.paths_under(path)? {
        if manager.delete(&child)? {
            stats.removed += 1;
        }
    }
    Ok(())
}

/// Hashes a file and upserts it when its content changed.
fn sync_file(
    manager: &mut IndexManager,
    store: &dyn FileStore,
    extractor: &ContentExtractor,
    path: &str,
    kind: DocKind,
    stats: &mut IndexStats,
) -> Result<(), IndexError> {
    let read = store
        .read(path)
        .and_then(|bytes| store.stat(path).map(|meta| (bytes, meta)));
    let (bytes, meta) = match read {
        Ok(found) => found,
        Err(e) if e.is_not_found() => {
            if manager.delete(path)? {
                stats.removed += 1;
            }
            return Ok(());
        }
        Err(e) => {
            stats.record_failure(path, &e);
            return Ok(());
        }
    };

    let hash = content_hash(&bytes);
    if manager.indexed_hash(path)?.as_deref() == Some(hash.as_str()) {
        stats.unchanged += 1;
        return Ok(());
    }

    let (document, warning) = extractor.extract(&bytes, kind).into_document(
        path.to_string(),
        kind,
        meta.modified_at,
        hash,
    );
    if let Some(warning) = warning {
        warn!(path = %path, error = %warning, "indexing with degraded content");
    }

    match manager.upsert(&document)? {
        UpsertOutcome::Added => stats.added += 1,
        UpsertOutcome::Replaced => stats.updated += 1,
        UpsertOutcome::Unchanged => stats.unchanged += 1,
    }
    Ok(())
}
