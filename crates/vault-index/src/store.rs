//! Read access to the vault filesystem.
//!
//! The index never touches the filesystem directly. Rebuilds and the reconciler go
//! through a [`FileStore`], keyed by vault-relative, slash-separated paths.

use std::{
    collections::BTreeSet,
    ffi::OsStr,
    fs,
    path::{Component, Path, PathBuf},
    time::SystemTime,
};

use tracing::warn;
use vault_document::DocKind;
use walkdir::WalkDir;

use crate::StoreError;

/// Filesystem metadata for one vault path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    /// Size in bytes.
    pub size: u64,
    /// Last write time.
    pub modified_at: SystemTime,
    /// True for directories.
    pub is_dir: bool,
}

/// Read-only view of a vault.
pub trait FileStore: Send + Sync {
    /// Reads the full contents of a file.
    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError>;

    /// Returns metadata for a file or directory.
    fn stat(&self, path: &str) -> Result<FileMeta, StoreError>;

    /// Lists every supported file in the vault, sorted.
    fn list_tree(&self) -> Result<Vec<String>, StoreError>;

    /// Classifies a path, returning `None` for files that are not indexed.
    fn doc_kind(&self, path: &str) -> Option<DocKind>;

    /// Lists every supported file below a directory, sorted.
    fn list_under(&self, dir: &str) -> Result<Vec<String>, StoreError> {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        Ok(self
            .list_tree()?
            .into_iter()
            .filter(|path| path.starts_with(&prefix))
            .collect())
    }
}

/// A [`FileStore`] over a local directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    /// Vault root, canonicalized when it exists.
    root: PathBuf,
    /// Lowercase extensions without the leading dot.
    extensions: BTreeSet<String>,
}

impl LocalFileStore {
    /// Creates a store over `root` that indexes files with the given extensions.
    pub fn new(root: impl Into<PathBuf>, extensions: &[String]) -> Self {
        let root = root.into();
        let root = fs::canonicalize(&root).unwrap_or(root);
        Self {
            root,
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Returns the vault root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Converts an absolute path into a vault key.
    ///
    /// Returns `None` for paths outside the root, the root itself, and non-UTF-8 paths.
    pub fn key_for(&self, abs_path: &Path) -> Option<String> {
        let rel = abs_path.strip_prefix(&self.root).ok()?;
        let mut parts = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str()?),
                Component::CurDir => {}
                _ => return None,
            }
        }
        if parts.is_empty() {
            return None;
        }
        Some(parts.join("/"))
    }

    /// Converts a vault key into an absolute path.
    pub fn abs_path(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    /// Returns true if the key names a file that should be indexed.
    pub fn is_supported(&self, key: &str) -> bool {
        self.doc_kind(key).is_some()
    }

    /// Walks `dir` and collects supported file keys.
    fn walk(&self, dir: &Path) -> Vec<String> {
        let mut keys = Vec::new();
        for entry in WalkDir::new(dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable vault entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            match self.key_for(entry.path()) {
                Some(key) if self.is_supported(&key) => keys.push(key),
                _ => {}
            }
        }
        keys.sort();
        keys
    }
}

impl FileStore for LocalFileStore {
    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        fs::read(self.abs_path(path)).map_err(|e| StoreError::from_io(path, e))
    }

    fn stat(&self, path: &str) -> Result<FileMeta, StoreError> {
        let meta = fs::metadata(self.abs_path(path)).map_err(|e| StoreError::from_io(path, e))?;
        Ok(FileMeta {
            size: meta.len(),
            modified_at: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            is_dir: meta.is_dir(),
        })
    }

    fn list_tree(&self) -> Result<Vec<String>, StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::NotFound(self.root.display().to_string()));
        }
        Ok(self.walk(&self.root))
    }

    fn doc_kind(&self, path: &str) -> Option<DocKind> {
        if path.is_empty() || path.split('/').any(|part| part.starts_with('.')) {
            return None;
        }
        let name = path.rsplit('/').next()?;
        let (_, ext) = name.rsplit_once('.')?;
        let ext = ext.to_lowercase();
        self.extensions
            .contains(&ext)
            .then(|| DocKind::for_extension(&ext))
    }

    fn list_under(&self, dir: &str) -> Result<Vec<String>, StoreError> {
        let abs = self.abs_path(dir);
        if !abs.is_dir() {
            return Err(StoreError::NotFound(dir.to_string()));
        }
        Ok(self.walk(&abs))
    }
}

/// Checks if a filename represents a hidden file (starts with '.').
fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}
