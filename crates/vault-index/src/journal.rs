//! Batch journal for crash recovery.
//!
//! Before each commit the manager records the batch generation and the paths it
//! touches in `pending-batch.json`. The commit itself carries the generation as its
//! payload. A journal left behind with a generation newer than the committed one
//! names the paths of a batch that never became durable.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// File name of the journal inside the index root.
pub const JOURNAL_FILENAME: &str = "pending-batch.json";

/// A batch that was about to be committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJournal {
    /// Generation the batch would have committed as.
    pub generation: u64,
    /// Vault-relative paths touched by the batch.
    pub paths: Vec<String>,
}

/// Returns the journal path for an index root.
pub fn journal_path(index_root: &Path) -> PathBuf {
    index_root.join(JOURNAL_FILENAME)
}

impl BatchJournal {
    /// Writes the journal durably: temp file, fsync, rename.
    pub fn write(&self, index_root: &Path) -> io::Result<()> {
        let path = journal_path(index_root);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec(self).map_err(io::Error::other)?;
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)
    }

    /// Reads a journal left in the index root.
    ///
    /// A journal that cannot be parsed was torn before its rename and is treated
    /// as absent.
    pub fn read(index_root: &Path) -> io::Result<Option<Self>> {
        let bytes = match fs::read(journal_path(index_root)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(serde_json::from_slice(&bytes).ok())
    }

    /// Removes the journal if present.
    pub fn remove(index_root: &Path) -> io::Result<()> {
        match fs::remove_file(journal_path(index_root)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Returns true if a journal file exists in the index root.
    pub fn exists(index_root: &Path) -> bool {
        journal_path(index_root).exists()
    }
}

#[cfg(test)]
mod test {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn write_read_remove() {
        let dir = TempDir::new().unwrap();
        let journal = BatchJournal {
            generation: 7,
            paths: vec!["a.md".to_string(), "notes/b.md".to_string()],
        };

        journal.write(dir.path()).unwrap();
        assert!(BatchJournal::exists(dir.path()));
        assert_eq!(BatchJournal::read(dir.path()).unwrap(), Some(journal));

        BatchJournal::remove(dir.path()).unwrap();
        assert!(!BatchJournal::exists(dir.path()));
        assert_eq!(BatchJournal::read(dir.path()).unwrap(), None);
    }

    #[test]
    fn remove_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        assert!(BatchJournal::remove(dir.path()).is_ok());
    }

    #[test]
    fn torn_journal_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        fs::write(journal_path(dir.path()), b"{\"generation\": 3, \"pa").unwrap();
        assert_eq!(BatchJournal::read(dir.path()).unwrap(), None);
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        BatchJournal {
            generation: 1,
            paths: vec![],
        }
        .write(dir.path())
        .unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![JOURNAL_FILENAME]);
    }
}
