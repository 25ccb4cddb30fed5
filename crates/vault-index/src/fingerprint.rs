//! Schema and analyzer fingerprint for index versioning.
//!
//! The index root stores a hash of every setting that changes how documents are
//! analyzed or laid out. An index opened with a different fingerprint cannot be
//! updated incrementally and is wiped and rebuilt.

use std::{
    fs,
    hash::{Hash, Hasher},
    io,
    path::Path,
};

use siphasher::sip::SipHasher24;

/// Current schema version. Bump this when index field definitions change.
pub const SCHEMA_VERSION: u32 = 1;

/// File name of the fingerprint inside the index root.
pub const FINGERPRINT_FILENAME: &str = "fingerprint";

/// Settings that affect indexing and are included in the fingerprint.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct IndexFingerprint {
    /// Schema version.
    pub schema_version: u32,
    /// Stemmer language, lowercased.
    pub stemmer: String,
}

impl IndexFingerprint {
    /// Builds the fingerprint for the current schema and the given stemmer.
    pub fn new(stemmer: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            stemmer: stemmer.to_lowercase(),
        }
    }

    /// Computes the fingerprint as a hex string.
    pub fn hash_string(&self) -> String {
        let mut hasher = SipHasher24::new();
        self.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}

/// Reads the stored fingerprint, if any.
pub fn read_fingerprint(index_root: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(index_root.join(FINGERPRINT_FILENAME)) {
        Ok(contents) => Ok(Some(contents.trim().to_string())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Writes the fingerprint file.
pub fn write_fingerprint(index_root: &Path, fingerprint: &IndexFingerprint) -> io::Result<()> {
    fs::write(
        index_root.join(FINGERPRINT_FILENAME),
        format!("{}\n", fingerprint.hash_string()),
    )
}

#[cfg(test)]
mod test {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn stemmer_case_does_not_matter() {
        assert_eq!(
            IndexFingerprint::new("English").hash_string(),
            IndexFingerprint::new("english").hash_string()
        );
    }

    #[test]
    fn different_stemmer_changes_hash() {
        assert_ne!(
            IndexFingerprint::new("english").hash_string(),
            IndexFingerprint::new("french").hash_string()
        );
    }

    #[test]
    fn hash_is_sixteen_hex_chars() {
        let hash = IndexFingerprint::new("english").hash_string();
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn read_write_fingerprint() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_fingerprint(dir.path()).unwrap(), None);

        let fingerprint = IndexFingerprint::new("english");
        write_fingerprint(dir.path(), &fingerprint).unwrap();
        assert_eq!(
            read_fingerprint(dir.path()).unwrap(),
            Some(fingerprint.hash_string())
        );
    }
}
