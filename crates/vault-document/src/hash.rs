//! Content hashing.

use sha2::{Digest, Sha256};

/// Returns the lowercase hex SHA-256 digest of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_digest() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn differs_on_single_byte() {
        assert_ne!(content_hash(b"note"), content_hash(b"notes"));
        assert_eq!(content_hash(b"note").len(), 64);
    }
}
