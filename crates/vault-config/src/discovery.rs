//! Configuration file discovery.
//!
//! Finds `vault.toml` by walking up the directory tree from a starting point.

use std::path::{Path, PathBuf};

/// The configuration filename.
pub const CONFIG_FILENAME: &str = "vault.toml";

/// Returns the closest `vault.toml` at or above `cwd`.
///
/// Returns `None` when no directory between `cwd` and the filesystem root holds one.
pub fn discover_config_file(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestDir;

    #[test]
    fn finds_config_in_start_directory() {
        let test_dir = TestDir::new();
        let config = test_dir.create_config("");

        assert_eq!(discover_config_file(test_dir.path()), Some(config));
    }

    #[test]
    fn walks_up_to_parent() {
        let test_dir = TestDir::new();
        let config = test_dir.create_config("");
        let subdir = test_dir.create_dir("a/b/c");

        assert_eq!(discover_config_file(&subdir), Some(config));
    }

    #[test]
    fn closest_config_wins() {
        let test_dir = TestDir::new();
        test_dir.create_config("");
        let inner = test_dir.create_config("a/b");
        let subdir = test_dir.create_dir("a/b/c");

        assert_eq!(discover_config_file(&subdir), Some(inner));
    }

    #[test]
    fn directory_named_like_config_is_ignored() {
        let test_dir = TestDir::new();
        let fake = test_dir.create_dir(&format!("x/{CONFIG_FILENAME}"));
        let found = discover_config_file(fake.parent().unwrap());

        assert_ne!(found, Some(fake));
    }
}
