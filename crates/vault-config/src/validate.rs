//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::fmt;

use crate::Config;

/// Stemmer names accepted by the index analyzer.
const KNOWN_STEMMERS: &[&str] = &[
    "arabic",
    "danish",
    "dutch",
    "english",
    "finnish",
    "french",
    "german",
    "greek",
    "hungarian",
    "italian",
    "norwegian",
    "portuguese",
    "romanian",
    "russian",
    "spanish",
    "swedish",
    "tamil",
    "turkish",
];

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The vault root does not exist.
    VaultPathMissing {
        /// Path that doesn't exist.
        path: String,
    },
    /// The vault root exists but is not a directory.
    VaultPathNotDirectory {
        /// Path that is not a directory.
        path: String,
    },
    /// No file extensions are configured, so nothing will be indexed.
    NoExtensions,
    /// A zero debounce emits one settled event per raw event.
    ZeroDebounce,
    /// A zero commit batch commits after every change.
    ZeroCommitBatch,
    /// The stemmer name is not recognized; opening the index will fail.
    UnknownStemmer {
        /// The configured name.
        name: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VaultPathMissing { path } => write!(f, "vault path does not exist: {path}"),
            Self::VaultPathNotDirectory { path } => {
                write!(f, "vault path is not a directory: {path}")
            }
            Self::NoExtensions => write!(f, "no file extensions configured"),
            Self::ZeroDebounce => write!(f, "watch.debounce_ms is 0, edits will not coalesce"),
            Self::ZeroCommitBatch => {
                write!(f, "commit.max_changes is 0, every change commits")
            }
            Self::UnknownStemmer { name } => write!(f, "unknown stemmer language: {name}"),
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    let root = &config.vault.root;
    if !root.exists() {
        warnings.push(ConfigWarning::VaultPathMissing {
            path: root.display().to_string(),
        });
    } else if !root.is_dir() {
        warnings.push(ConfigWarning::VaultPathNotDirectory {
            path: root.display().to_string(),
        });
    }

    if config.vault.extensions.is_empty() {
        warnings.push(ConfigWarning::NoExtensions);
    }
    if config.watch.debounce.is_zero() {
        warnings.push(ConfigWarning::ZeroDebounce);
    }
    if config.commit.max_changes == 0 {
        warnings.push(ConfigWarning::ZeroCommitBatch);
    }

    let stemmer = config.index.stemmer.to_lowercase();
    if !KNOWN_STEMMERS.contains(&stemmer.as_str()) {
        warnings.push(ConfigWarning::UnknownStemmer {
            name: config.index.stemmer.clone(),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{EnvOverrides, RawConfig, test_support::TestDir};

    fn config_in(dir: &TestDir) -> Config {
        Config::from_raw(RawConfig::default(), dir.path(), None, &EnvOverrides::default())
            .unwrap()
    }

    #[test]
    fn default_config_has_no_warnings() {
        let dir = TestDir::new();
        assert!(config_in(&dir).validate().is_empty());
    }

    #[test]
    fn missing_vault_is_reported() {
        let dir = TestDir::new();
        let mut config = config_in(&dir);
        config.vault.root = dir.path().join("gone");

        let warnings = config.validate();
        assert!(matches!(
            warnings.as_slice(),
            [ConfigWarning::VaultPathMissing { .. }]
        ));
    }

    #[test]
    fn file_as_vault_is_reported() {
        let dir = TestDir::new();
        let mut config = config_in(&dir);
        config.vault.root = dir.create_file("notes.md");

        assert!(matches!(
            config.validate().as_slice(),
            [ConfigWarning::VaultPathNotDirectory { .. }]
        ));
    }

    #[test]
    fn zero_values_and_unknown_stemmer_are_reported() {
        let dir = TestDir::new();
        let mut config = config_in(&dir);
        config.watch.debounce = Duration::ZERO;
        config.commit.max_changes = 0;
        config.index.stemmer = "klingon".into();
        config.vault.extensions.clear();

        let warnings = config.validate();
        assert!(warnings.contains(&ConfigWarning::ZeroDebounce));
        assert!(warnings.contains(&ConfigWarning::ZeroCommitBatch));
        assert!(warnings.contains(&ConfigWarning::NoExtensions));
        assert!(warnings.contains(&ConfigWarning::UnknownStemmer {
            name: "klingon".into()
        }));
    }

    #[test]
    fn warnings_display_readably() {
        let warning = ConfigWarning::UnknownStemmer {
            name: "klingon".into(),
        };
        assert_eq!(warning.to_string(), "unknown stemmer language: klingon");
    }
}
