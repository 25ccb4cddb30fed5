//! Configuration file parsing.
//!
//! Parses a `vault.toml` file into an intermediate [`RawConfig`] that keeps every
//! field optional, so defaults and environment overrides can be layered on top.

use std::{fs, path::Path};

use serde::Deserialize;
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional. This mirrors the TOML schema exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// `[vault]` section.
    pub vault: Option<RawVault>,
    /// `[index]` section.
    pub index: Option<RawIndex>,
    /// `[watch]` section.
    pub watch: Option<RawWatch>,
    /// `[commit]` section.
    pub commit: Option<RawCommit>,
    /// `[search]` section.
    pub search: Option<RawSearch>,
    /// `[logging]` section.
    pub logging: Option<RawLogging>,
}

/// Raw vault settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawVault {
    /// Path to the vault directory.
    pub path: Option<String>,
    /// File extensions to index.
    pub extensions: Option<Vec<String>>,
}

/// Raw index settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawIndex {
    /// Path to the index directory.
    pub path: Option<String>,
    /// Stemming language.
    pub stemmer: Option<String>,
    /// Memory budget for the index writer.
    pub writer_heap_bytes: Option<usize>,
}

/// Raw watch settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawWatch {
    /// Quiet period in milliseconds.
    pub debounce_ms: Option<u64>,
    /// Capacity of the raw event queue.
    pub queue_capacity: Option<usize>,
}

/// Raw commit batching settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawCommit {
    /// Maximum time between commits in milliseconds.
    pub interval_ms: Option<u64>,
    /// Maximum buffered changes before a commit is forced.
    pub max_changes: Option<usize>,
}

/// Raw search settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawSearch {
    /// Default number of results.
    pub default_limit: Option<usize>,
    /// Snippet length in characters.
    pub snippet_chars: Option<usize>,
    /// Query behavior during the startup reconciliation.
    pub startup: Option<String>,
}

/// Raw logging settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawLogging {
    /// Default log filter.
    pub level: Option<String>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context.
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_config() {
        let config = parse_config("").unwrap();
        assert!(config.vault.is_none());
        assert!(config.index.is_none());
    }

    #[test]
    fn parses_all_sections() {
        let config = parse_config(
            r#"
[vault]
path = "~/notes"
extensions = ["md", "pdf"]

[index]
path = "/var/lib/vault"
stemmer = "french"
writer_heap_bytes = 20000000

[watch]
debounce_ms = 500
queue_capacity = 16

[commit]
interval_ms = 2000
max_changes = 50

[search]
default_limit = 3
snippet_chars = 80
startup = "block"

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let vault = config.vault.unwrap();
        assert_eq!(vault.path.as_deref(), Some("~/notes"));
        assert_eq!(vault.extensions.unwrap(), vec!["md", "pdf"]);
        assert_eq!(config.index.unwrap().stemmer.as_deref(), Some("french"));
        assert_eq!(config.watch.unwrap().debounce_ms, Some(500));
        assert_eq!(config.commit.unwrap().max_changes, Some(50));
        assert_eq!(config.search.unwrap().startup.as_deref(), Some("block"));
        assert_eq!(config.logging.unwrap().level.as_deref(), Some("debug"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = parse_config("[watch]\ndebounce = 500\n");
        assert!(result.is_err());
    }

    #[test]
    fn parse_error_includes_path() {
        let err = parse_config_str("[vault\n", Path::new("/tmp/vault.toml")).unwrap_err();
        assert!(err.to_string().contains("/tmp/vault.toml"));
    }
}
