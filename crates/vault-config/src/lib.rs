//! Configuration system for vault.
//!
//! vault reads a single TOML file named `vault.toml`. The file is found by walking up the
//! directory tree from the current working directory (the closest file wins), or given
//! explicitly. Every setting has a default, so running without a file is valid. The
//! `VAULT_PATH` and `VAULT_INDEX_PATH` environment variables override the file.

#![warn(missing_docs)]

mod discovery;
mod error;
mod parse;
mod resolve;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

pub use discovery::{CONFIG_FILENAME, discover_config_file};
pub use error::ConfigError;
pub use parse::{
    RawCommit, RawConfig, RawIndex, RawLogging, RawSearch, RawVault, RawWatch,
    parse_config_file, parse_config_str,
};
pub use resolve::resolve_path;
pub use templates::init_template;
pub use validate::ConfigWarning;
use validate::validate_config;

/// Environment variable overriding the vault root.
pub const VAULT_PATH_ENV: &str = "VAULT_PATH";

/// Environment variable overriding the index root.
pub const INDEX_PATH_ENV: &str = "VAULT_INDEX_PATH";

/// Default index location relative to the config directory.
const DEFAULT_INDEX_DIR: &str = ".vault/index";

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Vault location and file selection.
    pub vault: VaultSettings,
    /// Index location and analysis.
    pub index: IndexSettings,
    /// Change detection and debouncing.
    pub watch: WatchSettings,
    /// Commit batching.
    pub commit: CommitSettings,
    /// Query behavior.
    pub search: SearchSettings,
    /// Log output.
    pub logging: LoggingSettings,
    /// The file this configuration was loaded from, if any.
    pub config_path: Option<PathBuf>,
}

/// Vault location and the set of indexed file extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultSettings {
    /// Absolute path of the vault root.
    pub root: PathBuf,
    /// Lowercase extensions without a leading dot.
    pub extensions: Vec<String>,
}

/// Index location and analyzer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSettings {
    /// Absolute path of the index directory.
    pub root: PathBuf,
    /// Stemming language name.
    pub stemmer: String,
    /// Memory budget handed to the index writer.
    pub writer_heap_bytes: usize,
}

/// Change detection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSettings {
    /// Quiet period before a path's pending change is emitted.
    pub debounce: Duration,
    /// Capacity of the raw event queue.
    pub queue_capacity: usize,
}

/// Commit batching settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSettings {
    /// Longest time buffered changes wait before a commit.
    pub interval: Duration,
    /// Buffered change count that forces a commit.
    pub max_changes: usize,
}

/// Query settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    /// Result count used when the caller gives none.
    pub default_limit: usize,
    /// Snippet window length in characters.
    pub snippet_chars: usize,
    /// Query behavior while the startup reconciliation runs.
    pub startup: StartupPolicy,
}

/// How queries behave before the first reconciliation completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartupPolicy {
    /// Serve the last committed snapshot.
    #[default]
    Stale,
    /// Wait until the index is reconciled.
    Block,
}

impl StartupPolicy {
    /// Parses a policy name.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name {
            "stale" => Ok(Self::Stale),
            "block" => Ok(Self::Block),
            other => Err(ConfigError::InvalidValue {
                key: "search.startup".into(),
                message: format!("expected \"stale\" or \"block\", got \"{other}\""),
            }),
        }
    }

    /// Returns the configuration name of this policy.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stale => "stale",
            Self::Block => "block",
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default `tracing` filter directive.
    pub level: String,
}

/// Path overrides taken from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// Value of `VAULT_PATH`.
    pub vault_path: Option<String>,
    /// Value of `VAULT_INDEX_PATH`.
    pub index_path: Option<String>,
}

impl EnvOverrides {
    /// Reads overrides from the process environment. Empty values are ignored.
    pub fn from_env() -> Self {
        let read = |key: &str| env::var(key).ok().filter(|value| !value.is_empty());
        Self {
            vault_path: read(VAULT_PATH_ENV),
            index_path: read(INDEX_PATH_ENV),
        }
    }
}

impl Config {
    /// Loads configuration for a working directory.
    ///
    /// Uses `explicit` when given, otherwise the closest `vault.toml` at or above `cwd`.
    /// Environment overrides are read from the process environment.
    pub fn load(cwd: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(cwd, explicit, &EnvOverrides::from_env())
    }

    /// Loads configuration with the given environment overrides.
    pub fn load_with_env(
        cwd: &Path,
        explicit: Option<&Path>,
        env: &EnvOverrides,
    ) -> Result<Self, ConfigError> {
        let config_path = match explicit {
            Some(path) => Some(resolve_path(&path.to_string_lossy(), cwd)?),
            None => discover_config_file(cwd).map(|path| path.canonicalize().unwrap_or(path)),
        };

        match config_path {
            Some(path) => {
                let raw = parse_config_file(&path)?;
                let base = path.parent().unwrap_or(cwd).to_path_buf();
                Self::from_raw(raw, &base, Some(path), env)
            }
            None => Self::from_raw(RawConfig::default(), cwd, None, env),
        }
    }

    /// Builds a configuration from parsed values, resolving paths against `base_dir`.
    pub fn from_raw(
        raw: RawConfig,
        base_dir: &Path,
        config_path: Option<PathBuf>,
        env: &EnvOverrides,
    ) -> Result<Self, ConfigError> {
        let vault = raw.vault.unwrap_or_default();
        let index = raw.index.unwrap_or_default();
        let watch = raw.watch.unwrap_or_default();
        let commit = raw.commit.unwrap_or_default();
        let search = raw.search.unwrap_or_default();
        let logging = raw.logging.unwrap_or_default();

        let vault_path = env
            .vault_path
            .clone()
            .or(vault.path)
            .unwrap_or_else(|| ".".into());
        let index_path = env
            .index_path
            .clone()
            .or(index.path)
            .unwrap_or_else(|| DEFAULT_INDEX_DIR.into());

        let extensions = vault
            .extensions
            .unwrap_or_else(default_extensions)
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        let startup = match search.startup {
            Some(name) => StartupPolicy::parse(&name)?,
            None => StartupPolicy::default(),
        };

        Ok(Self {
            vault: VaultSettings {
                root: resolve_path(&vault_path, base_dir)?,
                extensions,
            },
            index: IndexSettings {
                root: resolve_path(&index_path, base_dir)?,
                stemmer: index.stemmer.unwrap_or_else(|| "english".into()),
                writer_heap_bytes: index.writer_heap_bytes.unwrap_or(50_000_000),
            },
            watch: WatchSettings {
                debounce: Duration::from_millis(watch.debounce_ms.unwrap_or(300)),
                queue_capacity: watch.queue_capacity.unwrap_or(4096),
            },
            commit: CommitSettings {
                interval: Duration::from_millis(commit.interval_ms.unwrap_or(1000)),
                max_changes: commit.max_changes.unwrap_or(200),
            },
            search: SearchSettings {
                default_limit: search.default_limit.unwrap_or(10),
                snippet_chars: search.snippet_chars.unwrap_or(200),
                startup,
            },
            logging: LoggingSettings {
                level: logging.level.unwrap_or_else(|| "info".into()),
            },
            config_path,
        })
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }
}

/// Extensions indexed when the config names none.
fn default_extensions() -> Vec<String> {
    ["md", "markdown", "txt", "pdf"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestDir;

    fn no_env() -> EnvOverrides {
        EnvOverrides::default()
    }

    #[test]
    fn defaults_without_config_file() {
        let dir = TestDir::new();
        let config = Config::load_with_env(dir.path(), None, &no_env()).unwrap();

        let root = dir.path().canonicalize().unwrap();
        assert!(config.config_path.is_none());
        assert_eq!(config.vault.root, root);
        assert_eq!(config.index.root, root.join(".vault/index"));
        assert_eq!(config.vault.extensions, vec!["md", "markdown", "txt", "pdf"]);
        assert_eq!(config.index.stemmer, "english");
        assert_eq!(config.watch.debounce, Duration::from_millis(300));
        assert_eq!(config.watch.queue_capacity, 4096);
        assert_eq!(config.commit.interval, Duration::from_secs(1));
        assert_eq!(config.commit.max_changes, 200);
        assert_eq!(config.search.default_limit, 10);
        assert_eq!(config.search.snippet_chars, 200);
        assert_eq!(config.search.startup, StartupPolicy::Stale);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn discovered_file_resolves_relative_to_its_directory() {
        let dir = TestDir::new();
        dir.create_dir("notes");
        dir.create_config_with_content("", "[vault]\npath = \"notes\"\n");
        let nested = dir.create_dir("notes/deep");

        let config = Config::load_with_env(&nested, None, &no_env()).unwrap();

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.vault.root, root.join("notes"));
        assert_eq!(config.index.root, root.join(".vault/index"));
        assert_eq!(config.config_path, Some(root.join(CONFIG_FILENAME)));
    }

    #[test]
    fn explicit_file_wins_over_discovery() {
        let dir = TestDir::new();
        dir.create_config_with_content("", "[search]\ndefault_limit = 1\n");
        let other = dir.create_config_with_content("other", "[search]\ndefault_limit = 7\n");

        let config = Config::load_with_env(dir.path(), Some(&other), &no_env()).unwrap();
        assert_eq!(config.search.default_limit, 7);
    }

    #[test]
    fn environment_overrides_file_paths() {
        let dir = TestDir::new();
        dir.create_config_with_content("", "[vault]\npath = \"a\"\n[index]\npath = \"b\"\n");
        let env = EnvOverrides {
            vault_path: Some("elsewhere".into()),
            index_path: Some("/srv/index".into()),
        };

        let config = Config::load_with_env(dir.path(), None, &env).unwrap();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.vault.root, root.join("elsewhere"));
        assert_eq!(config.index.root, PathBuf::from("/srv/index"));
    }

    #[test]
    fn extensions_are_normalized() {
        let dir = TestDir::new();
        dir.create_config_with_content("", "[vault]\nextensions = [\".MD\", \"Txt\", \"\"]\n");

        let config = Config::load_with_env(dir.path(), None, &no_env()).unwrap();
        assert_eq!(config.vault.extensions, vec!["md", "txt"]);
    }

    #[test]
    fn invalid_startup_policy_is_an_error() {
        let dir = TestDir::new();
        dir.create_config_with_content("", "[search]\nstartup = \"eventually\"\n");

        let err = Config::load_with_env(dir.path(), None, &no_env()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn startup_policy_names_round_trip() {
        for policy in [StartupPolicy::Stale, StartupPolicy::Block] {
            assert_eq!(StartupPolicy::parse(policy.as_str()).unwrap(), policy);
        }
    }
}
