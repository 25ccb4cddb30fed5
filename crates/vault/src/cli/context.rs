//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use vault_config::Config;
use vault_index::{
    IndexManager, IndexOptions, IndexReaderHandle, IndexStatus, LocalFileStore, QueryEngine,
    detect_index_status, open_reader,
};

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration.
    pub config: Config,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = Config::load(&cwd, explicit).map_err(|e| {
            eprintln!("error: failed to load configuration: {e}");
            ExitCode::FAILURE
        })?;
        Ok(Self { cwd, config })
    }

    /// Index settings from the configuration.
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions::from_config(&self.config)
    }

    /// The vault as a file store.
    pub fn store(&self) -> LocalFileStore {
        LocalFileStore::new(&self.config.vault.root, &self.config.vault.extensions)
    }

    /// Fails unless the vault root is an existing directory.
    pub fn require_vault(&self) -> Result<(), ExitCode> {
        let root = &self.config.vault.root;
        if root.is_dir() {
            return Ok(());
        }
        eprintln!("error: vault path is not a directory: {}", root.display());
        if self.config.config_path.is_none() {
            eprintln!("Run 'vault init' to create a configuration file.");
        }
        Err(ExitCode::FAILURE)
    }

    /// Opens the index for writing, wiping it first when `fresh` is set.
    pub fn open_manager(&self, fresh: bool) -> Result<IndexManager, ExitCode> {
        let options = self.index_options();
        let opened = if fresh {
            IndexManager::open_fresh(&options)
        } else {
            IndexManager::open(&options)
        };
        opened.map_err(|e| {
            eprintln!("error: failed to open index: {e}");
            ExitCode::FAILURE
        })
    }

    /// Opens the committed index for querying.
    pub fn open_reader(&self) -> Result<IndexReaderHandle, ExitCode> {
        let options = self.index_options();
        match detect_index_status(&options) {
            IndexStatus::Current => {}
            IndexStatus::RecoveryPending => {
                eprintln!("warning: an interrupted batch is pending; run 'vault index' to recover");
            }
            status @ (IndexStatus::Missing | IndexStatus::FingerprintChanged) => {
                eprintln!(
                    "error: index is {} at {}",
                    status.description(),
                    options.root.display()
                );
                eprintln!("Run 'vault index' to build it.");
                return Err(ExitCode::FAILURE);
            }
        }
        open_reader(&options).map_err(|e| {
            eprintln!("error: failed to open index: {e}");
            ExitCode::FAILURE
        })
    }

    /// A query engine matching the index analyzer.
    pub fn query_engine(&self) -> Result<QueryEngine, ExitCode> {
        QueryEngine::from_config(&self.config).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })
    }
}

/// Returns the current working directory or exits with a consistent error.
pub fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}
