//! Keeps a vault index in line with the files on disk.
//!
//! Changes flow through three stages:
//! - [`ChangeDetector`] watches every directory of the vault and reports raw events.
//! - [`Debouncer`] coalesces bursts per path into one [`SettledEvent`].
//! - The reconciler loop re-reads each settled path from disk and updates the index.
//!
//! ```no_run
//! use vault_config::Config;
//! use vault_document::ContentExtractor;
//! use vault_index::{IndexManager, IndexOptions, LocalFileStore};
//! use vault_sync::{SyncSettings, spawn};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(&std::env::current_dir()?, None)?;
//! let manager = IndexManager::open(&IndexOptions::from_config(&config))?;
//! let store = LocalFileStore::new(&config.vault.root, &config.vault.extensions);
//! let handle = spawn(
//!     manager,
//!     store,
//!     ContentExtractor::new(),
//!     SyncSettings::from_config(&config),
//! );
//!
//! handle.wait_ready().await?;
//! handle.notify("inbox/today.md").await?;
//! handle.stop().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod debounce;
mod detector;
mod error;
mod event;
mod reconciler;

pub use debounce::{Debouncer, PendingChange};
pub use detector::ChangeDetector;
pub use error::{SyncError, WatchSetupError};
pub use event::{EventKind, RawEvent, SettledEvent};
pub use reconciler::{ReconcilerHandle, ReconcilerState, SyncSettings, spawn};
