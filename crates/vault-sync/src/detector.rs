//! Filesystem change detection.
//!
//! Every directory of the vault gets its own non-recursive watch, so a directory that
//! cannot be watched only loses its own subtree. Raw notify events cross from the
//! watcher thread into a bounded queue. When that queue is full, events are dropped
//! and the overflow flag is raised for the reconciler to answer with a full pass.

use std::{
    ffi::OsStr,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use notify::{
    Event, RecommendedWatcher, RecursiveMode, Watcher,
    event::{EventKind as NotifyKind, ModifyKind},
};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, trace, warn};
use vault_index::{FileStore, LocalFileStore};
use walkdir::WalkDir;

use crate::{
    SyncError, WatchSetupError,
    debounce::Debouncer,
    event::{EventKind, RawEvent},
};

/// Watches a vault and feeds raw events into a [`Debouncer`].
pub struct ChangeDetector {
    /// Signals the worker task to stop.
    shutdown: Option<oneshot::Sender<()>>,
    /// The worker task. Owns the watcher.
    task: JoinHandle<()>,
    /// Set when raw events were dropped.
    overflow: Arc<AtomicBool>,
}

impl ChangeDetector {
    /// Starts watching the store's root.
    pub fn start(
        store: Arc<LocalFileStore>,
        debouncer: Debouncer,
        queue_capacity: usize,
    ) -> Result<Self, SyncError> {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let overflow = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&overflow);
        let watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            if let Err(mpsc::error::TrySendError::Full(_)) = tx.try_send(result) {
                flag.store(true, Ordering::SeqCst);
            }
        })?;

        let mut worker = Worker {
            watcher,
            store,
            debouncer,
        };
        let root = worker.store.root().to_path_buf();
        worker.register_tree(&root);
        debug!(root = %root.display(), "change detector started");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(worker.run(rx, shutdown_rx));

        Ok(Self {
            shutdown: Some(shutdown_tx),
            task,
            overflow,
        })
    }

    /// Returns true, and clears the flag, if events were dropped since the last call.
    pub fn take_overflow(&self) -> bool {
        self.overflow.swap(false, Ordering::SeqCst)
    }

    /// Stops watching and releases every watch handle.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            if shutdown.send(()).is_err() {
                debug!("change detector already stopped");
            }
        }
        if let Err(e) = self.task.await {
            warn!(error = %e, "change detector task failed");
        }
    }
}

/// The detector task state.
struct Worker {
    /// The notify watcher. Dropping it releases all watches.
    watcher: RecommendedWatcher,
    /// Maps absolute paths to vault keys and filters them.
    store: Arc<LocalFileStore>,
    /// Destination of raw events.
    debouncer: Debouncer,
}

impl Worker {
    /// Processes notify events until shutdown.
    async fn run(
        mut self,
        mut events: mpsc::Receiver<notify::Result<Event>>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                received = events.recv() => match received {
                    Some(Ok(event)) => self.handle(&event),
                    Some(Err(e)) => warn!(error = %e, "watch error"),
                    None => break,
                },
            }
        }
        debug!("change detector stopped");
    }

    /// Translates one notify event into raw events.
    fn handle(&mut self, event: &Event) {
        let Some(kind) = map_kind(&event.kind) else {
            return;
        };
        for path in &event.paths {
            self.handle_path(path, kind);
        }
    }

    /// Filters and forwards one path.
    fn handle_path(&mut self, abs: &Path, kind: EventKind) {
        let Some(key) = self.store.key_for(abs) else {
            return;
        };
        if key.split('/').any(|part| part.starts_with('.')) {
            return;
        }

        if abs.is_dir() {
            if matches!(kind, EventKind::Created | EventKind::Renamed) {
                let files = self.register_tree(abs);
                self.forward(RawEvent::new(key, kind));
                for file in files {
                    self.forward(RawEvent::new(file, EventKind::Created));
                }
            }
            return;
        }

        // A removed path can no longer be classified, so it passes unfiltered.
        let removed = matches!(kind, EventKind::Deleted | EventKind::Renamed);
        if removed || self.store.is_supported(&key) {
            self.forward(RawEvent::new(key, kind));
        }
    }

    /// Hands an event to the debouncer.
    fn forward(&self, event: RawEvent) {
        trace!(path = %event.path, kind = %event.kind, "raw event");
        self.debouncer.feed(event);
    }

    /// Watches `dir` and every directory below it.
    ///
    /// Returns the supported files found on the way.
    fn register_tree(&mut self, dir: &Path) -> Vec<String> {
        let mut files = Vec::new();
        let mut walker = WalkDir::new(dir).follow_links(false).into_iter();

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            let file_type = entry.file_type();

            if entry.depth() > 0 && is_hidden(entry.file_name()) {
                if file_type.is_dir() {
                    walker.skip_current_dir();
                }
                continue;
            }

            if file_type.is_dir() {
                if let Err(source) = self.watcher.watch(entry.path(), RecursiveMode::NonRecursive) {
                    let err = WatchSetupError {
                        path: entry.path().to_path_buf(),
                        source,
                    };
                    warn!(error = %err, "skipping unwatchable subtree");
                    walker.skip_current_dir();
                }
            } else if file_type.is_file() {
                match self.store.key_for(entry.path()) {
                    Some(key) if self.store.doc_kind(&key).is_some() => files.push(key),
                    _ => {}
                }
            }
        }
        files
    }
}

/// Maps a notify event kind to a raw event kind. Access events are ignored.
fn map_kind(kind: &NotifyKind) -> Option<EventKind> {
    match kind {
        NotifyKind::Create(_) => Some(EventKind::Created),
        NotifyKind::Modify(ModifyKind::Name(_)) => Some(EventKind::Renamed),
        NotifyKind::Modify(_) | NotifyKind::Any => Some(EventKind::Modified),
        NotifyKind::Remove(_) => Some(EventKind::Deleted),
        NotifyKind::Access(_) | NotifyKind::Other => None,
    }
}

/// Checks if a filename represents a hidden file (starts with '.').
fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

#[cfg(test)]
mod test {
    use std::{fs, time::Duration};

    use notify::event::{AccessKind, CreateKind, DataChange, RemoveKind, RenameMode};
    use tempfile::TempDir;
    use tokio::time::timeout;

    use super::*;
    use crate::event::SettledEvent;

    #[test]
    fn maps_notify_kinds() {
        assert_eq!(
            map_kind(&NotifyKind::Create(CreateKind::File)),
            Some(EventKind::Created)
        );
        assert_eq!(
            map_kind(&NotifyKind::Modify(ModifyKind::Data(DataChange::Content))),
            Some(EventKind::Modified)
        );
        assert_eq!(
            map_kind(&NotifyKind::Modify(ModifyKind::Name(RenameMode::Both))),
            Some(EventKind::Renamed)
        );
        assert_eq!(
            map_kind(&NotifyKind::Remove(RemoveKind::File)),
            Some(EventKind::Deleted)
        );
        assert_eq!(map_kind(&NotifyKind::Access(AccessKind::Any)), None);
    }

    async fn next_settled(
        rx: &mut mpsc::UnboundedReceiver<SettledEvent>,
    ) -> Option<SettledEvent> {
        timeout(Duration::from_secs(10), rx.recv()).await.ok().flatten()
    }

    fn start(vault: &TempDir) -> (ChangeDetector, mpsc::UnboundedReceiver<SettledEvent>) {
        let store = Arc::new(LocalFileStore::new(
            vault.path(),
            &["md".to_string(), "txt".to_string()],
        ));
        let (debouncer, rx) = Debouncer::new(Duration::from_millis(100));
        let detector = ChangeDetector::start(store, debouncer, 1024).unwrap();
        (detector, rx)
    }

    #[tokio::test]
    async fn reports_created_file() {
        let vault = TempDir::new().unwrap();
        let (detector, mut rx) = start(&vault);

        fs::write(vault.path().join("note.md"), "hello").unwrap();

        let event = next_settled(&mut rx).await.expect("no event for note.md");
        assert_eq!(event.path, "note.md");
        detector.stop().await;
    }

    #[tokio::test]
    async fn ignores_hidden_and_unsupported_files() {
        let vault = TempDir::new().unwrap();
        let (detector, mut rx) = start(&vault);

        fs::write(vault.path().join(".hidden.md"), "x").unwrap();
        fs::write(vault.path().join("image.png"), "x").unwrap();
        fs::write(vault.path().join("marker.md"), "x").unwrap();

        let event = next_settled(&mut rx).await.expect("no event for marker.md");
        assert_eq!(event.path, "marker.md");
        detector.stop().await;
    }

    #[tokio::test]
    async fn watches_new_directories() {
        let vault = TempDir::new().unwrap();
        let (detector, mut rx) = start(&vault);

        fs::create_dir(vault.path().join("sub")).unwrap();
        let mut seen = Vec::new();
        while let Some(event) = next_settled(&mut rx).await {
            seen.push(event.path.clone());
            if event.path == "sub" {
                break;
            }
        }
        assert!(seen.contains(&"sub".to_string()));

        fs::write(vault.path().join("sub/inner.md"), "x").unwrap();
        let mut found = false;
        while let Some(event) = next_settled(&mut rx).await {
            if event.path == "sub/inner.md" {
                found = true;
                break;
            }
        }
        assert!(found, "no event for sub/inner.md");
        detector.stop().await;
    }
}
