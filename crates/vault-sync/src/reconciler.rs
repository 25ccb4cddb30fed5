//! The reconciler loop.
//!
//! One task owns the [`IndexManager`]. It starts the change detector, reconciles the
//! whole vault once, and then applies settled events one at a time. Index work runs on
//! the blocking pool; the manager moves into each blocking call and back out of it.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::{self, JoinHandle},
    time::{self, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};
use vault_config::{Config, StartupPolicy};
use vault_document::ContentExtractor;
use vault_index::{
    IndexError, IndexManager, IndexReaderHandle, IndexSnapshot, IndexStats, LocalFileStore,
};

use crate::{
    SyncError,
    debounce::Debouncer,
    detector::ChangeDetector,
    event::SettledEvent,
};

/// Depth of the command queue between handles and the loop.
const COMMAND_CAPACITY: usize = 64;

/// Lifecycle of the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerState {
    /// The task has been spawned.
    Starting,
    /// Crash recovery and the startup pass are running.
    Reconciling,
    /// Settled events are being applied.
    Watching,
    /// The loop has exited.
    Stopped,
}

impl ReconcilerState {
    /// Returns the lowercase name of this state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Reconciling => "reconciling",
            Self::Watching => "watching",
            Self::Stopped => "stopped",
        }
    }
}

/// Timing and batching for the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// Quiet period before a path settles.
    pub debounce: Duration,
    /// Capacity of the raw event queue.
    pub queue_capacity: usize,
    /// Buffered changes are committed at least this often.
    pub commit_interval: Duration,
    /// Buffered changes are committed once this many paths are pending.
    pub max_changes: usize,
    /// Query behavior before the startup pass completes.
    pub startup: StartupPolicy,
}

impl SyncSettings {
    /// Reads settings from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            debounce: config.watch.debounce,
            queue_capacity: config.watch.queue_capacity,
            commit_interval: config.commit.interval,
            max_changes: config.commit.max_changes,
            startup: config.search.startup,
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            queue_capacity: 4096,
            commit_interval: Duration::from_secs(1),
            max_changes: 200,
            startup: StartupPolicy::Stale,
        }
    }
}

/// Requests sent from handles to the loop.
enum Command {
    /// Sync one path and commit.
    Notify {
        /// Vault-relative path.
        path: String,
        /// Receives the outcome.
        ack: oneshot::Sender<Result<IndexStats, SyncError>>,
    },
    /// Run a full reconciliation pass.
    Reindex {
        /// Receives the outcome.
        ack: oneshot::Sender<Result<IndexStats, SyncError>>,
    },
    /// Drain pending events and exit.
    Stop,
}

/// Starts the reconciler on the current tokio runtime.
pub fn spawn(
    manager: IndexManager,
    store: LocalFileStore,
    extractor: ContentExtractor,
    settings: SyncSettings,
) -> ReconcilerHandle {
    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CAPACITY);
    let (state_tx, state_rx) = watch::channel(ReconcilerState::Starting);
    let (debouncer, settled) = Debouncer::new(settings.debounce);
    let reader = manager.reader();

    let reconciler = Reconciler {
        manager: Some(manager),
        store: Arc::new(store),
        extractor,
        settings,
        state: state_tx,
    };
    let task = tokio::spawn(reconciler.run(commands_rx, debouncer.clone(), settled));

    ReconcilerHandle {
        commands: commands_tx,
        state: state_rx,
        reader,
        debouncer,
        startup: settings.startup,
        task: Arc::new(Mutex::new(Some(task))),
    }
}

/// Controls a running reconciler. Cheap to clone.
#[derive(Clone)]
pub struct ReconcilerHandle {
    /// Command queue into the loop.
    commands: mpsc::Sender<Command>,
    /// Published lifecycle state.
    state: watch::Receiver<ReconcilerState>,
    /// Query access to committed snapshots.
    reader: IndexReaderHandle,
    /// For queue depth reporting.
    debouncer: Debouncer,
    /// Query behavior before the startup pass completes.
    startup: StartupPolicy,
    /// The loop task, taken by the first `stop`.
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ReconcilerHandle {
    /// Syncs `path` from disk and commits before returning.
    ///
    /// A search issued after this returns observes the file's current state.
    pub async fn notify(&self, path: impl Into<String>) -> Result<IndexStats, SyncError> {
        let (ack, rx) = oneshot::channel();
        self.send(Command::Notify {
            path: path.into(),
            ack,
        })
        .await?;
        rx.await.map_err(|_| SyncError::Stopped)?
    }

    /// Runs a full reconciliation pass and commits.
    pub async fn reindex(&self) -> Result<IndexStats, SyncError> {
        let (ack, rx) = oneshot::channel();
        self.send(Command::Reindex { ack }).await?;
        rx.await.map_err(|_| SyncError::Stopped)?
    }

    /// Processes every pending event, commits, releases the watch and waits for the
    /// loop to exit.
    pub async fn stop(&self) -> Result<(), SyncError> {
        if self.commands.send(Command::Stop).await.is_err() {
            debug!("reconciler already stopped");
        }
        let task = self.task.lock().take();
        match task {
            Some(task) => task.await.map_err(|e| SyncError::Task(e.to_string())),
            None => Ok(()),
        }
    }

    /// Waits until the startup pass has completed.
    pub async fn wait_ready(&self) -> Result<(), SyncError> {
        match self.settled_state().await {
            ReconcilerState::Watching => Ok(()),
            _ => Err(SyncError::Stopped),
        }
    }

    /// Waits until the loop has exited.
    pub async fn stopped(&self) {
        let mut state = self.state.clone();
        if state
            .wait_for(|s| *s == ReconcilerState::Stopped)
            .await
            .is_err()
        {
            debug!("reconciler state channel closed");
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReconcilerState {
        *self.state.borrow()
    }

    /// Returns a snapshot for querying.
    ///
    /// With the `block` startup policy this waits for the startup pass first.
    pub async fn snapshot(&self) -> IndexSnapshot {
        if self.startup == StartupPolicy::Block {
            self.settled_state().await;
        }
        self.reader.snapshot()
    }

    /// Query access that never waits.
    pub fn reader(&self) -> &IndexReaderHandle {
        &self.reader
    }

    /// Number of paths waiting out their quiet period.
    pub fn pending_events(&self) -> usize {
        self.debouncer.len()
    }

    /// Queues a command.
    async fn send(&self, command: Command) -> Result<(), SyncError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SyncError::Stopped)
    }

    /// Waits for a state past startup and returns it.
    async fn settled_state(&self) -> ReconcilerState {
        let mut state = self.state.clone();
        let reached = state
            .wait_for(|s| matches!(s, ReconcilerState::Watching | ReconcilerState::Stopped))
            .await
            .map(|s| *s);
        reached.unwrap_or(ReconcilerState::Stopped)
    }
}

/// State owned by the loop task.
struct Reconciler {
    /// `None` only while a blocking call holds it.
    manager: Option<IndexManager>,
    /// The vault on disk.
    store: Arc<LocalFileStore>,
    /// Turns file bytes into documents.
    extractor: ContentExtractor,
    /// Timing and batching.
    settings: SyncSettings,
    /// Lifecycle publisher.
    state: watch::Sender<ReconcilerState>,
}

impl Reconciler {
    /// Runs until stopped or a fatal error.
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        debouncer: Debouncer,
        mut settled: mpsc::UnboundedReceiver<SettledEvent>,
    ) {
        match ChangeDetector::start(
            Arc::clone(&self.store),
            debouncer.clone(),
            self.settings.queue_capacity,
        ) {
            Ok(detector) => {
                self.set_state(ReconcilerState::Reconciling);
                if self.startup().await {
                    self.set_state(ReconcilerState::Watching);
                    info!(root = %self.store.root().display(), "watching vault");
                    self.watch(&mut commands, &debouncer, &mut settled, &detector)
                        .await;
                }
                detector.stop().await;
            }
            Err(e) => error!(error = %e, "cannot start change detector"),
        }
        self.set_state(ReconcilerState::Stopped);
        info!("reconciler stopped");
    }

    /// Crash recovery followed by a full pass. Returns false if the loop must stop.
    async fn startup(&mut self) -> bool {
        let recovered = match &self.manager {
            Some(manager) => manager.open_report().recovered_paths.clone(),
            None => return false,
        };
        if !recovered.is_empty() {
            info!(paths = recovered.len(), "re-syncing paths from interrupted batch");
        }
        for path in recovered {
            let result = self.sync_path(path, true).await;
            if report(&result, "recovery") {
                return false;
            }
        }

        let result = self.rebuild().await;
        !report(&result, "startup reconciliation")
    }

    /// The steady-state loop.
    async fn watch(
        &mut self,
        commands: &mut mpsc::Receiver<Command>,
        debouncer: &Debouncer,
        settled: &mut mpsc::UnboundedReceiver<SettledEvent>,
        detector: &ChangeDetector,
    ) {
        let mut ticker = time::interval(self.settings.commit_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Notify { path, ack }) => {
                        let result = self.sync_path(path, true).await;
                        if reply(ack, result) {
                            return;
                        }
                    }
                    Some(Command::Reindex { ack }) => {
                        let result = self.rebuild().await;
                        if reply(ack, result) {
                            return;
                        }
                    }
                    Some(Command::Stop) | None => {
                        self.drain(debouncer, settled).await;
                        return;
                    }
                },
                Some(event) = settled.recv() => {
                    if report(&self.apply(event).await, "sync") {
                        return;
                    }
                }
                _ = ticker.tick() => {
                    let result = if detector.take_overflow() {
                        warn!("raw event queue overflowed, reconciling the whole vault");
                        self.rebuild().await
                    } else {
                        self.commit().await
                    };
                    if report(&result, "periodic commit") {
                        return;
                    }
                }
            }
        }
    }

    /// Applies every pending event and commits.
    async fn drain(
        &mut self,
        debouncer: &Debouncer,
        settled: &mut mpsc::UnboundedReceiver<SettledEvent>,
    ) {
        debouncer.flush();
        while let Ok(event) = settled.try_recv() {
            if report(&self.apply(event).await, "sync") {
                return;
            }
        }
        report(&self.commit().await, "final commit");
    }

    /// Syncs a settled path.
    async fn apply(&mut self, event: SettledEvent) -> Result<IndexStats, SyncError> {
        debug!(path = %event.path, kind = %event.kind, "applying change");
        self.sync_path(event.path, false).await
    }

    /// Syncs one path, committing when `commit` is set or the batch is full.
    async fn sync_path(&mut self, path: String, commit: bool) -> Result<IndexStats, SyncError> {
        let max_changes = self.settings.max_changes.max(1);
        self.blocking(move |manager, store, extractor| {
            let stats = manager.sync_path(store, extractor, &path)?;
            if commit || manager.pending_len() >= max_changes {
                manager.commit()?;
            }
            Ok(stats)
        })
        .await
    }

    /// Reconciles the whole vault.
    async fn rebuild(&mut self) -> Result<IndexStats, SyncError> {
        let batch_size = self.settings.max_changes;
        self.blocking(move |manager, store, extractor| {
            manager.rebuild_from(store, extractor, batch_size)
        })
        .await
    }

    /// Commits whatever is buffered.
    async fn commit(&mut self) -> Result<IndexStats, SyncError> {
        self.blocking(|manager, _, _| {
            manager.commit()?;
            Ok(IndexStats::default())
        })
        .await
    }

    /// Runs `f` against the manager on the blocking pool.
    async fn blocking<T, F>(&mut self, f: F) -> Result<T, SyncError>
    where
        T: Send + 'static,
        F: FnOnce(&mut IndexManager, &LocalFileStore, &ContentExtractor) -> Result<T, IndexError>
            + Send
            + 'static,
    {
        let Some(mut manager) = self.manager.take() else {
            return Err(SyncError::Stopped);
        };
        let store = Arc::clone(&self.store);
        let extractor = self.extractor.clone();

        let joined = task::spawn_blocking(move || {
            let result = f(&mut manager, store.as_ref(), &extractor);
            (manager, result)
        })
        .await;

        match joined {
            Ok((manager, result)) => {
                self.manager = Some(manager);
                result.map_err(SyncError::from)
            }
            Err(e) => Err(SyncError::Task(e.to_string())),
        }
    }

    /// Publishes a lifecycle state.
    fn set_state(&self, state: ReconcilerState) {
        debug!(state = state.as_str(), "reconciler state");
        self.state.send_replace(state);
    }
}

/// Sends a command result. Returns true if the loop must stop.
fn reply(
    ack: oneshot::Sender<Result<IndexStats, SyncError>>,
    result: Result<IndexStats, SyncError>,
) -> bool {
    let fatal = report(&result, "request");
    if ack.send(result).is_err() {
        debug!("requester went away");
    }
    fatal
}

/// Logs a failed operation. Returns true if the loop must stop.
fn report<T>(result: &Result<T, SyncError>, operation: &str) -> bool {
    match result {
        Ok(_) => false,
        Err(e) if e.is_fatal() => {
            error!(error = %e, operation, "index store failure, stopping reconciler");
            true
        }
        Err(e) => {
            error!(error = %e, operation, "operation failed");
            false
        }
    }
}
