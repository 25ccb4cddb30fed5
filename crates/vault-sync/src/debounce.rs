//! Per-path debouncing of raw change events.
//!
//! Each path has at most one [`PendingChange`]. Every raw event for the path resets
//! its timer and replaces its kind. Once a path has been quiet for the configured
//! period, one [`SettledEvent`] is emitted and the entry is dropped.

use std::{collections::HashMap, future, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{
    sync::{Notify, mpsc},
    time::{Instant, sleep_until},
};
use tracing::trace;

use crate::event::{EventKind, RawEvent, SettledEvent};

/// A change waiting for its quiet period to elapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    /// Vault-relative path.
    pub path: String,
    /// When the latest raw event for the path arrived.
    pub last_event_time: Instant,
    /// Kind of the latest raw event.
    pub event_kind: EventKind,
}

/// State shared between handles and the timer task.
struct Shared {
    /// Pending changes by path.
    pending: Mutex<HashMap<String, PendingChange>>,
    /// Wakes the timer task when a deadline may have moved earlier.
    wake: Notify,
    /// Quiet period.
    quiet: Duration,
    /// Output channel.
    settled: mpsc::UnboundedSender<SettledEvent>,
}

impl Shared {
    /// Removes and emits every entry whose deadline is at or before `now`.
    fn emit_due(&self, now: Instant) {
        let mut due: Vec<PendingChange> = {
            let mut pending = self.pending.lock();
            let paths: Vec<String> = pending
                .values()
                .filter(|change| change.last_event_time + self.quiet <= now)
                .map(|change| change.path.clone())
                .collect();
            paths
                .iter()
                .filter_map(|path| pending.remove(path))
                .collect()
        };
        self.emit(&mut due);
    }

    /// Sends changes in deadline order.
    fn emit(&self, changes: &mut [PendingChange]) {
        changes.sort_by(|a, b| {
            a.last_event_time
                .cmp(&b.last_event_time)
                .then_with(|| a.path.cmp(&b.path))
        });
        for change in changes.iter() {
            trace!(path = %change.path, kind = %change.event_kind, "settled");
            let event = SettledEvent {
                path: change.path.clone(),
                kind: change.event_kind,
            };
            if self.settled.send(event).is_err() {
                return;
            }
        }
    }

    /// Earliest pending deadline.
    fn next_deadline(&self) -> Option<Instant> {
        self.pending
            .lock()
            .values()
            .map(|change| change.last_event_time + self.quiet)
            .min()
    }
}

/// Coalesces raw events per path. Cheap to clone.
#[derive(Clone)]
pub struct Debouncer {
    /// Shared state.
    shared: Arc<Shared>,
}

impl Debouncer {
    /// Creates a debouncer and spawns its timer task on the current runtime.
    ///
    /// The task ends when the returned receiver is dropped.
    pub fn new(quiet: Duration) -> (Self, mpsc::UnboundedReceiver<SettledEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            pending: Mutex::new(HashMap::new()),
            wake: Notify::new(),
            quiet,
            settled: tx,
        });
        tokio::spawn(run_timer(Arc::clone(&shared)));
        (Self { shared }, rx)
    }

    /// Records a raw event.
    pub fn feed(&self, event: RawEvent) {
        let now = Instant::now();
        {
            let mut pending = self.shared.pending.lock();
            pending
                .entry(event.path.clone())
                .and_modify(|change| {
                    change.last_event_time = now;
                    change.event_kind = event.kind;
                })
                .or_insert_with(|| PendingChange {
                    path: event.path,
                    last_event_time: now,
                    event_kind: event.kind,
                });
        }
        self.shared.wake.notify_one();
    }

    /// Emits every pending change immediately.
    pub fn flush(&self) {
        let mut all: Vec<PendingChange> = self
            .shared
            .pending
            .lock()
            .drain()
            .map(|(_, change)| change)
            .collect();
        self.shared.emit(&mut all);
    }

    /// Number of paths waiting to settle.
    pub fn len(&self) -> usize {
        self.shared.pending.lock().len()
    }

    /// Returns true if nothing is waiting to settle.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sleeps until the next deadline, emits due entries, repeats.
async fn run_timer(shared: Arc<Shared>) {
    loop {
        let deadline = shared.next_deadline();
        tokio::select! {
            () = shared.settled.closed() => return,
            () = shared.wake.notified() => {}
            () = wait_for(deadline) => shared.emit_due(Instant::now()),
        }
    }
}

/// Sleeps until `deadline`, or forever when there is none.
async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}
