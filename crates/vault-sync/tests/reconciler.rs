//! Integration tests for the reconciler loop against a real filesystem watch.

#![allow(clippy::tests_outside_test_module)]

use std::{fs, future::Future, path::Path, time::Duration};

use tempfile::TempDir;
use tokio::time::{sleep, timeout};
use vault_config::StartupPolicy;
use vault_document::ContentExtractor;
use vault_index::{IndexManager, IndexOptions, LocalFileStore, QueryEngine};
use vault_sync::{ReconcilerHandle, ReconcilerState, SyncSettings, spawn};

/// Generous upper bound for anything that depends on the OS watcher.
const WATCH_TIMEOUT: Duration = Duration::from_secs(10);

struct Fixture {
    vault: TempDir,
    _index: TempDir,
    handle: ReconcilerHandle,
}

fn write(root: &Path, path: &str, contents: &str) {
    let abs = root.join(path);
    fs::create_dir_all(abs.parent().unwrap()).unwrap();
    fs::write(abs, contents).unwrap();
}

fn settings(debounce: Duration) -> SyncSettings {
    SyncSettings {
        debounce,
        commit_interval: Duration::from_millis(100),
        ..SyncSettings::default()
    }
}

/// Starts a reconciler over a vault seeded with `files`.
fn start(files: &[(&str, &str)], settings: SyncSettings) -> Fixture {
    let vault = TempDir::new().unwrap();
    let index = TempDir::new().unwrap();
    for (path, contents) in files {
        write(vault.path(), path, contents);
    }

    let manager = IndexManager::open(&IndexOptions::new(index.path())).unwrap();
    let store = LocalFileStore::new(vault.path(), &["md".to_string(), "txt".to_string()]);
    let handle = spawn(manager, store, ContentExtractor::new(), settings);

    Fixture {
        vault,
        _index: index,
        handle,
    }
}

fn indexed_paths(handle: &ReconcilerHandle) -> Vec<String> {
    handle
        .reader()
        .snapshot()
        .documents()
        .unwrap()
        .into_iter()
        .map(|doc| doc.path)
        .collect()
}

/// Polls `check` until it returns true or the watch timeout elapses.
async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    timeout(WATCH_TIMEOUT, async {
        while !check().await {
            sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .is_ok()
}

#[tokio::test(flavor = "multi_thread")]
async fn startup_indexes_existing_files() {
    let fx = start(
        &[("a.md", "alpha"), ("notes/b.md", "beta"), ("skip.png", "x")],
        settings(Duration::from_millis(50)),
    );

    fx.handle.wait_ready().await.unwrap();
    assert_eq!(fx.handle.state(), ReconcilerState::Watching);
    assert_eq!(indexed_paths(&fx.handle), vec!["a.md", "notes/b.md"]);

    fx.handle.stop().await.unwrap();
    assert_eq!(fx.handle.state(), ReconcilerState::Stopped);
}

#[tokio::test(flavor = "multi_thread")]
async fn notify_then_search_observes_the_write() {
    let fx = start(&[], settings(Duration::from_secs(60)));
    fx.handle.wait_ready().await.unwrap();

    write(fx.vault.path(), "fox.md", "The quick brown fox");
    let stats = fx.handle.notify("fox.md").await.unwrap();
    assert_eq!(stats.added, 1);

    let engine = QueryEngine::new("english", 200).unwrap();
    let results = engine
        .search("fox", &fx.handle.snapshot().await, 10)
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].path, "fox.md");
    assert!(results[0].content_preview.contains("fox"));

    fx.handle.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn watched_changes_reach_the_index() {
    let fx = start(&[], settings(Duration::from_millis(50)));
    fx.handle.wait_ready().await.unwrap();

    write(fx.vault.path(), "live.md", "first version");
    let handle = fx.handle.clone();
    assert!(
        eventually(|| {
            let handle = handle.clone();
            async move { indexed_paths(&handle) == vec!["live.md"] }
        })
        .await,
        "created file never indexed"
    );

    fs::remove_file(fx.vault.path().join("live.md")).unwrap();
    let handle = fx.handle.clone();
    assert!(
        eventually(|| {
            let handle = handle.clone();
            async move { indexed_paths(&handle).is_empty() }
        })
        .await,
        "deleted file never removed"
    );

    fx.handle.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn file_deleted_while_pending_is_removed_once() {
    let fx = start(&[("gone.md", "short-lived")], settings(Duration::from_secs(60)));
    fx.handle.wait_ready().await.unwrap();
    assert_eq!(indexed_paths(&fx.handle), vec!["gone.md"]);

    write(fx.vault.path(), "gone.md", "edited");
    fs::remove_file(fx.vault.path().join("gone.md")).unwrap();

    let stats = fx.handle.notify("gone.md").await.unwrap();
    assert_eq!(stats.removed, 1);
    assert_eq!(stats.failed, 0);
    assert!(stats.is_success());

    // The debounced event for the same path settles during stop and finds nothing left.
    fx.handle.stop().await.unwrap();
    assert!(indexed_paths(&fx.handle).is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_applies_pending_events() {
    let fx = start(&[], settings(Duration::from_secs(60)));
    fx.handle.wait_ready().await.unwrap();

    write(fx.vault.path(), "pending.md", "waiting out the quiet period");
    let handle = fx.handle.clone();
    assert!(
        eventually(|| {
            let handle = handle.clone();
            async move { handle.pending_events() > 0 }
        })
        .await,
        "raw event never reached the debouncer"
    );
    assert!(indexed_paths(&fx.handle).is_empty());

    fx.handle.stop().await.unwrap();
    assert_eq!(indexed_paths(&fx.handle), vec!["pending.md"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn reindex_picks_up_unwatched_changes() {
    let fx = start(&[("a.md", "alpha")], settings(Duration::from_secs(60)));
    fx.handle.wait_ready().await.unwrap();

    write(fx.vault.path(), "b.md", "beta");
    fs::remove_file(fx.vault.path().join("a.md")).unwrap();

    let stats = fx.handle.reindex().await.unwrap();
    assert_eq!(stats.added, 1);
    assert_eq!(stats.removed, 1);
    assert_eq!(indexed_paths(&fx.handle), vec!["b.md"]);

    fx.handle.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn block_policy_waits_for_startup_pass() {
    let fx = start(
        &[("a.md", "alpha"), ("b.md", "beta")],
        SyncSettings {
            startup: StartupPolicy::Block,
            ..settings(Duration::from_millis(50))
        },
    );

    let snapshot = fx.handle.snapshot().await;
    assert_eq!(snapshot.num_docs(), 2);

    fx.handle.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn commands_after_stop_are_rejected() {
    let fx = start(&[], settings(Duration::from_millis(50)));
    fx.handle.wait_ready().await.unwrap();
    fx.handle.stop().await.unwrap();

    assert!(fx.handle.notify("a.md").await.is_err());
    assert!(fx.handle.wait_ready().await.is_err());
    fx.handle.stop().await.unwrap();
}
