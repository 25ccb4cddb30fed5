//! Implementation of `vault watch`.

use std::process::ExitCode;

use tokio::{runtime::Builder, signal};
use tracing::{error, info};
use vault_document::ContentExtractor;
use vault_sync::{SyncSettings, spawn};

use crate::cli::context::CommandContext;

/// Keeps the index in sync with the vault until Ctrl-C.
pub fn run(ctx: &CommandContext) -> ExitCode {
    if let Err(code) = ctx.require_vault() {
        return code;
    }
    let runtime = match Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    runtime.block_on(watch(ctx))
}

/// Runs the reconciler until interrupted or failed.
async fn watch(ctx: &CommandContext) -> ExitCode {
    let manager = match ctx.open_manager(false) {
        Ok(manager) => manager,
        Err(code) => return code,
    };
    let handle = spawn(
        manager,
        ctx.store(),
        ContentExtractor::new(),
        SyncSettings::from_config(&ctx.config),
    );

    eprintln!(
        "Watching {} (press Ctrl-C to stop)",
        ctx.config.vault.root.display()
    );

    let interrupted = tokio::select! {
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                error!(error = %e, "failed to listen for Ctrl-C");
            }
            true
        }
        () = handle.stopped() => false,
    };

    info!("shutting down");
    if let Err(e) = handle.stop().await {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    let reader = handle.reader();
    if interrupted {
        println!(
            "Stopped with {} documents indexed (generation {}).",
            reader.snapshot().num_docs(),
            reader.generation()
        );
        ExitCode::SUCCESS
    } else {
        eprintln!("error: synchronization stopped after an index store failure; see the log");
        ExitCode::FAILURE
    }
}
