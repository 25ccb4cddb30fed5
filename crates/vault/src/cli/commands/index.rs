//! Implementation of `vault index`.

use std::process::ExitCode;

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use vault_document::ContentExtractor;
use vault_index::{IndexStats, ResetReason};

use crate::cli::{
    args::IndexCommand,
    context::CommandContext,
    output::{dim, subheader, warning},
};

/// Reconciles the index with the vault and prints what changed.
pub fn run(ctx: &CommandContext, cmd: &IndexCommand) -> ExitCode {
    if let Err(code) = ctx.require_vault() {
        return code;
    }
    let mut manager = match ctx.open_manager(cmd.full) {
        Ok(manager) => manager,
        Err(code) => return code,
    };

    let report = manager.open_report();
    match &report.reset {
        Some(ResetReason::Requested) | None => {}
        Some(ResetReason::FingerprintChanged) => {
            println!("{}", dim("Index settings changed, rebuilding from scratch."));
        }
        Some(ResetReason::Corrupt(message)) => {
            println!("{}", warning(&format!("Index was unreadable ({message}), rebuilt.")));
        }
    }
    if !report.recovered_paths.is_empty() {
        println!(
            "{}",
            dim(&format!(
                "Recovering {} paths from an interrupted batch.",
                report.recovered_paths.len()
            ))
        );
    }

    let store = ctx.store();
    let stats = match manager.rebuild_from(
        &store,
        &ContentExtractor::new(),
        ctx.config.commit.max_changes,
    ) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("error: indexing failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("{}", stats_table(&stats));
    if !stats.errors.is_empty() {
        println!();
        println!("{}", subheader(&format!("Errors ({}):", stats.errors.len())));
        for err in &stats.errors {
            println!("   {}", warning(&err.to_string()));
        }
    }
    println!();
    println!(
        "Indexed {} documents {}",
        manager.len(),
        dim(&format!("(generation {})", manager.generation()))
    );

    ExitCode::SUCCESS
}

/// Renders pass counts as a table.
fn stats_table(stats: &IndexStats) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Added", "Updated", "Removed", "Unchanged", "Failed"]);
    table.add_row(vec![
        Cell::new(stats.added),
        Cell::new(stats.updated),
        Cell::new(stats.removed),
        Cell::new(stats.unchanged),
        Cell::new(stats.failed),
    ]);
    table
}
