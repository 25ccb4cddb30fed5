//! Implementation of `vault search`.

use std::process::ExitCode;

use vault_index::ScoredResult;

use crate::cli::{
    args::SearchCommand,
    context::CommandContext,
    output::{dim, subheader},
};

/// Searches the committed index and prints ranked results.
pub fn run(ctx: &CommandContext, cmd: &SearchCommand) -> ExitCode {
    let reader = match ctx.open_reader() {
        Ok(reader) => reader,
        Err(code) => return code,
    };
    let engine = match ctx.query_engine() {
        Ok(engine) => engine,
        Err(code) => return code,
    };

    let query = cmd.query_string();
    let limit = cmd.limit.unwrap_or(ctx.config.search.default_limit);
    let results = match engine.search(&query, &reader.snapshot(), limit) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("error: search failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cmd.json {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("{}", dim("No results."));
        return ExitCode::SUCCESS;
    }
    for result in &results {
        println!(
            "{} {}",
            subheader(&result.path),
            dim(&format!("({:.2})", result.score))
        );
        if !result.content_preview.is_empty() {
            println!("   {}", result.content_preview);
        }
        println!();
    }
    ExitCode::SUCCESS
}

/// Prints results as a JSON array.
fn print_json(results: &[ScoredResult]) -> ExitCode {
    match serde_json::to_string_pretty(results) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize results: {e}");
            ExitCode::FAILURE
        }
    }
}
