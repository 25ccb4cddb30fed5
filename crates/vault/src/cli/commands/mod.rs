//! Command implementations and dispatch.

pub mod index;
pub mod init;
pub mod search;
pub mod status;
pub mod watch;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &CommandContext) -> ExitCode {
    match command {
        Commands::Init(cmd) => init::run(&ctx.cwd, &cmd),
        Commands::Index(cmd) => index::run(ctx, &cmd),
        Commands::Search(cmd) => search::run(ctx, &cmd),
        Commands::Watch => watch::run(ctx),
        Commands::Status => status::run(ctx),
    }
}
