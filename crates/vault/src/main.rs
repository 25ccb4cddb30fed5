//! vault: incremental full-text search over a directory of notes.
//!
//! The index lives next to the notes and is kept current either by running
//! `vault index` on demand or by leaving `vault watch` running.

#![warn(missing_docs)]

mod cli;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::{
    CommandContext,
    args::{Cli, Commands},
    commands, logging,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Commands::Init(cmd) = &cli.command {
        logging::init(cli.verbose, logging::DEFAULT_LEVEL);
        return match cli::context::current_dir_or_failure() {
            Ok(cwd) => commands::init::run(&cwd, cmd),
            Err(code) => code,
        };
    }

    let ctx = match CommandContext::load(cli.config.as_deref()) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    logging::init(cli.verbose, &ctx.config.logging.level);

    commands::run(cli.command, &ctx)
}
