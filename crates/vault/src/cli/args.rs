//! Clap argument definitions for the `vault` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "vault")]
#[command(about = "Incremental full-text search over a directory of notes")]
pub struct Cli {
    /// Configuration file [default: closest vault.toml]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log more (-v for debug, -vv for trace)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Supported `vault` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Write a commented vault.toml in the current directory
    Init(InitCommand),

    /// Bring the index up to date with the vault
    Index(IndexCommand),

    /// Search the index
    Search(SearchCommand),

    /// Keep the index in sync with the vault until interrupted
    Watch,

    /// Show configuration and index state
    Status,
}

/// Arguments for `vault init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `vault index`.
#[derive(Args, Debug, Clone)]
pub struct IndexCommand {
    /// Discard the existing index and rebuild from scratch
    #[arg(long)]
    pub full: bool,
}

/// Arguments for `vault search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Query terms, joined with spaces. Put negated terms after `--`
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Maximum results [default: search.default_limit]
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    /// The query string the terms form.
    pub fn query_string(&self) -> String {
        self.query.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["vault", "search", "fox", "-vv", "--config", "x.toml"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn search_joins_terms() {
        let cli =
            Cli::try_parse_from(["vault", "search", "-n", "3", "--", "quick", "-fox"]).unwrap();
        let Commands::Search(cmd) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(cmd.query_string(), "quick -fox");
        assert_eq!(cmd.limit, Some(3));
    }

    #[test]
    fn search_requires_a_query() {
        assert!(Cli::try_parse_from(["vault", "search"]).is_err());
    }
}
