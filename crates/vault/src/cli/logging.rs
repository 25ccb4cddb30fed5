//! Log output for the `vault` binary.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.

use std::io;

use tracing_subscriber::EnvFilter;

/// Level used before a configuration has been loaded.
pub const DEFAULT_LEVEL: &str = "info";

/// Installs the global subscriber.
///
/// `RUST_LOG` wins, then the `-v` count, then the configured level.
pub fn init(verbose: u8, configured: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(directive(verbose, configured))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    });

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
    if let Err(e) = installed {
        eprintln!("warning: could not install logger: {e}");
    }
}

/// Filter directive for a verbosity count.
fn directive(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}
