//! Log output for the CLI.
//!
//! The library logs through the `log` facade; the subscriber installed here
//! picks those records up and prints them to stderr.

use tracing_subscriber::EnvFilter;

/// Maps the `-v` count to a filter and installs the subscriber.
///
/// `RUST_LOG` takes precedence when set.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}
