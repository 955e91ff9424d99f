//! Logging setup for the zipstamp binary.
//!
//! Verbosity comes from command-line flags only; the default level is
//! `info` so the run outcome is always reported.

use tracing_subscriber::EnvFilter;

/// Filter directive for the given flag combination
pub fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "warn";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global stderr subscriber
pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::new(level_for(verbose, quiet));
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
