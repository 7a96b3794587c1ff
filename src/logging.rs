//! Logging setup
//!
//! Log lines go to stderr so report output on stdout stays machine-readable.
//! `RUST_LOG` overrides the default level.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "warn";

/// Initialize the global subscriber for the CLI
pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

/// Initialize with a fallback filter, e.g. "debug" for `--verbose`
pub fn init_with_default(default: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .try_init();
}

/// Initialize logging for tests; repeated calls are harmless
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
