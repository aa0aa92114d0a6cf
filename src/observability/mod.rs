//! Structured logging setup.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "sitesearch=info";

/// Initialize structured logging with `RUST_LOG` environment variable support.
///
/// Logs go to stderr so they never interleave with command output on
/// stdout. `verbose` raises the default filter to `debug`. Call once at
/// program startup; later calls are silently ignored.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "sitesearch=debug"
        } else {
            DEFAULT_FILTER
        })
    });

    // try_init so double-init in tests doesn't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
