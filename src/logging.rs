//! Logging setup for the `slurp` binary.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "warn,nzb_slurp=info";

/// Default filter with `--quiet`
pub const QUIET_FILTER: &str = "warn";

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`] (or [`QUIET_FILTER`] when `quiet`).
///
/// Calling it again once a subscriber is installed is a no-op.
pub fn init_logging(quiet: bool) {
    let fallback = if quiet { QUIET_FILTER } else { DEFAULT_FILTER };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
