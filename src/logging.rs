use tracing_subscriber::prelude::*;

/// Filter used when `RUST_LOG` is unset: every operation line, nothing else.
pub const DEFAULT_FILTER: &str = "shellkit=info";

/// Install a stderr `tracing` subscriber so operation log lines are visible.
///
/// `RUST_LOG` takes precedence over [`DEFAULT_FILTER`]. Calling this when a
/// global subscriber is already installed is harmless; the existing one
/// stays in place.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let init_result = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();

    if let Err(err) = init_result {
        tracing::debug!(error = %err, "tracing already initialized; keeping existing subscriber");
    }
}
