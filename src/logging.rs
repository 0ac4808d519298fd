//! Stderr diagnostics for the launcher.
//!
//! Reads `RUST_LOG`. Defaults to `info` so run progress is visible without
//! configuration. Output goes to stderr, keeping stdout for command results
//! (the assembled configuration, the artifact path).

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber for the CLI.
///
/// # Example
/// ```bash
/// RUST_LOG=prometheus_launch=debug prometheus-launch run
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
