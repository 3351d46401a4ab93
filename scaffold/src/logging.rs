//! Diagnostic tracing for the scaffolder binaries.
//!
//! Diagnostics go to stderr and are controlled by `RUST_LOG`. The summary a
//! user reads after a run is printed to stdout by the binaries and is not
//! affected by the filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "scaffold=info,warn";

/// Initialize the tracing subscriber: `RUST_LOG` filter (default
/// [`DEFAULT_FILTER`]), compact format, stderr.
///
/// # Example
/// ```bash
/// RUST_LOG=scaffold=debug scaffold ./my-app
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
