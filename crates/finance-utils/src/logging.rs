//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "warn,finance_agent=info";

/// Initialize tracing subscriber with the default filter
pub fn init_tracing() {
    init_tracing_with(DEFAULT_FILTER);
}

/// Initialize tracing subscriber, falling back to `default_filter` when
/// `RUST_LOG` is unset or invalid
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_tracing_with(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
