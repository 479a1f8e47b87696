//! Tracing subscriber setup.
//!
//! The core itself only emits `tracing` events; the embedding binary decides
//! where they go. This helper wires the standard subscriber stack
//! (env-filter + compact or JSON formatting) for binaries and tests that
//! don't bring their own.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Output format for [`init_tracing`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable compact lines.
    Compact,
    /// One JSON object per line.
    Json,
}

/// Install the global tracing subscriber.
///
/// Filter comes from `RUST_LOG`, defaulting to `info` for spotter crates.
/// Calling this twice is a no-op (the second install fails quietly), which
/// keeps it safe to call from tests.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,spotter=debug"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Compact => {
            registry.with(tracing_subscriber::fmt::layer().compact()).try_init()
        }
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
