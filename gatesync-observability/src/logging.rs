//! Tracing initialization: `tracing_subscriber::fmt()` with an `EnvFilter`
//! that falls back to a caller-supplied default level when `RUST_LOG` is
//! unset. Library crates (`gatesync-core`, `gatesync-store`,
//! `gatesync-registry`, `gatesync-kinds`, `gatesync-build`, `gatesync-sync`)
//! only ever emit `tracing` events; this is the one place a subscriber is
//! installed.

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. `json` selects structured JSON
/// output (useful behind a log shipper) over the default human-readable
/// format; `default_level` is used when `RUST_LOG` is not set.
pub fn init(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}
