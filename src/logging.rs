//! Tracing subscriber initialization.
//!
//! Call one of these once at startup, before building the [`App`](crate::App).
//! The log level is controlled via `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=debug cargo run            # request traces included
//! RUST_LOG=bijou_auth=debug,sqlx=warn cargo run
//! ```
//!
//! Secrets (signing keys, tokens, password material) are never emitted by
//! this crate's log statements.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize formatted logging with sensible defaults.
///
/// Defaults to `info` when `RUST_LOG` is unset.
///
/// # Panics
///
/// Panics if a global subscriber is already installed. Only call once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize JSON-formatted logging (recommended for production log
/// aggregation).
///
/// # Panics
///
/// Panics if a global subscriber is already installed. Only call once.
pub fn init_logging_json() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
