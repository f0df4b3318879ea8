//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Respect RUST_LOG when set, fall back to the configured filter
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging
//! - Key material and user input are never logged verbatim at info level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `default_filter` applies when `RUST_LOG` is unset, e.g.
/// `wallet_gateway=debug`.
pub fn init_logging(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
