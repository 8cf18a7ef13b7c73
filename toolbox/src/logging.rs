//! Tracing setup for the toolbox binary.
//!
//! Logs go to stderr so result lines on stdout stay machine-readable.
//! Filtering follows `RUST_LOG`, defaulting to `info`.

use std::sync::Once;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Install the global subscriber. Later calls are ignored.
pub fn init(json: bool) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let registry = tracing_subscriber::registry().with(env_filter);
        let result = if json {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true).with_current_span(true))
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .try_init()
        };
        // another subscriber already installed (tests) is fine
        if result.is_ok() {
            debug!(json, "tracing initialized");
        }
    });
}
