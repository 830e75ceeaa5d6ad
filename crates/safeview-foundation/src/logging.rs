//! Logging bootstrap for desktop/server hosts.
//!
//! A thin wrapper around `tracing-subscriber` so every safeview crate can
//! emit `tracing` spans and events without needing to know how the host
//! wires up its subscriber. A host embedding safeview is free to install
//! its own subscriber instead — calling [`init`] is optional and idempotent.

#[cfg(feature = "logging-init")]
use std::sync::Once;

#[cfg(feature = "logging-init")]
static INIT: Once = Once::new();

/// Installs a default `tracing-subscriber` formatter reading the
/// `SAFEVIEW_LOG` environment variable (falling back to `info`).
///
/// Safe to call more than once; only the first call takes effect.
#[cfg(feature = "logging-init")]
pub fn init() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_env("SAFEVIEW_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .ok();
    });
}
