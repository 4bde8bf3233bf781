//! Opt-in tracing bootstrap.
//!
//! The library itself only emits `tracing` events and never installs a
//! global subscriber. Hosts that want structured logs without wiring their
//! own subscriber can enable the `telemetry` feature and call
//! [`init_default_tracing`] once at startup.

/// Installs a compact `tracing-subscriber` honoring `RUST_LOG`, with `info`
/// as the fallback level.
///
/// Returns `false` when the `telemetry` feature is disabled or another
/// global subscriber is already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
