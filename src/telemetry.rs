//! Telemetry helpers for hosts embedding `pricechart-roi`.
//!
//! The crate only emits `tracing` events; installing a subscriber stays the
//! host's call. `init_default_tracing` is a convenience for demos and tests.

/// Initializes a compact `tracing` subscriber when the `telemetry` feature is enabled.
///
/// The filter is read from `RUST_LOG` and defaults to `info`.
/// Returns `false` when the feature is disabled or a global subscriber is
/// already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_target(true)
            .compact();

        return builder.try_init().is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
