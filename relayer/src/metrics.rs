//! Ambient metrics. No HTTP surface is exposed by this crate; the
//! Prometheus recorder installed here only needs to be scraped if the
//! embedding binary chooses to expose `handle.render()` itself.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Counter: reconcile ticks that completed without error, labeled by
/// `chain` and `phase` (`initialize`/`finalize`/`past_scan`).
pub const RECONCILE_TICKS_OK: &str = "relayer_reconcile_ticks_ok_total";
/// Counter: reconcile ticks that returned an error, same labels as
/// [`RECONCILE_TICKS_OK`].
pub const RECONCILE_TICKS_FAILED: &str = "relayer_reconcile_ticks_failed_total";
/// Counter: deposits that advanced to `INITIALIZED`, labeled by `chain`.
pub const DEPOSITS_INITIALIZED: &str = "relayer_deposits_initialized_total";
/// Counter: deposits that advanced to `FINALIZED`, labeled by `chain`.
pub const DEPOSITS_FINALIZED: &str = "relayer_deposits_finalized_total";
/// Histogram: wall-clock seconds spent in a single reconcile tick,
/// labeled by `chain` and `phase`.
pub const RECONCILE_TICK_DURATION: &str = "relayer_reconcile_tick_duration_seconds";

/// Install the process-wide Prometheus recorder and return its handle.
/// Call once at startup before spawning any reconcile loop.
pub fn install_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("installing the global metrics recorder should only fail if one is already installed")
}
