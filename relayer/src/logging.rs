//! Structured logging setup.
//!
//! A thin wrapper around `tracing_subscriber`'s env-filter + fmt layers.
//! Every reconcile tick and chain handler call logs through `tracing`
//! macros with `chain`/`deposit_id` fields rather than ad hoc
//! `println!`, so operators can filter per-chain noise with
//! `RUST_LOG=relayer::chain::evm=debug`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Initialize the global tracing subscriber. `RUST_LOG` controls the
/// filter directive, defaulting to `info` when unset or unparseable.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .ok();
}
