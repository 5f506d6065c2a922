#![deny(missing_docs)]

//! Cross-chain deposit relayer: drives the two-phase `initialize` /
//! `finalize` deposit ceremony against a set of configured destination
//! chains, backed by a durable per-chain deposit store.

pub mod backfill;
pub mod chain;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod reconcile;
pub mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod throttle;

/// Package version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
