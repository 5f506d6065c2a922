//! The three periodic reconcile loops: initialize, finalize, and
//! historical backfill. Each is a `tokio::time::interval`-driven task
//! over every configured chain handler, tolerant of a single handler's
//! tick failing (logged, not propagated, so one broken chain can't stall
//! the others).

mod finalize;
mod initialize;
mod past_scan;

pub use finalize::run_finalize_loop;
pub use initialize::run_initialize_loop;
pub use past_scan::run_past_scan_loop;
