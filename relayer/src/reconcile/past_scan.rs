//! The historical backfill reconcile loop: re-scans recent history for
//! deposit intents a live subscription may have missed (a restart, a
//! dropped websocket, a burst that outran the poll lookback window).

use std::sync::Arc;
use std::time::Duration;

use crate::chain::{ChainHandler, PastDepositsQuery};

/// How often the backfill pass runs. Coarser than the initialize/finalize
/// loops since it re-derives a block range on every tick.
const PAST_SCAN_INTERVAL: Duration = Duration::from_secs(300);

/// Run `handler.check_for_past_deposits()` on a fixed interval, skipping
/// handlers that don't support it (`use_endpoint` chains with no
/// past-deposits query, per [`ChainHandler::supports_past_deposit_check`]).
pub async fn run_past_scan_loop(
    handler: Arc<dyn ChainHandler>,
    backfill_minutes: u64,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    if !handler.supports_past_deposit_check() {
        tracing::info!(chain = handler.chain_name(), "past-deposit scan not supported for this chain; skipping loop");
        return;
    }

    let mut ticker = tokio::time::interval(PAST_SCAN_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let latest_block = match handler.get_latest_block().await {
                    Ok(block) => block,
                    Err(error) => {
                        tracing::error!(chain = handler.chain_name(), %error, "could not fetch latest block for past-deposit scan");
                        continue;
                    }
                };

                let query = PastDepositsQuery {
                    past_minutes: backfill_minutes,
                    latest_block,
                };

                if let Err(error) = handler.check_for_past_deposits(query).await {
                    tracing::error!(chain = handler.chain_name(), %error, "past-deposit scan tick failed");
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!(chain = handler.chain_name(), "past-deposit scan loop shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MockChainHandler;

    #[tokio::test]
    async fn skips_entirely_when_unsupported() {
        let mut mock = MockChainHandler::new();
        mock.expect_supports_past_deposit_check().return_const(false);
        mock.expect_chain_name().return_const("test".to_string());
        mock.expect_check_for_past_deposits().times(0);
        let handler: Arc<dyn ChainHandler> = Arc::new(mock);

        let (_tx, rx) = tokio::sync::watch::channel(false);
        tokio::time::timeout(Duration::from_millis(200), run_past_scan_loop(handler, 10, rx))
            .await
            .expect("should return immediately rather than entering the ticker loop");
    }
}
