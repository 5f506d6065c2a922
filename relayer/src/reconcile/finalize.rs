//! The `INITIALIZED -> FINALIZED` reconcile loop.

use std::sync::Arc;
use std::time::Duration;

use crate::chain::ChainHandler;

/// How often each configured chain's `processFinalizeDeposits` runs.
const FINALIZE_INTERVAL: Duration = Duration::from_secs(30);

/// Run `handler.process_finalize_deposits()` on a fixed interval until
/// `shutdown` fires, the same loop shape as
/// [`super::initialize::run_initialize_loop`].
pub async fn run_finalize_loop(
    handler: Arc<dyn ChainHandler>,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(FINALIZE_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let started = std::time::Instant::now();
                let outcome = handler.process_finalize_deposits().await;
                metrics::histogram!(crate::metrics::RECONCILE_TICK_DURATION, "chain" => handler.chain_name().to_string(), "phase" => "finalize")
                    .record(started.elapsed().as_secs_f64());

                if let Err(error) = outcome {
                    metrics::counter!(crate::metrics::RECONCILE_TICKS_FAILED, "chain" => handler.chain_name().to_string(), "phase" => "finalize").increment(1);
                    tracing::error!(
                        chain = handler.chain_name(),
                        %error,
                        "finalize reconcile tick failed"
                    );
                } else {
                    metrics::counter!(crate::metrics::RECONCILE_TICKS_OK, "chain" => handler.chain_name().to_string(), "phase" => "finalize").increment(1);
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!(chain = handler.chain_name(), "finalize reconcile loop shutting down");
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
    async fn tick_failure_does_not_stop_the_loop() {
        let mut mock = MockChainHandler::new();
        mock.expect_process_finalize_deposits()
            .times(1..)
            .returning(|| Box::pin(async { Err(crate::error::Error::RpcTransient("boom".into())) }));
        mock.expect_chain_name().return_const("test".to_string());
        let handler: Arc<dyn ChainHandler> = Arc::new(mock);

        let (tx, rx) = tokio::sync::watch::channel(false);
        let task = tokio::spawn(run_finalize_loop(handler, rx));
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("loop should stop shortly after shutdown is signaled")
            .unwrap();
    }
}
