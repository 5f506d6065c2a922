//! The `QUEUED -> INITIALIZED` reconcile loop.

use std::sync::Arc;
use std::time::Duration;

use crate::chain::ChainHandler;

/// How often each configured chain's `processInitializeDeposits` runs.
const INITIALIZE_INTERVAL: Duration = Duration::from_secs(30);

/// Run `handler.process_initialize_deposits()` on a fixed interval until
/// `shutdown` fires. One tick's failure is logged and does not stop the
/// loop; the next tick retries naturally since records stay `QUEUED`
/// until they succeed.
pub async fn run_initialize_loop(
    handler: Arc<dyn ChainHandler>,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(INITIALIZE_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let started = std::time::Instant::now();
                let outcome = handler.process_initialize_deposits().await;
                metrics::histogram!(crate::metrics::RECONCILE_TICK_DURATION, "chain" => handler.chain_name().to_string(), "phase" => "initialize")
                    .record(started.elapsed().as_secs_f64());

                if let Err(error) = outcome {
                    metrics::counter!(crate::metrics::RECONCILE_TICKS_FAILED, "chain" => handler.chain_name().to_string(), "phase" => "initialize").increment(1);
                    tracing::error!(
                        chain = handler.chain_name(),
                        %error,
                        "initialize reconcile tick failed"
                    );
                } else {
                    metrics::counter!(crate::metrics::RECONCILE_TICKS_OK, "chain" => handler.chain_name().to_string(), "phase" => "initialize").increment(1);
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!(chain = handler.chain_name(), "initialize reconcile loop shutting down");
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
    async fn stops_promptly_on_shutdown_signal() {
        let mut mock = MockChainHandler::new();
        mock.expect_process_initialize_deposits()
            .returning(|| Box::pin(async { Ok(()) }));
        mock.expect_chain_name().return_const("test".to_string());
        let handler: Arc<dyn ChainHandler> = Arc::new(mock);

        let (tx, rx) = tokio::sync::watch::channel(false);
        let task = tokio::spawn(run_initialize_loop(handler, rx));

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("loop should stop shortly after shutdown is signaled")
            .unwrap();
    }
}
