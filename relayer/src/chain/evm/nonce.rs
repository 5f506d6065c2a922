//! The L1 nonce manager: a monotone transaction-count cache with
//! catch-up on mined transactions.
//!
//! Grounded in the teacher's nonce handling in `transaction_coordinator.rs`
//! (`wallet.set_nonce(account.nonce)` before building a transaction, then
//! `wallet.set_nonce(wallet.get_nonce().saturating_sub(1))` on failure to
//! roll back a reservation) — generalized from a single-threaded signer
//! wallet field to an async-safe manager, since two reconcile ticks may
//! race here (see the concurrency model).

use alloy::primitives::Address;
use alloy::providers::Provider;

use crate::error::Result;

/// Caches the next nonce to use for a single signer address, bumping it
/// locally after every send and re-synchronizing with the network before
/// each use.
#[derive(Debug)]
pub struct NonceManager {
    address: Address,
    local: tokio::sync::Mutex<Option<u64>>,
}

impl NonceManager {
    /// Construct a manager for `address`. No network call is made until
    /// [`Self::next`] is first invoked.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            local: tokio::sync::Mutex::new(None),
        }
    }

    /// Reserve the next nonce to use for a send: reads the current
    /// network pending transaction count, takes `max(local, network)`,
    /// and bumps the local cache so concurrent callers within this
    /// process don't reuse it.
    pub async fn next(&self, provider: &impl Provider) -> Result<u64> {
        let network = provider
            .get_transaction_count(self.address)
            .pending()
            .await?;

        let mut guard = self.local.lock().await;
        let candidate = guard.map_or(network, |local| local.max(network));
        *guard = Some(candidate + 1);
        Ok(candidate)
    }

    /// Roll back the local cache after a failed send, so the next
    /// [`Self::next`] call re-derives the nonce from the network instead
    /// of skipping ahead over a nonce that was never actually consumed.
    pub async fn reset(&self) {
        *self.local.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::providers::ProviderBuilder;

    #[tokio::test]
    async fn reset_clears_the_local_cache() {
        // We can't hit a live provider in a unit test, but we can verify
        // the reset contract directly against the internal cache.
        let manager = NonceManager::new(Address::ZERO);
        *manager.local.lock().await = Some(42);
        manager.reset().await;
        assert_eq!(*manager.local.lock().await, None);
    }

    #[test]
    fn builder_compiles_for_local_http_provider() {
        // Smoke-test that the provider type we depend on in `next`
        // actually builds; no network call is made.
        let _provider = ProviderBuilder::new().on_http("http://localhost:8545".parse().unwrap());
    }
}
