//! Non-EVM destination chains: Starknet, Sui, and Solana are driven
//! through an off-chain relayer endpoint rather than direct contract
//! calls, so they share one generic polling handler parameterized over a
//! small per-chain [`ChainMechanics`] trait instead of each getting a
//! full [`super::ChainHandler`] implementation of their own.

mod solana;
mod starknet;
mod sui;

use std::sync::Arc;

use async_trait::async_trait;

use crate::chain::{ChainHandler, PastDepositsQuery};
use crate::config::{ChainConfig, ChainType};
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::model::{self, DepositRecord, DepositStatus};
use crate::store::DepositStore;
use crate::throttle;

/// Chain-specific mechanics a [`GenericPollingHandler`] delegates to. Each
/// destination chain implements this against its own off-chain endpoint
/// client; the polling cadence, store interaction, and status bookkeeping
/// live once in [`GenericPollingHandler`].
#[async_trait]
pub trait ChainMechanics: Send + Sync {
    /// List deposit intents the endpoint has observed that are not yet
    /// known to us, decoded into fresh `QUEUED` records.
    async fn poll_new_deposits(&self) -> Result<Vec<DepositRecord>>;

    /// Submit the initialize step for `record` and report the outcome.
    async fn submit_initialize(&self, record: &DepositRecord) -> Result<DepositRecord>;

    /// Submit the finalize step for `record` and report the outcome.
    async fn submit_finalize(&self, record: &DepositRecord) -> Result<DepositRecord>;

    /// Query the endpoint's view of a deposit's on-chain status.
    async fn remote_status(&self, id: &str) -> Result<Option<DepositStatus>>;

    /// The latest checkpoint (block/slot/etc) the endpoint reports, used
    /// only for logging since historical scans go through the endpoint's
    /// own query rather than a block-range binary search.
    async fn latest_checkpoint(&self) -> Result<u64>;

    /// List deposit intents within `query.past_minutes` of now, for the
    /// historical backfill pass. `None` if this endpoint has no such
    /// query (in which case [`GenericPollingHandler::supports_past_deposit_check`]
    /// should return `false`).
    async fn poll_past_deposits(&self, query: PastDepositsQuery) -> Result<Vec<DepositRecord>>;
}

/// Drives any [`ChainMechanics`] implementation through the same
/// ingest/initialize/finalize control flow the EVM handler uses, minus
/// the EVM-specific transaction plumbing.
pub struct GenericPollingHandler<T> {
    config: ChainConfig,
    store: Arc<dyn DepositStore>,
    dispatcher: Dispatcher,
    mechanics: T,
}

impl<T: ChainMechanics> GenericPollingHandler<T> {
    /// Construct a handler over `mechanics`.
    pub fn new(config: ChainConfig, store: Arc<dyn DepositStore>, mechanics: T) -> Self {
        Self {
            config,
            store,
            dispatcher: Dispatcher::new(),
            mechanics,
        }
    }

    async fn ingest(&self, record: DepositRecord) -> Result<DepositRecord> {
        let id = record.id.clone();
        self.dispatcher
            .with_lock(&id, || async {
                if let Some(existing) = self.store.get(&id).await? {
                    return Ok(existing);
                }
                let inserted = self.store.put_if_absent(record.clone()).await?;
                if inserted {
                    Ok(record)
                } else {
                    self.store
                        .get(&id)
                        .await?
                        .ok_or_else(|| Error::MissingRecord(id.clone()))
                }
            })
            .await
    }

    fn now_ms() -> i64 {
        time::OffsetDateTime::now_utc().unix_timestamp() * 1000
    }
}

#[async_trait]
impl<T: ChainMechanics> ChainHandler for GenericPollingHandler<T> {
    async fn initialize(&mut self) -> Result<()> {
        tracing::info!(chain = %self.config.chain_name, "polling chain handler initialized");
        Ok(())
    }

    async fn setup_listeners(&mut self) -> Result<()> {
        tracing::info!(chain = %self.config.chain_name, "polling chain handler will poll for deposit events");
        Ok(())
    }

    async fn initialize_deposit(&self, record: &DepositRecord) -> Result<DepositRecord> {
        self.mechanics.submit_initialize(record).await
    }

    async fn finalize_deposit(&self, record: &DepositRecord) -> Result<DepositRecord> {
        self.mechanics.submit_finalize(record).await
    }

    async fn check_deposit_status(&self, id: &str) -> Result<Option<DepositStatus>> {
        self.mechanics.remote_status(id).await
    }

    async fn get_latest_block(&self) -> Result<u64> {
        self.mechanics.latest_checkpoint().await
    }

    async fn process_initialize_deposits(&self) -> Result<()> {
        let fresh = self.mechanics.poll_new_deposits().await?;
        for record in fresh {
            if let Err(error) = self.ingest(record).await {
                tracing::error!(chain = %self.config.chain_name, %error, "could not ingest polled deposit");
            }
        }

        let queued = self.store.list_by_status(DepositStatus::Queued).await?;
        for record in queued {
            if !throttle::is_due(Self::now_ms(), record.dates.last_activity_at) {
                continue;
            }
            let id = record.id.clone();
            let outcome = self
                .dispatcher
                .with_lock(&id, || async {
                    let mut current = self.store.get(&id).await?.unwrap_or(record.clone());
                    model::touch(&mut current, Self::now_ms());

                    match self.check_deposit_status(&id).await? {
                        Some(DepositStatus::Initialized) => {
                            model::advance_to_initialized(&mut current, None, Self::now_ms());
                        }
                        Some(DepositStatus::Finalized) => {
                            model::advance_to_finalized(&mut current, None, Self::now_ms());
                        }
                        Some(DepositStatus::Queued) => {
                            current = self.initialize_deposit(&current).await?;
                        }
                        None => {
                            tracing::debug!(chain = %self.config.chain_name, deposit_id = %id, "remote_status returned no status; will retry next tick");
                        }
                    }
                    self.store.put(current).await
                })
                .await;

            if let Err(error) = outcome {
                tracing::error!(chain = %self.config.chain_name, deposit_id = %id, %error, "processInitializeDeposits failed for record");
            }
        }
        Ok(())
    }

    async fn process_finalize_deposits(&self) -> Result<()> {
        let initialized = self.store.list_by_status(DepositStatus::Initialized).await?;
        for record in initialized {
            if !throttle::is_due(Self::now_ms(), record.dates.last_activity_at) {
                continue;
            }
            let id = record.id.clone();
            let outcome = self
                .dispatcher
                .with_lock(&id, || async {
                    let mut current = self.store.get(&id).await?.unwrap_or(record.clone());
                    model::touch(&mut current, Self::now_ms());

                    match self.check_deposit_status(&id).await? {
                        Some(DepositStatus::Finalized) => {
                            model::advance_to_finalized(&mut current, None, Self::now_ms());
                        }
                        Some(DepositStatus::Initialized) => {
                            current = self.finalize_deposit(&current).await?;
                        }
                        Some(DepositStatus::Queued) => {
                            tracing::warn!(chain = %self.config.chain_name, deposit_id = %id, "record INITIALIZED locally but endpoint reports QUEUED");
                        }
                        None => {
                            tracing::debug!(chain = %self.config.chain_name, deposit_id = %id, "remote_status returned no status; will retry next tick");
                        }
                    }
                    self.store.put(current).await
                })
                .await;

            if let Err(error) = outcome {
                tracing::error!(chain = %self.config.chain_name, deposit_id = %id, %error, "processFinalizeDeposits failed for record");
            }
        }
        Ok(())
    }

    async fn check_for_past_deposits(&self, _query: PastDepositsQuery) -> Result<()> {
        // Off-chain-endpoint handlers never support the historical scan
        // (see `supports_past_deposit_check`), so this is a no-op rather
        // than actually querying the endpoint's past-deposits lookup.
        Ok(())
    }

    fn supports_past_deposit_check(&self) -> bool {
        // Every `GenericPollingHandler` consumes an off-chain endpoint
        // rather than subscribing to L2 events directly, so the historical
        // scan never applies here regardless of configuration.
        false
    }

    fn chain_name(&self) -> &str {
        &self.config.chain_name
    }
}

/// Construct the [`ChainMechanics`] implementation matching
/// `config.chain_type`, boxed behind [`GenericPollingHandler`].
pub fn offchain_mechanics(config: &ChainConfig) -> Result<Box<dyn ChainMechanicsObject>> {
    let endpoint_url = config
        .endpoint_url
        .clone()
        .ok_or_else(|| Error::Config(format!("chain {}: endpoint_url is required", config.chain_name)))?;

    match config.chain_type {
        ChainType::Starknet => Ok(Box::new(starknet::StarknetMechanics::new(endpoint_url))),
        ChainType::Sui => Ok(Box::new(sui::SuiMechanics::new(endpoint_url))),
        ChainType::Solana => Ok(Box::new(solana::SolanaMechanics::new(endpoint_url))),
        ChainType::Evm => Err(Error::Config("EVM chains do not use offchain_mechanics".into())),
    }
}

/// Object-safe alias for [`ChainMechanics`], needed because
/// [`offchain_mechanics`] returns one of three concrete types behind a
/// single boxed trait object.
pub trait ChainMechanicsObject: ChainMechanics {}
impl<T: ChainMechanics> ChainMechanicsObject for T {}

#[async_trait]
impl ChainMechanics for Box<dyn ChainMechanicsObject> {
    async fn poll_new_deposits(&self) -> Result<Vec<DepositRecord>> {
        (**self).poll_new_deposits().await
    }

    async fn submit_initialize(&self, record: &DepositRecord) -> Result<DepositRecord> {
        (**self).submit_initialize(record).await
    }

    async fn submit_finalize(&self, record: &DepositRecord) -> Result<DepositRecord> {
        (**self).submit_finalize(record).await
    }

    async fn remote_status(&self, id: &str) -> Result<Option<DepositStatus>> {
        (**self).remote_status(id).await
    }

    async fn latest_checkpoint(&self) -> Result<u64> {
        (**self).latest_checkpoint().await
    }

    async fn poll_past_deposits(&self, query: PastDepositsQuery) -> Result<Vec<DepositRecord>> {
        (**self).poll_past_deposits(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubMechanics;

    #[async_trait]
    impl ChainMechanics for StubMechanics {
        async fn poll_new_deposits(&self) -> Result<Vec<DepositRecord>> {
            Ok(vec![])
        }
        async fn submit_initialize(&self, record: &DepositRecord) -> Result<DepositRecord> {
            Ok(record.clone())
        }
        async fn submit_finalize(&self, record: &DepositRecord) -> Result<DepositRecord> {
            Ok(record.clone())
        }
        async fn remote_status(&self, _id: &str) -> Result<Option<DepositStatus>> {
            Ok(None)
        }
        async fn latest_checkpoint(&self) -> Result<u64> {
            Ok(0)
        }
        async fn poll_past_deposits(&self, _query: PastDepositsQuery) -> Result<Vec<DepositRecord>> {
            panic!("poll_past_deposits must never be reached while supports_past_deposit_check is false");
        }
    }

    fn sample_config() -> ChainConfig {
        ChainConfig {
            chain_name: "starknet".into(),
            chain_type: ChainType::Starknet,
            l1_rpc: "http://localhost:8545".into(),
            l2_rpc: None,
            l1_contract_address: "0x0000000000000000000000000000000000000001".into(),
            l2_contract_address: None,
            vault_address: "0x0000000000000000000000000000000000000003".into(),
            private_key: None,
            use_endpoint: true,
            endpoint_url: Some("http://localhost:9000".into()),
            start_block: 0,
        }
    }

    fn handler() -> GenericPollingHandler<StubMechanics> {
        let store: Arc<dyn DepositStore> = Arc::new(crate::store::MemoryStore::new());
        GenericPollingHandler::new(sample_config(), store, StubMechanics)
    }

    #[test]
    fn never_supports_past_deposit_check() {
        assert!(!handler().supports_past_deposit_check());
    }

    #[tokio::test]
    async fn check_for_past_deposits_is_a_no_op() {
        let query = PastDepositsQuery { past_minutes: 60, latest_block: 0 };
        handler().check_for_past_deposits(query).await.unwrap();
    }
}
