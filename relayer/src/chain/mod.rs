//! The chain handler abstraction: a uniform verb set that isolates
//! chain-specific mechanics behind a stable contract, so the reconciler
//! loops and event dispatcher never need to know which destination chain
//! a deposit lives on.

pub mod evm;
pub mod factory;
pub mod nonevm;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{DepositRecord, DepositStatus};

pub use factory::HandlerFactory;

/// Parameters for [`ChainHandler::check_for_past_deposits`].
#[derive(Debug, Clone, Copy)]
pub struct PastDepositsQuery {
    /// How many minutes back to search.
    pub past_minutes: u64,
    /// The latest known block/checkpoint/slot for this chain.
    pub latest_block: u64,
}

/// The per-destination-chain adapter. Every chain kind (EVM, Starknet,
/// Sui, Solana) implements this same verb set; the control logic in
/// `crate::reconcile` is written entirely against this trait.
#[async_trait]
pub trait ChainHandler: Send + Sync {
    /// Idempotent: construct RPC clients, signers, and contract
    /// bindings. Safe to call more than once.
    async fn initialize(&mut self) -> Result<()>;

    /// Register event callbacks for this chain's deposit-intent and
    /// (for EVM) vault-finalization events.
    async fn setup_listeners(&mut self) -> Result<()>;

    /// Drive a single `QUEUED` record through the initialize ceremony.
    async fn initialize_deposit(&self, record: &DepositRecord) -> Result<DepositRecord>;

    /// Drive a single `INITIALIZED` record through the finalize
    /// ceremony.
    async fn finalize_deposit(&self, record: &DepositRecord) -> Result<DepositRecord>;

    /// Read the on-chain status for a deposit id, if the depositor
    /// contract knows about it.
    async fn check_deposit_status(&self, id: &str) -> Result<Option<DepositStatus>>;

    /// The latest block/checkpoint/slot this handler's L2 access
    /// understands. Off-chain-endpoint-only handlers return `0`.
    async fn get_latest_block(&self) -> Result<u64>;

    /// Drive the `QUEUED -> INITIALIZED` reconcile pass.
    async fn process_initialize_deposits(&self) -> Result<()>;

    /// Drive the `INITIALIZED -> FINALIZED` reconcile pass.
    async fn process_finalize_deposits(&self) -> Result<()>;

    /// Scan for deposit intents missed by live subscription, within
    /// `query.past_minutes` of now.
    async fn check_for_past_deposits(&self, query: PastDepositsQuery) -> Result<()>;

    /// `true` iff this handler subscribes to L2 events directly (as
    /// opposed to consuming an off-chain endpoint). When `false`, the
    /// reconciler skips the historical scan for this handler.
    fn supports_past_deposit_check(&self) -> bool;

    /// A short, human-readable name for logs and metrics.
    fn chain_name(&self) -> &str;
}

#[cfg(any(test, feature = "testing"))]
mockall::mock! {
    /// A mock [`ChainHandler`] for reconciler unit tests.
    pub ChainHandler {}

    #[async_trait]
    impl ChainHandler for ChainHandler {
        async fn initialize(&mut self) -> Result<()>;
        async fn setup_listeners(&mut self) -> Result<()>;
        async fn initialize_deposit(&self, record: &DepositRecord) -> Result<DepositRecord>;
        async fn finalize_deposit(&self, record: &DepositRecord) -> Result<DepositRecord>;
        async fn check_deposit_status(&self, id: &str) -> Result<Option<DepositStatus>>;
        async fn get_latest_block(&self) -> Result<u64>;
        async fn process_initialize_deposits(&self) -> Result<()>;
        async fn process_finalize_deposits(&self) -> Result<()>;
        async fn check_for_past_deposits(&self, query: PastDepositsQuery) -> Result<()>;
        fn supports_past_deposit_check(&self) -> bool;
        fn chain_name(&self) -> &str;
    }
}
