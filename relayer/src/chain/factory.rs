//! Constructs the correct [`ChainHandler`] from configuration.

use std::sync::Arc;

use crate::chain::evm::EvmChainHandler;
use crate::chain::nonevm::{offchain_mechanics, GenericPollingHandler};
use crate::chain::ChainHandler;
use crate::config::{ChainConfig, ChainType};
use crate::error::Result;
use crate::store::DepositStore;

/// Builds [`ChainHandler`]s from [`ChainConfig`]s. Exhaustive over
/// [`ChainType`]; an unknown chain type cannot reach this point because
/// `ChainType` is a closed enum validated at config-deserialization time.
pub struct HandlerFactory;

impl HandlerFactory {
    /// Construct the handler matching `config.chain_type`.
    pub fn build(
        config: ChainConfig,
        store: Arc<dyn DepositStore>,
    ) -> Result<Box<dyn ChainHandler>> {
        match config.chain_type {
            ChainType::Evm => Ok(Box::new(EvmChainHandler::new(config, store)?)),
            ChainType::Starknet | ChainType::Sui | ChainType::Solana => {
                let mechanics = offchain_mechanics(&config)?;
                Ok(Box::new(GenericPollingHandler::new(config, store, mechanics)))
            }
        }
    }
}
