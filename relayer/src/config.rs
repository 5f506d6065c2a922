//! Relayer configuration: the per-chain configuration object from the
//! specification, layered from a TOML file and environment variables the
//! same way the teacher's `config::Settings` layers a base TOML file with
//! environment overrides.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The four destination-chain kinds this relayer knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ChainType {
    /// An EVM-compatible L2 rollup.
    Evm,
    /// Starknet.
    Starknet,
    /// Sui.
    Sui,
    /// Solana.
    Solana,
}

/// Per-chain configuration, matching the configuration object in the
/// specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Human-readable name for this chain (used in logs and metrics).
    pub chain_name: String,
    /// Which handler implementation to construct.
    pub chain_type: ChainType,
    /// L1 (Ethereum) JSON-RPC endpoint.
    pub l1_rpc: String,
    /// L2 JSON-RPC or equivalent endpoint, absent for off-chain-endpoint
    /// only chains.
    #[serde(default)]
    pub l2_rpc: Option<String>,
    /// Address of the L1 depositor contract.
    pub l1_contract_address: String,
    /// Address of the L2 depositor contract, if applicable.
    #[serde(default)]
    pub l2_contract_address: Option<String>,
    /// Address of the TBTCVault contract.
    pub vault_address: String,
    /// Hex-encoded private key for the relayer's signing wallet.
    #[serde(default)]
    pub private_key: Option<String>,
    /// Whether this chain is driven via an off-chain endpoint rather
    /// than direct L2 event subscription.
    #[serde(default)]
    pub use_endpoint: bool,
    /// Polling URL for the off-chain endpoint, required when
    /// `use_endpoint` is set.
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Lower bound for this chain's historical backfill binary search,
    /// copied from [`Settings::l2_start_block`] at load time.
    #[serde(default)]
    pub start_block: u64,
}

/// Top-level relayer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Deposit store directory (`JSON_PATH`).
    #[serde(default = "default_json_path")]
    pub json_path: String,
    /// Lower bound for the backfill binary search (`L2_START_BLOCK`).
    #[serde(default)]
    pub l2_start_block: u64,
    /// How many minutes back the past-scan reconciler looks.
    #[serde(default = "default_backfill_minutes")]
    pub backfill_minutes: u64,
    /// Configured destination chains.
    pub chains: Vec<ChainConfig>,
}

fn default_json_path() -> String {
    "./data/".to_string()
}

fn default_backfill_minutes() -> u64 {
    10
}

impl Settings {
    /// Load settings from an optional TOML file overlaid with
    /// environment variables, following the `JSON_PATH`, `L2_START_BLOCK`,
    /// `PRIVATE_KEY`, `L1_RPC`, `L2_RPC` names from the specification,
    /// plus a `RELAYER_` prefix for everything else.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder
            .add_source(
                config::Environment::with_prefix("RELAYER")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("json_path", std::env::var("JSON_PATH").ok())
            .map_err(config_err)?
            .set_override_option(
                "l2_start_block",
                std::env::var("L2_START_BLOCK")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok()),
            )
            .map_err(config_err)?;

        let mut settings: Settings = builder
            .build()
            .map_err(config_err)?
            .try_deserialize()
            .map_err(config_err)?;

        settings.propagate_start_block();
        settings.validate()?;
        Ok(settings)
    }

    /// Construct settings directly from a set of chain configs, bypassing
    /// file/env loading. Used by tests and by callers embedding the
    /// relayer as a library.
    pub fn new(chains: Vec<ChainConfig>) -> Self {
        let mut settings = Self {
            json_path: default_json_path(),
            l2_start_block: 0,
            backfill_minutes: default_backfill_minutes(),
            chains,
        };
        settings.propagate_start_block();
        settings
    }

    /// Copy `l2_start_block` down onto every chain's `start_block`, so
    /// handlers only ever need to read their own [`ChainConfig`].
    fn propagate_start_block(&mut self) {
        for chain in &mut self.chains {
            chain.start_block = self.l2_start_block;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.chains.is_empty() {
            return Err(Error::Config("at least one chain must be configured".into()));
        }
        for chain in &self.chains {
            if chain.chain_type == ChainType::Evm && chain.l2_rpc.is_none() && !chain.use_endpoint {
                return Err(Error::Config(format!(
                    "chain {}: EVM handlers need either l2_rpc or use_endpoint",
                    chain.chain_name
                )));
            }
            if chain.use_endpoint && chain.endpoint_url.is_none() {
                return Err(Error::Config(format!(
                    "chain {}: use_endpoint requires endpoint_url",
                    chain.chain_name
                )));
            }
        }
        Ok(())
    }
}

fn config_err(err: impl std::fmt::Display) -> Error {
    Error::Config(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chain() -> ChainConfig {
        ChainConfig {
            chain_name: "base".into(),
            chain_type: ChainType::Evm,
            l1_rpc: "http://localhost:8545".into(),
            l2_rpc: Some("http://localhost:9545".into()),
            l1_contract_address: "0x0000000000000000000000000000000000000001".into(),
            l2_contract_address: Some("0x0000000000000000000000000000000000000002".into()),
            vault_address: "0x0000000000000000000000000000000000000003".into(),
            private_key: Some("0x01".into()),
            use_endpoint: false,
            endpoint_url: None,
            start_block: 0,
        }
    }

    #[test]
    fn rejects_empty_chain_list() {
        let settings = Settings::new(vec![]);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_evm_without_l2_rpc_or_endpoint() {
        let mut chain = sample_chain();
        chain.l2_rpc = None;
        let settings = Settings::new(vec![chain]);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn accepts_endpoint_backed_chain_without_l2_rpc() {
        let mut chain = sample_chain();
        chain.chain_type = ChainType::Starknet;
        chain.l2_rpc = None;
        chain.use_endpoint = true;
        chain.endpoint_url = Some("https://example.invalid/deposits".into());
        let settings = Settings::new(vec![chain]);
        assert!(settings.validate().is_ok());
    }
}
