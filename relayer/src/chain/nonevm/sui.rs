//! Sui mechanics: same off-chain relayer-endpoint shape as Starknet, see
//! [`super::starknet`] for the shared HTTP plumbing.

use async_trait::async_trait;
use serde::Deserialize;

use crate::chain::nonevm::starknet::{remote_status, submit_step};
use crate::chain::nonevm::ChainMechanics;
use crate::chain::PastDepositsQuery;
use crate::error::{Error, Result};
use crate::model::{DepositRecord, DepositStatus};

/// Talks to a Sui deposit-relayer endpoint over HTTP.
pub struct SuiMechanics {
    endpoint_url: String,
    client: reqwest::Client,
}

impl SuiMechanics {
    /// Construct mechanics targeting `endpoint_url`.
    pub fn new(endpoint_url: String) -> Self {
        Self {
            endpoint_url,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EndpointRecords {
    deposits: Vec<DepositRecord>,
}

#[async_trait]
impl ChainMechanics for SuiMechanics {
    async fn poll_new_deposits(&self) -> Result<Vec<DepositRecord>> {
        let url = format!("{}/deposits/new", self.endpoint_url);
        let body: EndpointRecords = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::RpcTransient(e.to_string()))?
            .json()
            .await
            .map_err(|e| Error::RpcTransient(e.to_string()))?;
        Ok(body.deposits)
    }

    async fn submit_initialize(&self, record: &DepositRecord) -> Result<DepositRecord> {
        submit_step(&self.client, &self.endpoint_url, "initialize", record).await
    }

    async fn submit_finalize(&self, record: &DepositRecord) -> Result<DepositRecord> {
        submit_step(&self.client, &self.endpoint_url, "finalize", record).await
    }

    async fn remote_status(&self, id: &str) -> Result<Option<DepositStatus>> {
        remote_status(&self.client, &self.endpoint_url, id).await
    }

    async fn latest_checkpoint(&self) -> Result<u64> {
        Ok(0)
    }

    async fn poll_past_deposits(&self, query: PastDepositsQuery) -> Result<Vec<DepositRecord>> {
        let url = format!(
            "{}/deposits/past?minutes={}",
            self.endpoint_url, query.past_minutes
        );
        let body: EndpointRecords = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::RpcTransient(e.to_string()))?
            .json()
            .await
            .map_err(|e| Error::RpcTransient(e.to_string()))?;
        Ok(body.deposits)
    }
}
