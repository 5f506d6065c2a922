//! Starknet mechanics: deposit intents and ceremony steps are relayed
//! through an off-chain HTTP endpoint rather than a direct Starknet RPC
//! client, mirroring how the specification describes this destination.

use async_trait::async_trait;
use serde::Deserialize;

use crate::chain::nonevm::ChainMechanics;
use crate::chain::PastDepositsQuery;
use crate::error::{Error, Result};
use crate::model::{DepositRecord, DepositStatus};

/// Talks to a Starknet deposit-relayer endpoint over HTTP.
pub struct StarknetMechanics {
    endpoint_url: String,
    client: reqwest::Client,
}

impl StarknetMechanics {
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

#[derive(Debug, Deserialize)]
struct EndpointStatus {
    status: Option<u8>,
}

#[async_trait]
impl ChainMechanics for StarknetMechanics {
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

/// Shared HTTP plumbing for the `initialize`/`finalize` step endpoints,
/// which all three off-chain mechanics implementations use identically.
pub(super) async fn submit_step(
    client: &reqwest::Client,
    endpoint_url: &str,
    step: &str,
    record: &DepositRecord,
) -> Result<DepositRecord> {
    let url = format!("{endpoint_url}/deposits/{}/{step}", record.id);
    let mut updated = record.clone();

    match client.post(&url).json(record).send().await {
        Ok(response) if response.status().is_success() => match response.json::<DepositRecord>().await {
            Ok(returned) => Ok(returned),
            Err(error) => {
                crate::model::record_failure(&mut updated, error.to_string(), now_ms());
                Ok(updated)
            }
        },
        Ok(response) => {
            crate::model::record_failure(
                &mut updated,
                format!("endpoint returned {}", response.status()),
                now_ms(),
            );
            Ok(updated)
        }
        Err(error) => {
            crate::model::record_failure(&mut updated, error.to_string(), now_ms());
            Ok(updated)
        }
    }
}

pub(super) async fn remote_status(
    client: &reqwest::Client,
    endpoint_url: &str,
    id: &str,
) -> Result<Option<DepositStatus>> {
    let url = format!("{endpoint_url}/deposits/{id}/status");
    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(_) => return Ok(None),
    };
    let body: EndpointStatus = match response.json().await {
        Ok(body) => body,
        Err(_) => return Ok(None),
    };
    match body.status {
        Some(raw) => Ok(DepositStatus::from_onchain(raw as u64).ok()),
        None => Ok(None),
    }
}

fn now_ms() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp() * 1000
}
