//! # Airtable Ledger Client
//!
//! Raw client for the Airtable records API: one remote write per append, one
//! GET for the display read path. No retry logic and no deduplication of its
//! own; wrap it in [`crate::DedupLedger`] for at-most-once settlement.

use crate::config::LedgerConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tip_core::{
    AppendOutcome, DonationError, DonationLedger, DonationRecord, DonationResult, LedgerEntry,
};
use tracing::{debug, error, info, instrument};

/// Airtable-backed donation ledger
pub struct AirtableLedger {
    config: LedgerConfig,
    client: reqwest::Client,
}

impl AirtableLedger {
    /// Create a new ledger client from an explicit config.
    ///
    /// The client timeout bounds the ledger write so a slow Airtable call
    /// cannot hold the inbound webhook connection open indefinitely.
    pub fn new(config: LedgerConfig) -> DonationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| DonationError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> DonationResult<Self> {
        let config = LedgerConfig::from_env()?;
        Self::new(config)
    }
}

#[async_trait]
impl DonationLedger for AirtableLedger {
    #[instrument(skip(self, record), fields(key = %idempotency_key))]
    async fn append(
        &self,
        idempotency_key: &str,
        record: &DonationRecord,
    ) -> DonationResult<AppendOutcome> {
        let body = AppendRequest {
            records: vec![AppendRecord {
                fields: record.clone(),
            }],
        };

        debug!("Appending donation record: amount={}", record.amount);

        let response = self
            .client
            .post(self.config.table_url())
            .header("Authorization", self.config.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(|e| DonationError::LedgerWrite(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Airtable append failed: status={}, body={}", status, body);
            return Err(DonationError::LedgerWrite(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        info!("Recorded donation: name={}", record.name);
        Ok(AppendOutcome::Appended)
    }

    #[instrument(skip(self))]
    async fn list(&self, limit: u32) -> DonationResult<Vec<LedgerEntry>> {
        let response = self
            .client
            .get(self.config.table_url())
            .header("Authorization", self.config.auth_header())
            .query(&[("maxRecords", limit.to_string())])
            .send()
            .await
            .map_err(|e| DonationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Airtable list failed: status={}, body={}", status, body);
            return Err(DonationError::Network(format!("HTTP {}: {}", status, body)));
        }

        let listing: ListResponse = response
            .json()
            .await
            .map_err(|e| DonationError::Serialization(format!("Airtable response: {}", e)))?;

        Ok(listing.records)
    }
}

#[derive(Debug, Serialize)]
struct AppendRequest {
    records: Vec<AppendRecord>,
}

#[derive(Debug, Serialize)]
struct AppendRecord {
    fields: DonationRecord,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<LedgerEntry>,
}
