//! # Settlement Deduplication
//!
//! Thin layer in front of the raw ledger client that makes `append`
//! at-most-once per idempotency key. The gateway delivers completion events
//! at-least-once, so redeliveries (including concurrent ones) must not
//! produce duplicate donation records.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use tip_core::{
    AppendOutcome, BoxedLedger, DonationLedger, DonationRecord, DonationResult, LedgerEntry,
};
use tracing::info;

/// Deduplicating wrapper around a [`DonationLedger`].
///
/// Keys are reserved before the write and released on failure, so a failed
/// append stays retryable while concurrent deliveries of the same event
/// cannot both reach the ledger.
pub struct DedupLedger {
    inner: BoxedLedger,
    seen: Mutex<HashSet<String>>,
}

impl DedupLedger {
    pub fn new(inner: BoxedLedger) -> Self {
        Self {
            inner,
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Number of settled keys currently tracked
    pub fn settled_count(&self) -> usize {
        self.seen.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl DonationLedger for DedupLedger {
    async fn append(
        &self,
        idempotency_key: &str,
        record: &DonationRecord,
    ) -> DonationResult<AppendOutcome> {
        // Reserve the key before writing. The lock is never held across the
        // await below.
        {
            let mut seen = self
                .seen
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if !seen.insert(idempotency_key.to_string()) {
                info!("Duplicate settlement delivery, skipping: {}", idempotency_key);
                return Ok(AppendOutcome::Duplicate);
            }
        }

        match self.inner.append(idempotency_key, record).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                // Release the reservation so a redelivery can retry the write
                let mut seen = self
                    .seen
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                seen.remove(idempotency_key);
                Err(e)
            }
        }
    }

    async fn list(&self, limit: u32) -> DonationResult<Vec<LedgerEntry>> {
        self.inner.list(limit).await
    }
}
