//! # Donation Ledger Trait
//!
//! Seam between the settlement pipeline and the external donation store.
//! Implementations: Airtable (tip-ledger), plus a dedup layer in front of it.

use crate::donation::{DonationRecord, LedgerEntry};
use crate::error::DonationResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of an append, so callers can tell a fresh write from a
/// deduplicated redelivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Record written to the ledger
    Appended,
    /// The idempotency key was already settled; nothing written
    Duplicate,
}

/// External, authoritative store of recorded donations.
///
/// Append-mostly; the read path exists only for display.
#[async_trait]
pub trait DonationLedger: Send + Sync {
    /// Append one donation record.
    ///
    /// `idempotency_key` is the gateway's event id. The raw ledger client
    /// performs a single remote write and does not deduplicate; wrap it in
    /// a dedup layer to get at-most-once semantics under gateway redelivery.
    async fn append(
        &self,
        idempotency_key: &str,
        record: &DonationRecord,
    ) -> DonationResult<AppendOutcome>;

    /// Read the most recent records, in the ledger's native ordering.
    async fn list(&self, limit: u32) -> DonationResult<Vec<LedgerEntry>>;
}

/// Type alias for a shared ledger (dynamic dispatch)
pub type BoxedLedger = Arc<dyn DonationLedger>;
