//! # tip-ledger
//!
//! Airtable donation ledger client for tipjar-rs.
//!
//! - **AirtableLedger** - raw client: one POST per append, one GET for the
//!   display read path, bounded by a client timeout. No retries, no
//!   deduplication.
//! - **DedupLedger** - wraps any `DonationLedger` and makes `append`
//!   at-most-once per gateway event id, which is what the settlement handler
//!   uses.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tip_ledger::{AirtableLedger, DedupLedger};
//!
//! let raw = AirtableLedger::from_env()?;
//! let ledger = DedupLedger::new(Arc::new(raw));
//! ledger.append(&event.event_id, &record).await?;
//! ```

pub mod airtable;
pub mod config;
pub mod dedup;

// Re-exports
pub use airtable::AirtableLedger;
pub use config::LedgerConfig;
pub use dedup::DedupLedger;
