//! # tip-core
//!
//! Core types and traits for the tipjar-rs donation settlement pipeline.
//!
//! This crate provides:
//! - `DonationIntent`, `CheckoutSession`, `CompletionEvent`, and
//!   `DonationRecord` for the checkout/settlement flow
//! - `PaymentGateway` trait for the hosted-checkout provider
//! - `DonationLedger` trait for the external donation store
//! - `DonationError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use tip_core::{DonationIntent, DonationRecord, PaymentGateway};
//!
//! // Build an intent from the initiation request (defaults applied)
//! let intent = DonationIntent::new(Some("Ana".into()), Some("Go team!".into()), Some(1));
//!
//! // Create a checkout session; redirect the payer to session.url
//! let session = gateway
//!     .create_session(&intent, 500, success_url, cancel_url)
//!     .await?;
//!
//! // Later, on the webhook: verify over the RAW body, then persist
//! let event = gateway.verify_webhook(&body, signature).await?;
//! if event.is_settlement() {
//!     ledger.append(&event.event_id, &DonationRecord::from_event(&event)).await?;
//! }
//! ```

pub mod donation;
pub mod error;
pub mod gateway;
pub mod ledger;

// Re-exports for convenience
pub use donation::{
    CheckoutSession, CompletionEvent, CompletionEventType, DonationIntent, DonationRecord,
    LedgerEntry, ANONYMOUS_DONOR,
};
pub use error::{DonationError, DonationResult};
pub use gateway::{BoxedGateway, PaymentGateway};
pub use ledger::{AppendOutcome, BoxedLedger, DonationLedger};
