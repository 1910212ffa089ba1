//! # tip-stripe
//!
//! Stripe gateway client for tipjar-rs.
//!
//! Two concerns live here:
//!
//! 1. **StripeGateway::create_session** - Checkout Sessions API
//!    - Single card line item at the configured unit amount
//!    - Donor name/message embedded as session metadata
//!    - Idempotency-Key header on creation
//!
//! 2. **Webhook verification** - HMAC-SHA256 over the raw body
//!    - Timestamp tolerance against replays
//!    - Constant-time signature comparison
//!    - Typed `CompletionEvent` out the other side
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tip_stripe::StripeGateway;
//! use tip_core::{DonationIntent, PaymentGateway};
//!
//! let gateway = StripeGateway::from_env()?;
//!
//! let session = gateway
//!     .create_session(&intent, 500, "https://example.com/thankyou", "https://example.com/cancel")
//!     .await?;
//!
//! // Redirect the payer to session.url
//! ```

pub mod checkout;
pub mod config;
pub mod webhook;

// Re-exports
pub use checkout::StripeGateway;
pub use config::StripeConfig;
pub use webhook::{verify_event, SIGNATURE_TOLERANCE_SECS};
