//! # Payment Gateway Trait
//!
//! Seam between the settlement pipeline and the hosted-checkout provider.
//! Implementations: Stripe (tip-stripe). The trait keeps the HTTP layer
//! testable with an in-process fake.

use crate::donation::{CheckoutSession, CompletionEvent, DonationIntent};
use crate::error::DonationResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for the payment gateway integration.
///
/// Checkout initiation and settlement are decoupled in time; the only link
/// between them is the metadata embedded at session creation and echoed back
/// in the completion event.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session and return the redirect URL.
    ///
    /// # Arguments
    /// * `intent` - Donor name/message (embedded as metadata) and quantity
    /// * `unit_amount_cents` - Configured price per donation unit; never
    ///   user-supplied
    /// * `success_url` - Redirect after successful payment
    /// * `cancel_url` - Redirect if the payer abandons the flow
    async fn create_session(
        &self,
        intent: &DonationIntent,
        unit_amount_cents: i64,
        success_url: &str,
        cancel_url: &str,
    ) -> DonationResult<CheckoutSession>;

    /// Verify a webhook signature and parse the event.
    ///
    /// `payload` must be the raw, unparsed request body; the signature is
    /// byte-exact over the wire payload, and any re-serialization upstream
    /// breaks verification. Unknown event types verify successfully and are
    /// filtered by the caller.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> DonationResult<CompletionEvent>;

    /// Gateway name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedGateway = Arc<dyn PaymentGateway>;
