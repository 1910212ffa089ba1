//! # Donation Error Types
//!
//! Typed error handling for the tipjar donation pipeline.
//! All pipeline operations return `Result<T, DonationError>`.

use thiserror::Error;

/// Core error type for all donation pipeline operations
#[derive(Debug, Error)]
pub enum DonationError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Webhook arrived without a signature header
    #[error("Missing signature header")]
    MissingSignature,

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    InvalidSignature(String),

    /// Webhook payload parsing error (after a valid signature)
    #[error("Webhook parse error: {0}")]
    WebhookParse(String),

    /// Event type we do not act on (expected traffic, not an incident)
    #[error("Unhandled event type: {0}")]
    UnhandledEventType(String),

    /// Payment gateway API error (session creation failed or returned no URL)
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Network/HTTP error communicating with an external service
    #[error("Network error: {0}")]
    Network(String),

    /// Ledger append failed; the notification source should redeliver
    #[error("Ledger write failed: {0}")]
    LedgerWrite(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DonationError {
    /// Returns true if a redelivery of the same request may succeed.
    ///
    /// The webhook endpoint uses this to pick a status class that triggers
    /// the gateway's retry schedule only for transient downstream failures.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DonationError::Network(_) | DonationError::LedgerWrite(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            DonationError::Configuration(_) => 500,
            DonationError::InvalidRequest(_) => 400,
            DonationError::MissingSignature => 400,
            // Server error class: a gateway redelivery of the pristine
            // payload may verify.
            DonationError::InvalidSignature(_) => 500,
            DonationError::WebhookParse(_) => 400,
            DonationError::UnhandledEventType(_) => 400,
            DonationError::Gateway(_) => 500,
            DonationError::Network(_) => 500,
            DonationError::LedgerWrite(_) => 503,
            DonationError::Serialization(_) => 500,
        }
    }
}

/// Result type alias for donation pipeline operations
pub type DonationResult<T> = Result<T, DonationError>;
