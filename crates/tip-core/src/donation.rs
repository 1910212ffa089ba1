//! # Donation Types
//!
//! Donation intent, checkout session, completion event, and ledger record
//! types for tipjar-rs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback donor name when the payer leaves the field blank
pub const ANONYMOUS_DONOR: &str = "Anonymous";

/// What the payer asked for at checkout-initiation time.
///
/// Never persisted directly: it rides along as opaque session metadata and is
/// reconstructed from the completion event on the far side of the
/// asynchronous gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationIntent {
    /// Donor display name
    pub name: String,

    /// Message to show alongside the donation
    #[serde(default)]
    pub message: String,

    /// Number of donation units, always >= 1
    pub quantity: u32,
}

impl DonationIntent {
    /// Build an intent from optional request fields, applying defaults.
    pub fn new(name: Option<String>, message: Option<String>, quantity: Option<u32>) -> Self {
        Self {
            name: name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| ANONYMOUS_DONOR.to_string()),
            message: message.unwrap_or_default(),
            quantity: quantity.unwrap_or(1).max(1),
        }
    }

    /// Reconstruct an intent from session metadata echoed back by the
    /// gateway.
    ///
    /// The metadata crossed an external system, so missing or non-string
    /// fields are defaulted rather than trusted or rejected. Quantity does
    /// not round-trip; only the confirmed total matters at settlement.
    pub fn from_metadata(metadata: &serde_json::Map<String, serde_json::Value>) -> Self {
        let name = metadata
            .get("name")
            .and_then(|v| v.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS_DONOR)
            .to_string();

        let message = metadata
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Self {
            name,
            message,
            quantity: 1,
        }
    }
}

impl Default for DonationIntent {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

/// A checkout session created by the payment gateway.
///
/// The pipeline holds only the redirect URL after creation; session state
/// lives with the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Gateway's session ID
    pub session_id: String,

    /// URL to redirect the payer to
    pub url: String,

    /// Configured price per donation unit, in minor currency units
    pub unit_amount_cents: i64,

    /// ISO 4217 currency code (lowercase)
    pub currency: String,

    /// The intent embedded as session metadata
    pub intent: DonationIntent,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// Completion event types delivered by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionEventType {
    /// Checkout session reached a terminal successful state
    CheckoutSessionCompleted,
    /// Anything else the gateway is configured to deliver (passthrough)
    Unknown(String),
}

impl std::fmt::Display for CompletionEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionEventType::CheckoutSessionCompleted => {
                write!(f, "checkout.session.completed")
            }
            CompletionEventType::Unknown(other) => write!(f, "{}", other),
        }
    }
}

/// A verified, parsed completion notification.
///
/// Transient: exists only for the duration of one webhook invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionEvent {
    /// Event ID assigned by the gateway; doubles as the idempotency key
    /// for settlement.
    pub event_id: String,

    /// Event type
    pub event_type: CompletionEventType,

    /// Amount the gateway actually collected, in minor currency units
    pub amount_total_cents: i64,

    /// Intent reconstructed from the echoed session metadata
    pub intent: DonationIntent,

    /// Event creation time as reported by the gateway
    pub created_at: DateTime<Utc>,
}

impl CompletionEvent {
    /// Whether this event settles a donation
    pub fn is_settlement(&self) -> bool {
        self.event_type == CompletionEventType::CheckoutSessionCompleted
    }
}

/// The durable record written to the ledger, exactly once per settled
/// completion event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRecord {
    /// Donor display name
    #[serde(default)]
    pub name: String,

    /// Donor message (the ledger omits empty fields on the read path)
    #[serde(default)]
    pub message: String,

    /// Amount in decimal currency units (minor units / 100)
    #[serde(default)]
    pub amount: f64,
}

impl DonationRecord {
    /// Compose a record from a settled completion event.
    ///
    /// The amount always comes from what the gateway confirmed at
    /// settlement, never from the initiation-time request.
    pub fn from_event(event: &CompletionEvent) -> Self {
        Self {
            name: event.intent.name.clone(),
            message: event.intent.message.clone(),
            amount: event.amount_total_cents as f64 / 100.0,
        }
    }
}

/// A donation record as stored by the ledger, with the ledger's own
/// identifiers attached. Read path only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Ledger-assigned record ID
    pub id: String,

    /// The donation fields
    pub fields: DonationRecord,

    /// When the ledger recorded it
    #[serde(rename = "createdTime", skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_intent_defaults() {
        let intent = DonationIntent::new(None, None, None);
        assert_eq!(intent.name, "Anonymous");
        assert_eq!(intent.message, "");
        assert_eq!(intent.quantity, 1);
    }

    #[test]
    fn test_intent_quantity_floor() {
        let intent = DonationIntent::new(None, None, Some(0));
        assert_eq!(intent.quantity, 1);

        let intent = DonationIntent::new(None, None, Some(7));
        assert_eq!(intent.quantity, 7);
    }

    #[test]
    fn test_intent_empty_name_defaults() {
        let intent = DonationIntent::new(Some(String::new()), None, None);
        assert_eq!(intent.name, "Anonymous");
    }

    #[test]
    fn test_intent_from_metadata() {
        let metadata = json!({
            "name": "Ana",
            "message": "Go team!"
        });
        let intent = DonationIntent::from_metadata(metadata.as_object().unwrap());
        assert_eq!(intent.name, "Ana");
        assert_eq!(intent.message, "Go team!");
    }

    #[test]
    fn test_intent_from_malformed_metadata() {
        // Non-string values came back from the external system: default them.
        let metadata = json!({
            "name": 42,
            "message": null
        });
        let intent = DonationIntent::from_metadata(metadata.as_object().unwrap());
        assert_eq!(intent.name, "Anonymous");
        assert_eq!(intent.message, "");
    }

    #[test]
    fn test_record_amount_from_settled_total() {
        let event = CompletionEvent {
            event_id: "evt_1".to_string(),
            event_type: CompletionEventType::CheckoutSessionCompleted,
            amount_total_cents: 500,
            intent: DonationIntent::new(Some("Ana".into()), Some("Go team!".into()), Some(1)),
            created_at: Utc::now(),
        };

        let record = DonationRecord::from_event(&event);
        assert_eq!(record.name, "Ana");
        assert_eq!(record.message, "Go team!");
        assert_eq!(record.amount, 5.00);
    }

    #[test]
    fn test_is_settlement() {
        let mut event = CompletionEvent {
            event_id: "evt_1".to_string(),
            event_type: CompletionEventType::CheckoutSessionCompleted,
            amount_total_cents: 500,
            intent: DonationIntent::default(),
            created_at: Utc::now(),
        };
        assert!(event.is_settlement());

        event.event_type = CompletionEventType::Unknown("invoice.paid".to_string());
        assert!(!event.is_settlement());
    }
}
