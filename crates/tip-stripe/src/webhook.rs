//! # Stripe Webhook Verification
//!
//! Signature verification and event parsing for Stripe webhook
//! notifications.
//!
//! The signature is HMAC-SHA256 over `"{timestamp}.{raw_body}"` — byte-exact
//! over the wire payload. Callers must hand this module the raw request body;
//! decoding and re-serializing JSON upstream breaks verification.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tip_core::{CompletionEvent, CompletionEventType, DonationError, DonationIntent};
use tracing::debug;

/// Maximum age of a signed payload before it is rejected as a replay
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Verify a webhook payload against the signing secret and parse it into a
/// typed event.
///
/// Verification only authenticates the payload; it accepts any event type.
/// Deciding whether to act on the event is the settlement handler's job.
pub fn verify_event(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
) -> Result<CompletionEvent, DonationError> {
    let sig_parts = parse_signature_header(signature_header)?;

    // Reject stale timestamps (replay window)
    let now = Utc::now().timestamp();
    if (now - sig_parts.timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(DonationError::InvalidSignature(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    // Signed payload is "{t}.{raw body}" — raw bytes, never re-serialized
    let signed_payload = format!(
        "{}.{}",
        sig_parts.timestamp,
        String::from_utf8_lossy(payload)
    );
    let expected_sig = compute_hmac_sha256(secret, &signed_payload);

    let valid = sig_parts
        .signatures
        .iter()
        .any(|sig| constant_time_compare(sig, &expected_sig));

    if !valid {
        return Err(DonationError::InvalidSignature(
            "Signature mismatch".to_string(),
        ));
    }

    parse_event(payload)
}

/// Parse an authenticated payload into a `CompletionEvent`.
fn parse_event(payload: &[u8]) -> Result<CompletionEvent, DonationError> {
    let event: StripeWebhookEvent = serde_json::from_slice(payload)
        .map_err(|e| DonationError::WebhookParse(format!("Failed to parse webhook: {}", e)))?;

    debug!("Verified Stripe webhook: type={}", event.event_type);

    let event_type = match event.event_type.as_str() {
        "checkout.session.completed" => CompletionEventType::CheckoutSessionCompleted,
        other => CompletionEventType::Unknown(other.to_string()),
    };

    let empty = serde_json::Map::new();
    let metadata = event
        .data
        .object
        .get("metadata")
        .and_then(|m| m.as_object())
        .unwrap_or(&empty);

    let intent = DonationIntent::from_metadata(metadata);

    let amount_total_cents = event
        .data
        .object
        .get("amount_total")
        .and_then(|v| v.as_i64())
        .unwrap_or(0);

    Ok(CompletionEvent {
        event_id: event.id,
        event_type,
        amount_total_cents,
        intent,
        created_at: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
    })
}

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

/// Parse the `stripe-signature` header: `t=<unix>,v1=<hex>[,v1=<hex>...]`
fn parse_signature_header(header: &str) -> Result<SignatureHeader, DonationError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let kv: Vec<&str> = part.splitn(2, '=').collect();
        if kv.len() != 2 {
            continue;
        }
        match kv[0] {
            "t" => {
                timestamp = kv[1].parse().ok();
            }
            "v1" => {
                signatures.push(kv[1].to_string());
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        DonationError::InvalidSignature("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(DonationError::InvalidSignature(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn compute_hmac_sha256(secret: &str, message: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    let result = mac.finalize();
    hex::encode(result.into_bytes())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "whsec_test_secret";

    /// Sign a payload the way Stripe does
    fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let sig = compute_hmac_sha256(secret, &signed_payload);
        format!("t={},v1={}", timestamp, sig)
    }

    fn completed_event_body() -> Vec<u8> {
        json!({
            "id": "evt_test_123",
            "type": "checkout.session.completed",
            "created": Utc::now().timestamp(),
            "data": {
                "object": {
                    "id": "cs_test_456",
                    "amount_total": 500,
                    "metadata": {
                        "name": "Ana",
                        "message": "Go team!"
                    }
                }
            }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_verify_valid_signature() {
        let body = completed_event_body();
        let header = sign(&body, SECRET, Utc::now().timestamp());

        let event = verify_event(&body, &header, SECRET).unwrap();
        assert_eq!(event.event_id, "evt_test_123");
        assert!(event.is_settlement());
        assert_eq!(event.amount_total_cents, 500);
        assert_eq!(event.intent.name, "Ana");
        assert_eq!(event.intent.message, "Go team!");
    }

    #[test]
    fn test_verify_tampered_body_fails() {
        let body = completed_event_body();
        let header = sign(&body, SECRET, Utc::now().timestamp());

        // Flip one byte
        let mut tampered = body.clone();
        let last = tampered.len() - 2;
        tampered[last] ^= 0x01;

        let err = verify_event(&tampered, &header, SECRET).unwrap_err();
        assert!(matches!(err, DonationError::InvalidSignature(_)));
    }

    #[test]
    fn test_verify_wrong_secret_fails() {
        let body = completed_event_body();
        let header = sign(&body, "whsec_other", Utc::now().timestamp());

        let err = verify_event(&body, &header, SECRET).unwrap_err();
        assert!(matches!(err, DonationError::InvalidSignature(_)));
    }

    #[test]
    fn test_verify_stale_timestamp_fails() {
        let body = completed_event_body();
        let stale = Utc::now().timestamp() - SIGNATURE_TOLERANCE_SECS - 60;
        let header = sign(&body, SECRET, stale);

        let err = verify_event(&body, &header, SECRET).unwrap_err();
        assert!(matches!(err, DonationError::InvalidSignature(_)));
    }

    #[test]
    fn test_unknown_event_type_verifies() {
        // Authenticity and actionability are separate concerns: an unknown
        // event type still verifies here and is filtered by the handler.
        let body = json!({
            "id": "evt_test_999",
            "type": "invoice.paid",
            "created": Utc::now().timestamp(),
            "data": { "object": {} }
        })
        .to_string()
        .into_bytes();
        let header = sign(&body, SECRET, Utc::now().timestamp());

        let event = verify_event(&body, &header, SECRET).unwrap();
        assert!(!event.is_settlement());
        assert_eq!(
            event.event_type,
            CompletionEventType::Unknown("invoice.paid".to_string())
        );
    }

    #[test]
    fn test_missing_metadata_defaults() {
        let body = json!({
            "id": "evt_test_777",
            "type": "checkout.session.completed",
            "created": Utc::now().timestamp(),
            "data": {
                "object": { "amount_total": 1500 }
            }
        })
        .to_string()
        .into_bytes();
        let header = sign(&body, SECRET, Utc::now().timestamp());

        let event = verify_event(&body, &header, SECRET).unwrap();
        assert_eq!(event.intent.name, "Anonymous");
        assert_eq!(event.intent.message, "");
        assert_eq!(event.amount_total_cents, 1500);
    }

    #[test]
    fn test_parse_signature_header() {
        let header = "t=1234567890,v1=abc123,v1=def456";
        let parsed = parse_signature_header(header).unwrap();

        assert_eq!(parsed.timestamp, 1234567890);
        assert_eq!(parsed.signatures.len(), 2);
        assert_eq!(parsed.signatures[0], "abc123");
    }

    #[test]
    fn test_signature_header_missing_timestamp() {
        let err = parse_signature_header("v1=abc123").unwrap_err();
        assert!(matches!(err, DonationError::InvalidSignature(_)));
    }

    #[test]
    fn test_signature_header_no_v1() {
        let err = parse_signature_header("t=1234567890,v0=legacy").unwrap_err();
        assert!(matches!(err, DonationError::InvalidSignature(_)));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
