//! # Request Handlers
//!
//! Axum request handlers for the donation API: checkout initiation, the
//! webhook settlement pipeline, and the donation listing read path.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tip_core::{AppendOutcome, DonationError, DonationIntent, DonationRecord};
use tracing::{error, info, instrument, warn};

/// How many recent donations the listing endpoint returns
const DONATION_LISTING_LIMIT: u32 = 3;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Checkout initiation request; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Donor display name (defaults to "Anonymous")
    #[serde(default)]
    pub name: Option<String>,
    /// Message to display with the donation (defaults to empty)
    #[serde(default)]
    pub message: Option<String>,
    /// Number of donation units (defaults to 1)
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// Checkout initiation response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCheckoutResponse {
    /// Hosted checkout URL (redirect the payer here)
    pub url: String,
}

/// Short message body used by the webhook endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn error_to_response(err: &DonationError) -> (StatusCode, Json<MessageResponse>) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(MessageResponse::new(err.to_string())))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "tipjar",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a donation checkout session.
///
/// The unit amount is the configured constant; only name, message, and
/// quantity come from the request. Any failure collapses to a generic
/// payer-facing message so internal error detail never leaks.
#[instrument(skip(state, request))]
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<Json<CreateCheckoutResponse>, (StatusCode, Json<MessageResponse>)> {
    let intent = DonationIntent::new(request.name, request.message, request.quantity);

    let session = state
        .gateway
        .create_session(
            &intent,
            state.config.donation_unit_cents,
            &state.config.success_url(),
            &state.config.cancel_url(),
        )
        .await
        .map_err(|e| {
            error!("Failed to create checkout session: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageResponse::new("Something went wrong")),
            )
        })?;

    info!("Created checkout session: {}", session.session_id);

    Ok(Json(CreateCheckoutResponse { url: session.url }))
}

/// Settle a donation from a Stripe completion webhook.
///
/// The body must stay raw bytes until verification: the signature is
/// byte-exact over the wire payload. Pipeline per notification:
/// require signature -> verify -> filter event type -> extract fields ->
/// persist (deduplicated by event id) -> respond.
#[instrument(skip(state, headers, body))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MessageResponse>, (StatusCode, Json<MessageResponse>)> {
    // Fail fast on a missing header; nothing to verify without it
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| error_to_response(&DonationError::MissingSignature))?;

    let event = state
        .gateway
        .verify_webhook(&body, signature)
        .await
        .map_err(|e| {
            error!("Webhook verification failed: {}", e);
            error_to_response(&e)
        })?;

    // Authentic but not actionable: Stripe delivers every subscribed event
    // type here, so this is expected traffic, not an incident.
    if !event.is_settlement() {
        let err = DonationError::UnhandledEventType(event.event_type.to_string());
        info!("Ignoring webhook event: {}", err);
        return Err(error_to_response(&err));
    }

    let record = DonationRecord::from_event(&event);

    info!(
        "Settling donation: event={}, amount={}",
        event.event_id, record.amount
    );

    // Persist before acknowledging. The event id keys the dedup layer, so a
    // gateway redelivery acks without a second write, while a failed write
    // returns a retryable status and stays settleable.
    let outcome = state
        .ledger
        .append(&event.event_id, &record)
        .await
        .map_err(|e| {
            error!("Ledger write failed: {}", e);
            error_to_response(&e)
        })?;

    if outcome == AppendOutcome::Duplicate {
        warn!("Duplicate completion event acknowledged: {}", event.event_id);
    }

    Ok(Json(MessageResponse::new("Success")))
}

/// List the most recent donations, in the ledger's native ordering
#[instrument(skip(state))]
pub async fn list_donations(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, Json<MessageResponse>)> {
    let entries = state
        .ledger
        .list(DONATION_LISTING_LIMIT)
        .await
        .map_err(|e| {
            error!("Failed to list donations: {}", e);
            error_to_response(&e)
        })?;

    Ok(Json(entries))
}
