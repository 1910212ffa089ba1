//! # Stripe Checkout Sessions
//!
//! Creates hosted checkout sessions for one-time donations via the Stripe
//! Checkout Sessions API, and verifies the completion webhooks Stripe sends
//! back.

use crate::config::StripeConfig;
use crate::webhook;
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tip_core::{
    CheckoutSession, CompletionEvent, DonationError, DonationIntent, DonationResult,
    PaymentGateway,
};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Donation checkout currency. Multi-currency is out of scope.
const DONATION_CURRENCY: &str = "usd";

/// Display name for the single line item on the hosted page
const DONATION_PRODUCT_NAME: &str = "Donation";

/// Stripe payment gateway
///
/// Uses Stripe's hosted checkout page; the service never touches card data.
pub struct StripeGateway {
    config: StripeConfig,
    client: reqwest::Client,
}

impl StripeGateway {
    /// Create a new gateway from an explicit config
    pub fn new(config: StripeConfig) -> DonationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| DonationError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> DonationResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    /// Build the form body for the Checkout Sessions API.
    ///
    /// One card line item: the configured unit amount with the intent's
    /// quantity passed through, and the donor's name/message embedded as
    /// opaque metadata that Stripe echoes back in the completion event.
    fn build_session_params(
        intent: &DonationIntent,
        unit_amount_cents: i64,
        success_url: &str,
        cancel_url: &str,
    ) -> Vec<(String, String)> {
        vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
            (
                "payment_method_types[0]".to_string(),
                "card".to_string(),
            ),
            (
                "line_items[0][price_data][currency]".to_string(),
                DONATION_CURRENCY.to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                unit_amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                DONATION_PRODUCT_NAME.to_string(),
            ),
            (
                "line_items[0][quantity]".to_string(),
                intent.quantity.to_string(),
            ),
            ("metadata[name]".to_string(), intent.name.clone()),
            ("metadata[message]".to_string(), intent.message.clone()),
        ]
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, intent), fields(quantity = intent.quantity))]
    async fn create_session(
        &self,
        intent: &DonationIntent,
        unit_amount_cents: i64,
        success_url: &str,
        cancel_url: &str,
    ) -> DonationResult<CheckoutSession> {
        let form_params =
            Self::build_session_params(intent, unit_amount_cents, success_url, cancel_url);

        debug!(
            "Creating Stripe checkout session: unit_amount={}, quantity={}",
            unit_amount_cents, intent.quantity
        );

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let idempotency_key = Uuid::new_v4().to_string();

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &idempotency_key)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| DonationError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DonationError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(DonationError::Gateway(error_response.error.message));
            }

            return Err(DonationError::Gateway(format!("HTTP {}: {}", status, body)));
        }

        let session_response: StripeCheckoutSessionResponse = serde_json::from_str(&body)
            .map_err(|e| {
                DonationError::Serialization(format!("Failed to parse Stripe response: {}", e))
            })?;

        // A 2xx response with no URL is still a failed initiation; it must
        // not be conflated with success.
        let checkout_url = session_response.url.ok_or_else(|| {
            DonationError::Gateway("Session created but no checkout URL returned".to_string())
        })?;

        info!(
            "Created Stripe checkout session: id={}",
            session_response.id
        );

        Ok(CheckoutSession {
            session_id: session_response.id,
            url: checkout_url,
            unit_amount_cents,
            currency: DONATION_CURRENCY.to_string(),
            intent: intent.clone(),
            created_at: Utc::now(),
        })
    }

    #[instrument(skip(self, payload, signature))]
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> DonationResult<CompletionEvent> {
        webhook::verify_event(payload, signature, &self.config.webhook_secret)
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway_for(server: &MockServer) -> StripeGateway {
        let config =
            StripeConfig::new("sk_test_abc", "whsec_test").with_api_base_url(server.uri());
        StripeGateway::new(config).unwrap()
    }

    fn ana_intent() -> DonationIntent {
        DonationIntent::new(Some("Ana".into()), Some("Go team!".into()), Some(1))
    }

    #[tokio::test]
    async fn test_create_session_embeds_metadata_and_unit_amount() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("Authorization", "Bearer sk_test_abc"))
            .and(body_string_contains("mode=payment"))
            .and(body_string_contains("metadata%5Bname%5D=Ana"))
            .and(body_string_contains("metadata%5Bmessage%5D=Go+team%21"))
            .and(body_string_contains(
                "line_items%5B0%5D%5Bprice_data%5D%5Bunit_amount%5D=500",
            ))
            .and(body_string_contains("line_items%5B0%5D%5Bquantity%5D=1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_123",
                "url": "https://checkout.stripe.com/c/pay/cs_test_123"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let session = gateway
            .create_session(
                &ana_intent(),
                500,
                "https://example.com/thankyou",
                "https://example.com/cancel",
            )
            .await
            .unwrap();

        assert_eq!(session.session_id, "cs_test_123");
        assert_eq!(session.url, "https://checkout.stripe.com/c/pay/cs_test_123");
        assert_eq!(session.unit_amount_cents, 500);
        assert_eq!(session.currency, "usd");
    }

    #[tokio::test]
    async fn test_unit_amount_independent_of_quantity() {
        let server = MockServer::start().await;

        // Quantity rides through untouched; unit_amount stays the configured
        // constant.
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(body_string_contains(
                "line_items%5B0%5D%5Bprice_data%5D%5Bunit_amount%5D=500",
            ))
            .and(body_string_contains("line_items%5B0%5D%5Bquantity%5D=40"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_456",
                "url": "https://checkout.stripe.com/c/pay/cs_test_456"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let intent = DonationIntent::new(None, None, Some(40));
        let session = gateway
            .create_session(&intent, 500, "https://x/thankyou", "https://x/cancel")
            .await
            .unwrap();

        assert_eq!(session.unit_amount_cents, 500);
    }

    #[tokio::test]
    async fn test_gateway_error_surfaces() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "message": "Invalid API key" }
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let err = gateway
            .create_session(&ana_intent(), 500, "https://x/t", "https://x/c")
            .await
            .unwrap_err();

        assert!(matches!(err, DonationError::Gateway(_)));
    }

    #[tokio::test]
    async fn test_missing_url_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_789"
            })))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let err = gateway
            .create_session(&ana_intent(), 500, "https://x/t", "https://x/c")
            .await
            .unwrap_err();

        assert!(matches!(err, DonationError::Gateway(_)));
    }
}
