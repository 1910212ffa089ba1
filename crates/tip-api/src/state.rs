//! # Application State
//!
//! Shared state for the Axum application.
//! All configuration is read from the environment exactly once here and
//! passed into the gateway and ledger constructors; handlers never touch
//! the environment.

use std::sync::Arc;
use tip_core::{BoxedGateway, BoxedLedger};
use tip_ledger::{AirtableLedger, DedupLedger};
use tip_stripe::StripeGateway;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Base URL of the donation page (success/cancel redirects)
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Price of one donation unit, in minor currency units
    pub donation_unit_cents: i64,
    /// Declared donation ceiling in minor currency units.
    ///
    /// Carried from the original deployment's configuration surface but not
    /// enforced against quantity anywhere in the flow; see DESIGN.md.
    pub max_donation_cents: i64,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            donation_unit_cents: std::env::var("DONATION_IN_CENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            max_donation_cents: std::env::var("MAX_DONATION_IN_CENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Redirect target after a completed payment
    pub fn success_url(&self) -> String {
        format!("{}/thankyou", self.base_url)
    }

    /// Redirect target after an abandoned payment
    pub fn cancel_url(&self) -> String {
        format!("{}/cancel", self.base_url)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment gateway (Stripe)
    pub gateway: BoxedGateway,
    /// Donation ledger, dedup layer included
    pub ledger: BoxedLedger,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState wired to Stripe and Airtable
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let gateway = StripeGateway::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        let airtable = AirtableLedger::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize ledger: {}", e))?;

        // All settlement writes go through the dedup layer so gateway
        // redeliveries cannot double-record a donation.
        let ledger = DedupLedger::new(Arc::new(airtable));

        Ok(Self {
            gateway: Arc::new(gateway),
            ledger: Arc::new(ledger),
            config,
        })
    }

    /// Build a state from explicit parts (tests, alternate wiring)
    pub fn with_parts(gateway: BoxedGateway, ledger: BoxedLedger, config: AppConfig) -> Self {
        Self {
            gateway,
            ledger,
            config,
        }
    }
}
