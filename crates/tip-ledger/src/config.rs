//! # Ledger Configuration
//!
//! Airtable credentials and addressing, loaded once at startup.

use std::env;
use tip_core::DonationError;

/// Airtable ledger configuration
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// API key (bearer token)
    pub api_key: String,

    /// Workspace/app ID (appXXXXXXXXXXXXXX)
    pub workspace_id: String,

    /// Table name holding donation records
    pub table: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `AIRTABLE_API_KEY`
    /// - `AIRTABLE_APP_ID`
    pub fn from_env() -> Result<Self, DonationError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_key = env::var("AIRTABLE_API_KEY")
            .map_err(|_| DonationError::Configuration("AIRTABLE_API_KEY not set".to_string()))?;

        let workspace_id = env::var("AIRTABLE_APP_ID")
            .map_err(|_| DonationError::Configuration("AIRTABLE_APP_ID not set".to_string()))?;

        Ok(Self {
            api_key,
            workspace_id,
            table: "donations".to_string(),
            api_base_url: "https://api.airtable.com".to_string(),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(api_key: impl Into<String>, workspace_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            workspace_id: workspace_id.into(),
            table: "donations".to_string(),
            api_base_url: "https://api.airtable.com".to_string(),
        }
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// URL of the donations table
    pub fn table_url(&self) -> String {
        format!(
            "{}/v0/{}/{}",
            self.api_base_url, self.workspace_id, self.table
        )
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url() {
        let config = LedgerConfig::new("key_abc", "app_xyz");
        assert_eq!(
            config.table_url(),
            "https://api.airtable.com/v0/app_xyz/donations"
        );
    }

    #[test]
    fn test_auth_header() {
        let config = LedgerConfig::new("key_abc", "app_xyz");
        assert_eq!(config.auth_header(), "Bearer key_abc");
    }
}
