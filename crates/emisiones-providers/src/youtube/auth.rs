//! Refresh-token exchange.
//!
//! Each run starts from a long-lived refresh token and trades it for a
//! short-lived access token. There is no interactive flow here; token
//! provisioning happens out of band.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

use super::config::CredentialBundle;

/// Google's OAuth 2.0 token endpoint.
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    #[allow(dead_code)]
    expires_in: Option<i64>,
}

/// Exchanges a refresh token for access tokens.
#[derive(Debug)]
pub struct TokenClient {
    http_client: reqwest::Client,
    credentials: CredentialBundle,
}

impl TokenClient {
    /// Creates a token client for the given credentials.
    pub fn new(credentials: CredentialBundle, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http_client,
            credentials,
        }
    }

    /// Fetches a fresh access token.
    ///
    /// # Errors
    ///
    /// Returns an authentication error when the token endpoint rejects the
    /// refresh token, a network error when the request itself fails.
    pub async fn fetch_access_token(&self) -> ProviderResult<String> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read token response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::authentication(format!(
                "token exchange failed ({}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::invalid_response(format!("invalid token response: {}", e)))?;

        debug!("obtained fresh access token");
        Ok(token_response.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_parsing() {
        let json = r#"{"access_token":"ya29.abc","expires_in":3599,"token_type":"Bearer"}"#;
        let parsed: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.access_token, "ya29.abc");
    }
}
