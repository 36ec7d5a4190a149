//! Data API backend configuration.

use std::time::Duration;

use rand::Rng;

/// OAuth 2.0 credential triple for one account.
///
/// The refresh token is provisioned out of band; the backend only ever
/// exchanges it for short-lived access tokens.
#[derive(Debug, Clone)]
pub struct CredentialBundle {
    /// The OAuth 2.0 client ID.
    pub client_id: String,
    /// The OAuth 2.0 client secret.
    pub client_secret: String,
    /// The long-lived refresh token for the account.
    pub refresh_token: String,
}

impl CredentialBundle {
    /// Creates a new credential bundle.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Checks that no part of the triple is blank.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("refresh_token", &self.refresh_token),
        ] {
            if value.trim().is_empty() {
                return Err(format!("credential field '{}' is empty", name));
            }
        }
        Ok(())
    }
}

/// Backoff policy for pure rate-limit responses.
///
/// Quota exhaustion is never retried; this only covers the per-minute
/// request-rate refusals that clear on their own.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub limit: u32,
    /// Initial backoff delay.
    pub base: Duration,
    /// Backoff ceiling.
    pub max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            limit: 3,
            base: Duration::from_secs(2),
            max: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based): exponential,
    /// capped, with sub-second jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = self.base.as_secs_f64() * 2f64.powi(attempt as i32);
        let capped = exp.min(self.max.as_secs_f64());
        Duration::from_secs_f64(capped + half_second_jitter())
    }
}

/// Jitter in [0.0, 0.5), to spread retries.
fn half_second_jitter() -> f64 {
    let mut rng = rand::rng();
    rng.random_range(0.0..0.5)
}

/// Settings for the Data API backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Account credentials.
    pub credentials: CredentialBundle,
    /// Privacy status for new events when no template supplies one.
    pub default_privacy_status: String,
    /// HTTP timeout for every API call.
    pub timeout: Duration,
    /// Rate-limit retry policy.
    pub retry: RetryPolicy,
}

impl ApiConfig {
    /// Creates a config with defaults for everything but the credentials.
    pub fn new(credentials: CredentialBundle) -> Self {
        Self {
            credentials,
            default_privacy_status: "unlisted".to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials.validate()?;
        if self.default_privacy_status.trim().is_empty() {
            return Err("default_privacy_status is empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_validation() {
        let ok = CredentialBundle::new("id", "secret", "token");
        assert!(ok.validate().is_ok());

        let bad = CredentialBundle::new("id", " ", "token");
        let err = bad.validate().unwrap_err();
        assert!(err.contains("client_secret"));
    }

    #[test]
    fn retry_delay_grows_and_caps() {
        let policy = RetryPolicy::default();
        let first = policy.delay(0);
        let second = policy.delay(1);
        assert!(second >= first);

        // Far past the cap: delay stays within max + jitter.
        let late = policy.delay(10);
        assert!(late <= policy.max + Duration::from_millis(500));
    }

    #[test]
    fn delay_jitter_stays_in_band() {
        let policy = RetryPolicy::default();
        for _ in 0..64 {
            let delay = policy.delay(0);
            assert!(delay >= policy.base);
            assert!(delay < policy.base + Duration::from_millis(500));
        }
    }

    #[test]
    fn config_defaults() {
        let config = ApiConfig::new(CredentialBundle::new("a", "b", "c"));
        assert_eq!(config.default_privacy_status, "unlisted");
        assert!(config.validate().is_ok());
    }
}
