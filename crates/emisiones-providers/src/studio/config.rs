//! Studio backend configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Settings for the Studio web UI backend.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Path to the saved browser session file (JSON with cookies).
    pub storage_state_path: PathBuf,
    /// WebDriver endpoint to attach to.
    pub webdriver_url: String,
    /// Channel id whose livestreaming page gets driven.
    pub channel_id: String,
    /// How long to wait for UI elements to appear.
    pub element_timeout: Duration,
}

impl StudioConfig {
    /// Creates a config with defaults for the WebDriver endpoint and
    /// element timeout.
    pub fn new(storage_state_path: impl Into<PathBuf>, channel_id: impl Into<String>) -> Self {
        Self {
            storage_state_path: storage_state_path.into(),
            webdriver_url: "http://localhost:9515".to_string(),
            channel_id: channel_id.into(),
            element_timeout: Duration::from_secs(15),
        }
    }

    /// Overrides the WebDriver endpoint.
    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.webdriver_url = url.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.channel_id.trim().is_empty() {
            return Err("channel_id is empty".to_string());
        }
        if self.webdriver_url.trim().is_empty() {
            return Err("webdriver_url is empty".to_string());
        }
        if self.storage_state_path.as_os_str().is_empty() {
            return Err("storage_state_path is empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_validation() {
        let config = StudioConfig::new("/tmp/session.json", "UCabc");
        assert_eq!(config.webdriver_url, "http://localhost:9515");
        assert!(config.validate().is_ok());

        let bad = StudioConfig::new("/tmp/session.json", "  ");
        assert!(bad.validate().is_err());
    }
}
