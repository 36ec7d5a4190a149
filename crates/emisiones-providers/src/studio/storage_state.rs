//! Saved browser session state.
//!
//! The Studio backend never logs in by itself; it loads cookies from a
//! session file captured out of band and injects them into the WebDriver
//! session. The file layout matches the common browser-automation export
//! format (a top-level `cookies` array).

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::error::{ProviderError, ProviderResult};

/// One cookie from the session file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    /// Unix timestamp; -1 marks a session cookie.
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: Option<bool>,
    #[serde(default)]
    pub secure: Option<bool>,
    #[serde(default)]
    pub same_site: Option<String>,
}

impl StoredCookie {
    /// Converts to the WebDriver cookie object shape.
    pub fn to_webdriver(&self) -> Value {
        let mut cookie = Map::new();
        cookie.insert("name".to_string(), json!(self.name));
        cookie.insert("value".to_string(), json!(self.value));
        if let Some(ref domain) = self.domain {
            cookie.insert("domain".to_string(), json!(domain));
        }
        if let Some(ref path) = self.path {
            cookie.insert("path".to_string(), json!(path));
        }
        if let Some(expires) = self.expires.filter(|e| *e > 0.0) {
            cookie.insert("expiry".to_string(), json!(expires as i64));
        }
        if let Some(http_only) = self.http_only {
            cookie.insert("httpOnly".to_string(), json!(http_only));
        }
        if let Some(secure) = self.secure {
            cookie.insert("secure".to_string(), json!(secure));
        }
        if let Some(ref same_site) = self.same_site {
            cookie.insert("sameSite".to_string(), json!(same_site));
        }
        Value::Object(cookie)
    }
}

/// The parsed session file.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageState {
    #[serde(default)]
    pub cookies: Vec<StoredCookie>,
}

impl StorageState {
    /// Loads and parses a session file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the file is missing, unreadable
    /// or not valid JSON, or when it contains no cookies at all.
    pub fn load(path: &Path) -> ProviderResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(format!(
                "cannot read session file {}: {}",
                path.display(),
                e
            ))
        })?;

        let state: StorageState = serde_json::from_str(&raw).map_err(|e| {
            ProviderError::configuration(format!(
                "invalid session file {}: {}",
                path.display(),
                e
            ))
        })?;

        if state.cookies.is_empty() {
            return Err(ProviderError::configuration(format!(
                "session file {} has no cookies",
                path.display()
            )));
        }

        Ok(state)
    }
}
