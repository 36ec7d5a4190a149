//! Minimal WebDriver wire client.
//!
//! Speaks just enough of the W3C WebDriver protocol for the scheduling
//! flow: session lifecycle, navigation, cookies, element lookup, click
//! and keyboard input. Attaches to an already-running driver such as
//! chromedriver.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// W3C element identifier key in element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

fn automation_error(message: impl Into<String>) -> ProviderError {
    ProviderError::automation(message).with_backend("studio")
}

fn driver_network_error(e: reqwest::Error) -> ProviderError {
    ProviderError::network(format!("webdriver request failed: {}", e)).with_backend("studio")
}

/// Client for one WebDriver endpoint.
#[derive(Debug, Clone)]
pub struct WebDriver {
    http: reqwest::Client,
    base_url: String,
}

impl WebDriver {
    /// Creates a client for the driver at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Starts a new browser session.
    pub async fn new_session(&self, implicit_wait: Duration) -> ProviderResult<Session> {
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "goog:chromeOptions": {
                        "args": ["--headless=new", "--window-size=1280,1024", "--lang=es-ES"]
                    }
                }
            }
        });

        let value = self.execute("POST", "/session", Some(&capabilities)).await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| automation_error("session response missing sessionId"))?
            .to_string();
        debug!(session_id = %session_id, "webdriver session started");

        let session = Session {
            driver: self.clone(),
            id: session_id,
        };
        session.set_implicit_wait(implicit_wait).await?;
        Ok(session)
    }

    async fn execute(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
    ) -> ProviderResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = match method {
            "POST" => self.http.post(&url),
            "DELETE" => self.http.delete(&url),
            _ => self.http.get(&url),
        };
        if let Some(body) = body {
            request = request.json(body);
        } else if method == "POST" {
            request = request.json(&json!({}));
        }

        let response = request.send().await.map_err(driver_network_error)?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| automation_error(format!("invalid webdriver response: {}", e)))?;

        if !status.is_success() {
            let error = body
                .pointer("/value/error")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            let message = body
                .pointer("/value/message")
                .and_then(Value::as_str)
                .unwrap_or("");
            if error == "no such element" {
                return Err(ProviderError::new(
                    crate::error::ProviderErrorCode::AutomationError,
                    "no such element",
                )
                .with_backend("studio"));
            }
            return Err(automation_error(format!(
                "webdriver error '{}': {}",
                error, message
            )));
        }

        Ok(body.get("value").cloned().unwrap_or(Value::Null))
    }
}

/// A live browser session.
#[derive(Debug)]
pub struct Session {
    driver: WebDriver,
    id: String,
}

/// Locator strategy for element lookup.
#[derive(Debug, Clone, Copy)]
pub enum Locator<'a> {
    Css(&'a str),
    XPath(&'a str),
}

impl Locator<'_> {
    fn as_params(&self) -> Value {
        match self {
            Self::Css(selector) => json!({"using": "css selector", "value": selector}),
            Self::XPath(expr) => json!({"using": "xpath", "value": expr}),
        }
    }
}

/// Reference to a located element.
#[derive(Debug, Clone)]
pub struct ElementRef(String);

impl Session {
    fn path(&self, suffix: &str) -> String {
        format!("/session/{}{}", self.id, suffix)
    }

    async fn set_implicit_wait(&self, wait: Duration) -> ProviderResult<()> {
        let body = json!({"implicit": wait.as_millis() as u64});
        self.driver
            .execute("POST", &self.path("/timeouts"), Some(&body))
            .await?;
        Ok(())
    }

    /// Navigates to a URL.
    pub async fn goto(&self, url: &str) -> ProviderResult<()> {
        let body = json!({"url": url});
        self.driver
            .execute("POST", &self.path("/url"), Some(&body))
            .await?;
        Ok(())
    }

    /// Adds one cookie to the session.
    pub async fn add_cookie(&self, cookie: &Value) -> ProviderResult<()> {
        let body = json!({"cookie": cookie});
        self.driver
            .execute("POST", &self.path("/cookie"), Some(&body))
            .await?;
        Ok(())
    }

    /// Finds one element, or `None` when the page has no match.
    pub async fn find(&self, locator: Locator<'_>) -> ProviderResult<Option<ElementRef>> {
        let result = self
            .driver
            .execute("POST", &self.path("/element"), Some(&locator.as_params()))
            .await;
        match result {
            Ok(value) => Ok(extract_element(&value)),
            Err(e) if e.message() == "no such element" => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Finds the first locator in `locators` that matches, trying them in
    /// order. Used for bilingual UI labels.
    pub async fn find_first(
        &self,
        locators: &[Locator<'_>],
    ) -> ProviderResult<Option<ElementRef>> {
        for locator in locators {
            if let Some(element) = self.find(*locator).await? {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    /// Clicks an element.
    pub async fn click(&self, element: &ElementRef) -> ProviderResult<()> {
        self.driver
            .execute("POST", &self.path(&format!("/element/{}/click", element.0)), None)
            .await?;
        Ok(())
    }

    /// Clears an input element.
    pub async fn clear(&self, element: &ElementRef) -> ProviderResult<()> {
        self.driver
            .execute("POST", &self.path(&format!("/element/{}/clear", element.0)), None)
            .await?;
        Ok(())
    }

    /// Types text into an element.
    pub async fn send_keys(&self, element: &ElementRef, text: &str) -> ProviderResult<()> {
        let body = json!({"text": text});
        self.driver
            .execute(
                "POST",
                &self.path(&format!("/element/{}/value", element.0)),
                Some(&body),
            )
            .await?;
        Ok(())
    }

    /// Ends the session.
    pub async fn quit(self) -> ProviderResult<()> {
        self.driver
            .execute("DELETE", &self.path(""), None)
            .await?;
        Ok(())
    }
}

fn extract_element(value: &Value) -> Option<ElementRef> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(|id| ElementRef(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_extraction() {
        let value = json!({ELEMENT_KEY: "elem-42"});
        let element = extract_element(&value).unwrap();
        assert_eq!(element.0, "elem-42");

        assert!(extract_element(&json!({"other": "x"})).is_none());
    }

    #[test]
    fn locator_params() {
        let css = Locator::Css("textarea[aria-label]").as_params();
        assert_eq!(css["using"], "css selector");

        let xpath = Locator::XPath("//button").as_params();
        assert_eq!(xpath["using"], "xpath");
        assert_eq!(xpath["value"], "//button");
    }

    #[test]
    fn base_url_normalization() {
        let driver = WebDriver::new("http://localhost:9515/", Duration::from_secs(5));
        assert_eq!(driver.base_url, "http://localhost:9515");
    }
}
