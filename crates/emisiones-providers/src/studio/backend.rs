//! The Studio web UI creation backend.
//!
//! Schedules broadcasts by driving the channel's livestreaming page: it
//! reuses the settings of the most recent broadcast whose card matches
//! the category keyword, so templates travel through the UI rather than
//! through this code. The UI accepts dates further out than the Data API
//! but still caps the horizon.

use tokio::sync::Mutex as TokioMutex;
use tracing::{debug, info};

use emisiones_core::{EventSpec, RemoteEvent};

use crate::backend::{BoxFuture, CreateOutcome, CreationBackend};
use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};

use super::config::StudioConfig;
use super::storage_state::StorageState;
use super::webdriver::{Locator, Session, WebDriver};

/// Days ahead the scheduling dialog accepts.
const STUDIO_PLANNING_HORIZON_DAYS: u32 = 11;

const STUDIO_ORIGIN: &str = "https://studio.youtube.com";

/// Creates broadcasts through the Studio web interface.
pub struct StudioBackend {
    config: StudioConfig,
    driver: WebDriver,
    session: TokioMutex<Option<Session>>,
}

impl StudioBackend {
    /// Creates a backend from validated configuration. The session file
    /// must exist and parse; the browser itself starts lazily.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for blank settings or an unusable
    /// session file.
    pub fn new(config: StudioConfig) -> ProviderResult<Self> {
        config
            .validate()
            .map_err(|msg| ProviderError::configuration(msg).with_backend("studio"))?;
        // Fail at startup rather than mid-run on a bad session file.
        StorageState::load(&config.storage_state_path)?;

        let driver = WebDriver::new(config.webdriver_url.clone(), config.element_timeout);

        Ok(Self {
            config,
            driver,
            session: TokioMutex::new(None),
        })
    }

    /// Starts the browser session and injects the saved cookies.
    async fn open_session(&self) -> ProviderResult<Session> {
        let state = StorageState::load(&self.config.storage_state_path)?;
        let session = self.driver.new_session(self.config.element_timeout).await?;

        // Cookies can only be set for the origin the browser is on.
        session.goto(STUDIO_ORIGIN).await?;
        for cookie in &state.cookies {
            session.add_cookie(&cookie.to_webdriver()).await?;
        }
        debug!(cookies = state.cookies.len(), "session cookies injected");
        Ok(session)
    }

    async fn click_labeled(
        &self,
        session: &Session,
        labels: &[&str],
        what: &str,
    ) -> ProviderResult<()> {
        let xpaths: Vec<String> = labels
            .iter()
            .map(|label| format!("//*[normalize-space(text())=\"{}\"]", label))
            .collect();
        let locators: Vec<Locator<'_>> =
            xpaths.iter().map(|x| Locator::XPath(x.as_str())).collect();

        let element = session.find_first(&locators).await?.ok_or_else(|| {
            ProviderError::automation(format!("{} not found", what)).with_backend("studio")
        })?;
        session.click(&element).await
    }

    async fn fill(
        &self,
        session: &Session,
        locators: &[Locator<'_>],
        text: &str,
        what: &str,
    ) -> ProviderResult<()> {
        let element = session
            .find_first(locators)
            .await?
            .ok_or_else(|| {
                ProviderError::automation(format!("{} not found", what)).with_backend("studio")
            })?;
        session.clear(&element).await?;
        session.send_keys(&element, text).await
    }

    /// One pass through the scheduling dialog for `spec`.
    async fn schedule(&self, session: &Session, spec: &EventSpec) -> ProviderResult<()> {
        let page = format!(
            "{}/channel/{}/livestreaming",
            STUDIO_ORIGIN, self.config.channel_id
        );
        session.goto(&page).await?;

        self.click_labeled(
            session,
            &["Programar emisión", "Schedule stream"],
            "schedule button",
        )
        .await?;
        self.click_labeled(
            session,
            &["Configurar con ajustes anteriores", "Reuse settings"],
            "reuse settings option",
        )
        .await?;

        // Pick the preset card whose past broadcast matches the keyword.
        let card_xpath = format!(
            "//ytcp-entity-card[contains(., \"{}\")]",
            spec.category.keyword
        );
        let card = session
            .find(Locator::XPath(&card_xpath))
            .await?
            .ok_or_else(|| {
                ProviderError::automation(format!(
                    "no preset card for keyword '{}'",
                    spec.category.keyword
                ))
                .with_backend("studio")
            })?;
        session.click(&card).await?;
        self.click_labeled(
            session,
            &["Reutilizar configuración", "Reuse settings"],
            "reuse confirmation",
        )
        .await?;

        self.fill(
            session,
            &[
                Locator::Css("textarea[aria-label*=\"Título\"]"),
                Locator::Css("textarea[aria-label*=\"title\"]"),
                Locator::Css("#title-textarea textarea"),
            ],
            &spec.title,
            "title field",
        )
        .await?;

        // Step through the dialog tabs until the visibility page shows.
        for _ in 0..4 {
            let visibility_tab = session
                .find(Locator::XPath(
                    "//*[@role=\"tab\" and (contains(., \"Visibilidad\") or contains(., \"Visibility\")) and @aria-selected=\"true\"]",
                ))
                .await?;
            if visibility_tab.is_some() {
                break;
            }
            self.click_labeled(session, &["Siguiente", "Next"], "next button")
                .await?;
        }

        self.click_labeled(session, &["Programar", "Schedule"], "schedule option")
            .await?;

        // The dialog takes local wall-clock values, not UTC.
        self.fill(
            session,
            &[
                Locator::Css("input[aria-label*=\"Fecha\"]"),
                Locator::Css("input[aria-label*=\"Date\"]"),
                Locator::Css("#datepicker-trigger input"),
            ],
            &spec.date.format("%d/%m/%Y").to_string(),
            "date field",
        )
        .await?;
        self.fill(
            session,
            &[
                Locator::Css("input[aria-label*=\"Hora\"]"),
                Locator::Css("input[aria-label*=\"Time\"]"),
                Locator::Css("#time-of-day-trigger input"),
            ],
            &spec.category.time_of_day.format("%H:%M").to_string(),
            "time field",
        )
        .await?;

        self.click_labeled(session, &["Hecho", "Done"], "done button")
            .await?;

        info!(title = %spec.title, "broadcast scheduled through studio");
        Ok(())
    }

    async fn create_inner(&self, spec: &EventSpec) -> ProviderResult<()> {
        let mut guard = self.session.lock().await;
        if guard.is_none() {
            *guard = Some(self.open_session().await?);
        }
        let session = guard.as_ref().ok_or_else(|| {
            ProviderError::internal("session vanished after open").with_backend("studio")
        })?;

        let result = self.schedule(session, spec).await;
        if result.is_err() {
            // A failed flow leaves the page in an unknown state; drop the
            // session so the next attempt starts fresh.
            if let Some(session) = guard.take() {
                let _ = session.quit().await;
            }
        }
        result
    }

    /// Ends the browser session if one is open.
    pub async fn close(&self) -> ProviderResult<()> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.take() {
            session.quit().await?;
        }
        Ok(())
    }
}

impl CreationBackend for StudioBackend {
    fn name(&self) -> &str {
        "studio"
    }

    fn create<'a>(
        &'a self,
        spec: &'a EventSpec,
        _template: Option<&'a RemoteEvent>,
    ) -> BoxFuture<'a, CreateOutcome> {
        // The template is implicit: the UI flow reuses the settings of the
        // newest past broadcast matching the keyword.
        Box::pin(async move {
            match self.create_inner(spec).await {
                Ok(()) => CreateOutcome::Created,
                Err(e) => match e.code() {
                    ProviderErrorCode::NetworkError | ProviderErrorCode::ServerError => {
                        CreateOutcome::TransientFailure(e)
                    }
                    _ => CreateOutcome::PermanentFailure(e),
                },
            }
        })
    }

    fn planning_horizon_days(&self) -> Option<u32> {
        Some(STUDIO_PLANNING_HORIZON_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn session_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"cookies": [{{"name": "SID", "value": "abc", "domain": ".youtube.com"}}]}}"#
        )
        .unwrap();
        file
    }

    #[test]
    fn rejects_missing_session_file() {
        let config = StudioConfig::new("/nonexistent/session.json", "UCabc");
        let err = StudioBackend::new(config).err().unwrap();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
    }

    #[test]
    fn builds_with_valid_session_file() {
        let file = session_file();
        let backend = StudioBackend::new(StudioConfig::new(file.path(), "UCabc")).unwrap();
        assert_eq!(backend.name(), "studio");
        assert_eq!(backend.planning_horizon_days(), Some(11));
    }

    #[test]
    fn rejects_blank_channel() {
        let file = session_file();
        let err = StudioBackend::new(StudioConfig::new(file.path(), "")).err().unwrap();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
    }
}
