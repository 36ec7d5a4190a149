//! The Data API creation backend.
//!
//! Implements both [`RemoteSchedule`] and [`CreationBackend`]. Listing
//! also records the stream the account currently emits on, so new
//! broadcasts can be bound to it even when their template never had a
//! stream of its own.

use std::collections::HashSet;
use std::sync::{Mutex, RwLock};

use tokio::sync::RwLock as TokioRwLock;
use tracing::{debug, info, warn};

use emisiones_core::{EventSpec, RemoteEvent};

use crate::backend::{BoxFuture, CreateOutcome, CreationBackend, RemoteSchedule};
use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};

use super::auth::TokenClient;
use super::client::YouTubeClient;
use super::config::ApiConfig;

/// Days ahead the Data API reliably accepts scheduled starts for.
const API_PLANNING_HORIZON_DAYS: u32 = 15;

/// Creates broadcasts through the YouTube Data API v3.
pub struct ApiBackend {
    config: ApiConfig,
    token_client: TokenClient,
    api_client: TokioRwLock<Option<YouTubeClient>>,
    /// Stream id of the latest emitted broadcast, noted while listing.
    shared_stream: RwLock<Option<String>>,
    /// Keywords whose thumbnail was already copied this run.
    copied_thumbnail_keywords: Mutex<HashSet<String>>,
}

impl ApiBackend {
    /// Creates a backend from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the credential triple or the
    /// privacy default is blank.
    pub fn new(config: ApiConfig) -> ProviderResult<Self> {
        config
            .validate()
            .map_err(|msg| ProviderError::configuration(msg).with_backend("api"))?;

        let token_client = TokenClient::new(config.credentials.clone(), config.timeout);

        Ok(Self {
            config,
            token_client,
            api_client: TokioRwLock::new(None),
            shared_stream: RwLock::new(None),
            copied_thumbnail_keywords: Mutex::new(HashSet::new()),
        })
    }

    /// Returns the API client, exchanging the refresh token on first use.
    async fn client(&self) -> ProviderResult<YouTubeClient> {
        {
            let guard = self.api_client.read().await;
            if let Some(client) = guard.as_ref() {
                return Ok(client.clone());
            }
        }

        let mut guard = self.api_client.write().await;
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let token = self
            .token_client
            .fetch_access_token()
            .await
            .map_err(|e| e.with_backend("api"))?;
        let client = YouTubeClient::new(token, self.config.timeout);
        *guard = Some(client.clone());
        Ok(client)
    }

    /// Runs `op`, retrying pure rate-limit refusals per the retry policy.
    /// Quota exhaustion and everything else surface immediately.
    async fn with_rate_limit_retry<T, F, Fut>(&self, mut op: F) -> ProviderResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.code() == ProviderErrorCode::RateLimited => {
                    if attempt >= self.config.retry.limit {
                        // Out of retries; the run treats this like quota.
                        return Err(ProviderError::quota(format!(
                            "rate limit persisted after {} retries: {}",
                            attempt,
                            e.message()
                        )));
                    }
                    let delay = self.config.retry.delay(attempt);
                    warn!(
                        attempt = attempt + 1,
                        delay_secs = delay.as_secs_f64(),
                        "rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn note_shared_stream(&self, events: &[RemoteEvent]) {
        let latest = events
            .iter()
            .filter(|e| e.was_emitted() && e.bound_stream_id.is_some())
            .max_by_key(|e| e.scheduled_start)
            .and_then(|e| e.bound_stream_id.clone());

        if let (Some(stream), Ok(mut guard)) = (latest, self.shared_stream.write()) {
            debug!(stream_id = %stream, "noted account stream");
            *guard = Some(stream);
        }
    }

    fn stream_for(&self, template: Option<&RemoteEvent>) -> Option<String> {
        self.shared_stream
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .or_else(|| template.and_then(|t| t.bound_stream_id.clone()))
    }

    fn thumbnail_copied(&self, keyword: &str) -> bool {
        self.copied_thumbnail_keywords
            .lock()
            .map(|guard| guard.contains(keyword))
            .unwrap_or(true)
    }

    fn mark_thumbnail_copied(&self, keyword: &str) {
        if let Ok(mut guard) = self.copied_thumbnail_keywords.lock() {
            guard.insert(keyword.to_string());
        }
    }

    /// Copies the template's thumbnail onto the new broadcast, once per
    /// keyword per run. Thumbnail failures never fail the creation, and
    /// only a successful copy marks the keyword as done, so a failed copy
    /// is retried on the keyword's next event.
    async fn maybe_copy_thumbnail(
        &self,
        client: &YouTubeClient,
        spec: &EventSpec,
        template: &RemoteEvent,
        video_id: &str,
    ) {
        if template.was_emitted() {
            return;
        }
        let Some(url) = template.thumbnail_url.as_deref() else {
            return;
        };
        if self.thumbnail_copied(&spec.category.keyword) {
            return;
        }

        match client.copy_thumbnail(video_id, url).await {
            Ok(()) => self.mark_thumbnail_copied(&spec.category.keyword),
            Err(e) => warn!(title = %spec.title, error = %e, "thumbnail copy failed"),
        }
    }

    async fn create_inner(
        &self,
        spec: &EventSpec,
        template: Option<&RemoteEvent>,
    ) -> ProviderResult<()> {
        let client = self.client().await?;

        let description = template
            .and_then(|t| t.description.as_deref())
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&spec.category.default_description);
        let privacy = template
            .and_then(|t| t.privacy_status.as_deref())
            .unwrap_or(&self.config.default_privacy_status);

        let created = self
            .with_rate_limit_retry(|| {
                client.insert_broadcast(&spec.title, description, spec.scheduled_start, privacy)
            })
            .await?;

        info!(title = %spec.title, id = %created.id, "broadcast created");

        if let Some(stream_id) = self.stream_for(template) {
            self.with_rate_limit_retry(|| client.bind_stream(&created.id, &stream_id))
                .await?;
            debug!(id = %created.id, stream_id = %stream_id, "stream bound");
        }

        if let Some(template) = template {
            self.maybe_copy_thumbnail(&client, spec, template, &created.id)
                .await;
        }

        Ok(())
    }
}

impl RemoteSchedule for ApiBackend {
    fn list_broadcasts(&self) -> BoxFuture<'_, ProviderResult<Vec<RemoteEvent>>> {
        Box::pin(async {
            let client = self.client().await?;
            let events = client
                .list_broadcasts()
                .await
                .map_err(|e| e.with_backend("api"))?;
            self.note_shared_stream(&events);
            Ok(events)
        })
    }
}

impl CreationBackend for ApiBackend {
    fn name(&self) -> &str {
        "api"
    }

    fn create<'a>(
        &'a self,
        spec: &'a EventSpec,
        template: Option<&'a RemoteEvent>,
    ) -> BoxFuture<'a, CreateOutcome> {
        Box::pin(async move {
            match self.create_inner(spec, template).await {
                Ok(()) => CreateOutcome::Created,
                Err(e) => match e.code() {
                    ProviderErrorCode::QuotaExceeded => CreateOutcome::QuotaExceeded {
                        detail: e.message().to_string(),
                    },
                    ProviderErrorCode::NetworkError | ProviderErrorCode::ServerError => {
                        CreateOutcome::TransientFailure(e.with_backend("api"))
                    }
                    _ => CreateOutcome::PermanentFailure(e.with_backend("api")),
                },
            }
        })
    }

    fn planning_horizon_days(&self) -> Option<u32> {
        Some(API_PLANNING_HORIZON_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use super::super::config::CredentialBundle;

    fn backend() -> ApiBackend {
        ApiBackend::new(ApiConfig::new(CredentialBundle::new("id", "secret", "token"))).unwrap()
    }

    fn emitted(id: &str, stream: &str, day: u32) -> RemoteEvent {
        RemoteEvent::new(id, format!("Misa 10h - title {}", id))
            .with_scheduled_start(Utc.with_ymd_and_hms(2025, 4, day, 8, 0, 0).unwrap())
            .with_actual_end(Utc.with_ymd_and_hms(2025, 4, day, 9, 0, 0).unwrap())
            .with_bound_stream_id(stream)
    }

    #[test]
    fn rejects_blank_credentials() {
        let result = ApiBackend::new(ApiConfig::new(CredentialBundle::new("", "s", "t")));
        let err = result.err().unwrap();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert_eq!(err.backend(), Some("api"));
    }

    #[test]
    fn shared_stream_tracks_latest_emitted() {
        let b = backend();
        b.note_shared_stream(&[
            emitted("a", "stream-old", 1),
            emitted("b", "stream-new", 5),
            // Scheduled but never emitted; must not win.
            RemoteEvent::new("c", "Misa 10h - future")
                .with_scheduled_start(Utc.with_ymd_and_hms(2025, 4, 20, 8, 0, 0).unwrap())
                .with_bound_stream_id("stream-future"),
        ]);
        assert_eq!(b.stream_for(None).as_deref(), Some("stream-new"));
    }

    #[test]
    fn stream_falls_back_to_template() {
        let b = backend();
        let template = RemoteEvent::new("t", "Misa 10h - old").with_bound_stream_id("stream-t");
        assert_eq!(b.stream_for(Some(&template)).as_deref(), Some("stream-t"));
        assert_eq!(b.stream_for(None), None);
    }

    #[test]
    fn thumbnail_keyword_marked_only_on_success() {
        let b = backend();
        // Checking never marks; a keyword stays pending until an explicit
        // mark, so a failed copy gets another chance on the next event.
        assert!(!b.thumbnail_copied("Misa 10h"));
        assert!(!b.thumbnail_copied("Misa 10h"));

        b.mark_thumbnail_copied("Misa 10h");
        assert!(b.thumbnail_copied("Misa 10h"));
        assert!(!b.thumbnail_copied("Misa 12h"));
    }

    #[test]
    fn planning_horizon_is_capped() {
        assert_eq!(backend().planning_horizon_days(), Some(15));
    }
}
