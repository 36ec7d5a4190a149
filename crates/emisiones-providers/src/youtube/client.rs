//! Low-level YouTube Data API v3 client.
//!
//! Handles request building, pagination, response parsing and the
//! status-code triage that decides what kind of [`ProviderError`] an API
//! failure becomes. Quota-family refusals carry the provider's reason
//! string so the stop log line can show it.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use emisiones_core::RemoteEvent;

use crate::error::{ProviderError, ProviderResult};

/// Base URL for the Data API v3.
const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Upload endpoint for thumbnails.
const THUMBNAIL_UPLOAD_URL: &str = "https://www.googleapis.com/upload/youtube/v3/thumbnails/set";

/// Error reasons that mean the provider refuses further creations.
const QUOTA_REASONS: [&str; 6] = [
    "quotaExceeded",
    "dailyLimitExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "userRequestsExceedRateLimit",
    "liveStreamingNotEnabled",
];

/// Reasons that are pure request-rate refusals, worth a bounded retry.
const RATE_LIMIT_REASONS: [&str; 2] = ["userRequestsExceedRateLimit", "rateLimitExceeded"];

/// Thumbnail size keys in preference order.
const THUMBNAIL_PREFERENCE: [&str; 5] = ["maxres", "standard", "high", "medium", "default"];

// ---------------------------------------------------------------------------
// API resource payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastListResponse {
    #[serde(default)]
    items: Vec<BroadcastResource>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastResource {
    id: Option<String>,
    snippet: Option<BroadcastSnippet>,
    content_details: Option<BroadcastContentDetails>,
    status: Option<BroadcastStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastSnippet {
    title: Option<String>,
    description: Option<String>,
    scheduled_start_time: Option<String>,
    actual_end_time: Option<String>,
    #[serde(default)]
    thumbnails: HashMap<String, ThumbnailInfo>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailInfo {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastContentDetails {
    bound_stream_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastStatus {
    privacy_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorPayload {
    #[serde(default)]
    error: ApiErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEntry {
    reason: Option<String>,
    message: Option<String>,
}

fn parse_api_datetime(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn convert_resource(resource: BroadcastResource) -> Option<RemoteEvent> {
    let id = resource.id?;
    let snippet = resource.snippet?;
    let title = snippet.title?;

    let mut event = RemoteEvent::new(id, title);
    if let Some(start) = parse_api_datetime(snippet.scheduled_start_time.as_deref()) {
        event = event.with_scheduled_start(start);
    }
    if let Some(end) = parse_api_datetime(snippet.actual_end_time.as_deref()) {
        event = event.with_actual_end(end);
    }
    if let Some(description) = snippet.description.filter(|d| !d.is_empty()) {
        event = event.with_description(description);
    }
    if let Some(url) = THUMBNAIL_PREFERENCE
        .iter()
        .find_map(|key| snippet.thumbnails.get(*key).and_then(|t| t.url.clone()))
    {
        event = event.with_thumbnail_url(url);
    }
    if let Some(stream_id) = resource.content_details.and_then(|c| c.bound_stream_id) {
        event = event.with_bound_stream_id(stream_id);
    }
    if let Some(privacy) = resource.status.and_then(|s| s.privacy_status) {
        event = event.with_privacy_status(privacy);
    }
    Some(event)
}

/// Maps a non-success API response to a [`ProviderError`].
///
/// Pure rate-limit refusals come back as `RateLimited` (retryable);
/// everything in the quota family as `QuotaExceeded` with the provider's
/// reason as the message.
pub(crate) fn classify_api_error(status: reqwest::StatusCode, body: &str) -> ProviderError {
    let payload: Option<ApiErrorPayload> = serde_json::from_str(body).ok();
    let (reason, message) = match &payload {
        Some(p) => {
            let entry = p.error.errors.first();
            (
                entry.and_then(|e| e.reason.clone()),
                entry
                    .and_then(|e| e.message.clone())
                    .or_else(|| p.error.message.clone()),
            )
        }
        None => (None, None),
    };

    let detail = message
        .clone()
        .or_else(|| reason.clone())
        .unwrap_or_else(|| format!("HTTP {}", status));

    if status == reqwest::StatusCode::FORBIDDEN
        && reason
            .as_deref()
            .is_some_and(|r| RATE_LIMIT_REASONS.contains(&r))
    {
        return ProviderError::rate_limited(detail);
    }

    if reason.as_deref().is_some_and(|r| QUOTA_REASONS.contains(&r)) {
        return ProviderError::quota(detail);
    }

    if (status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::TOO_MANY_REQUESTS)
        && message.as_deref().is_some_and(|m| {
            let lower = m.to_lowercase();
            ["quota", "limit", "exceeded"]
                .iter()
                .any(|word| lower.contains(word))
        })
    {
        return ProviderError::quota(detail);
    }

    match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            ProviderError::authentication(detail)
        }
        reqwest::StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(detail),
        s if s.is_server_error() => ProviderError::server(detail),
        _ => ProviderError::bad_request(detail),
    }
}

fn network_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::network("request timeout")
    } else if e.is_connect() {
        ProviderError::network(format!("connection failed: {}", e))
    } else {
        ProviderError::network(format!("request failed: {}", e))
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// YouTube Data API client bound to one access token.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http_client: reqwest::Client,
    access_token: String,
}

impl YouTubeClient {
    /// Creates a client with the given access token.
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http_client,
            access_token: access_token.into(),
        }
    }

    /// Lists every broadcast of the account (scheduled, live and emitted),
    /// ascending by scheduled start; events without one sort first.
    pub async fn list_broadcasts(&self) -> ProviderResult<Vec<RemoteEvent>> {
        let url = format!("{}/liveBroadcasts", YOUTUBE_API_BASE);
        let mut all = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http_client
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(&[
                    ("part", "id,snippet,contentDetails,status"),
                    ("mine", "true"),
                    ("maxResults", "50"),
                    ("broadcastType", "all"),
                ]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: BroadcastListResponse = self.execute_json(request).await?;
            all.extend(page.items.into_iter().filter_map(convert_resource));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        all.sort_by_key(|event| event.scheduled_start);
        debug!("listed {} broadcasts", all.len());
        Ok(all)
    }

    /// Creates one scheduled broadcast and returns the provider's view of it.
    pub async fn insert_broadcast(
        &self,
        title: &str,
        description: &str,
        scheduled_start: DateTime<Utc>,
        privacy_status: &str,
    ) -> ProviderResult<RemoteEvent> {
        let url = format!("{}/liveBroadcasts", YOUTUBE_API_BASE);
        let body = json!({
            "snippet": {
                "title": title,
                "description": description,
                "scheduledStartTime": scheduled_start.to_rfc3339(),
            },
            "status": {
                "privacyStatus": privacy_status,
            },
        });

        let request = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[("part", "snippet,contentDetails,status")])
            .json(&body);

        let resource: BroadcastResource = self.execute_json(request).await?;
        convert_resource(resource)
            .ok_or_else(|| ProviderError::invalid_response("insert response missing id or title"))
    }

    /// Binds a broadcast to a stream.
    pub async fn bind_stream(&self, broadcast_id: &str, stream_id: &str) -> ProviderResult<()> {
        let url = format!("{}/liveBroadcasts/bind", YOUTUBE_API_BASE);
        let request = self
            .http_client
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("part", "id,contentDetails"),
                ("id", broadcast_id),
                ("streamId", stream_id),
            ])
            .header(reqwest::header::CONTENT_LENGTH, 0);

        let _: serde_json::Value = self.execute_json(request).await?;
        Ok(())
    }

    /// Copies a thumbnail onto a video by downloading `thumbnail_url` and
    /// re-uploading the bytes.
    pub async fn copy_thumbnail(&self, video_id: &str, thumbnail_url: &str) -> ProviderResult<()> {
        let download = self
            .http_client
            .get(thumbnail_url)
            .send()
            .await
            .map_err(network_error)?;
        if !download.status().is_success() {
            return Err(ProviderError::invalid_response(format!(
                "thumbnail download failed ({})",
                download.status()
            )));
        }
        let content_type = download
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = download.bytes().await.map_err(network_error)?;

        let request = self
            .http_client
            .post(THUMBNAIL_UPLOAD_URL)
            .bearer_auth(&self.access_token)
            .query(&[("videoId", video_id)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);

        let _: serde_json::Value = self.execute_json(request).await?;
        Ok(())
    }

    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ProviderResult<T> {
        let response = request.send().await.map_err(network_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(classify_api_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::invalid_response(format!("invalid API response: {}", e)))
    }
}
