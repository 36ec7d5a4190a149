//! The remote broadcast model.
//!
//! [`RemoteEvent`] is the backend-agnostic representation of a broadcast as
//! it exists on the remote account. The account is the only source of truth;
//! the core reads these, never mutates them. Besides identity (title, start),
//! an event carries the settings payload that backends copy when it is used
//! as a template: description, privacy, bound stream and thumbnail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A broadcast as it exists on the remote account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEvent {
    /// Provider-assigned identifier.
    pub id: String,
    /// The broadcast title; equality with a generated title means the
    /// corresponding event already exists.
    pub title: String,
    /// Scheduled start instant, when the provider reported one.
    pub scheduled_start: Option<DateTime<Utc>>,
    /// When the broadcast actually ended; present only for emitted ones.
    pub actual_end: Option<DateTime<Utc>>,
    /// Description text.
    pub description: Option<String>,
    /// Privacy status string as the provider reports it.
    pub privacy_status: Option<String>,
    /// Identifier of the stream the broadcast is bound to.
    pub bound_stream_id: Option<String>,
    /// URL of the best available thumbnail.
    pub thumbnail_url: Option<String>,
}

impl RemoteEvent {
    /// Creates a remote event with identity fields only.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            scheduled_start: None,
            actual_end: None,
            description: None,
            privacy_status: None,
            bound_stream_id: None,
            thumbnail_url: None,
        }
    }

    /// Builder method to set the scheduled start.
    pub fn with_scheduled_start(mut self, start: DateTime<Utc>) -> Self {
        self.scheduled_start = Some(start);
        self
    }

    /// Builder method to set the actual end time.
    pub fn with_actual_end(mut self, end: DateTime<Utc>) -> Self {
        self.actual_end = Some(end);
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the privacy status.
    pub fn with_privacy_status(mut self, status: impl Into<String>) -> Self {
        self.privacy_status = Some(status.into());
        self
    }

    /// Builder method to set the bound stream id.
    pub fn with_bound_stream_id(mut self, stream_id: impl Into<String>) -> Self {
        self.bound_stream_id = Some(stream_id.into());
        self
    }

    /// Builder method to set the thumbnail URL.
    pub fn with_thumbnail_url(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    /// Returns true if the broadcast has already been emitted.
    pub fn was_emitted(&self) -> bool {
        self.actual_end.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn builder_pattern() {
        let event = RemoteEvent::new("b-1", "Misa 10h - Lunes 07 de Abril")
            .with_scheduled_start(utc(2025, 4, 7, 8))
            .with_description("desc")
            .with_privacy_status("unlisted")
            .with_bound_stream_id("s-9")
            .with_thumbnail_url("https://example.com/t.jpg");

        assert_eq!(event.id, "b-1");
        assert_eq!(event.scheduled_start, Some(utc(2025, 4, 7, 8)));
        assert_eq!(event.bound_stream_id.as_deref(), Some("s-9"));
        assert!(!event.was_emitted());
    }

    #[test]
    fn emitted_detection() {
        let event = RemoteEvent::new("b-2", "Vela 21h - Jueves 03 de Abril")
            .with_actual_end(utc(2025, 4, 3, 20));
        assert!(event.was_emitted());
    }

    #[test]
    fn serde_roundtrip() {
        let event = RemoteEvent::new("b-3", "Misa 12h - Martes 08 de Abril")
            .with_scheduled_start(utc(2025, 4, 8, 10));
        let json = serde_json::to_string(&event).unwrap();
        let parsed: RemoteEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }
}
