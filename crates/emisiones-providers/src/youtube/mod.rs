//! Data API backend.
//!
//! Creates broadcasts through the YouTube Data API v3 and doubles as the
//! [`crate::RemoteSchedule`] reader for the account. Module split:
//!
//! - [`config`] - credential bundle, retry policy, backend settings
//! - [`auth`] - refresh-token to access-token exchange
//! - [`client`] - low-level HTTP client (list/insert/bind/thumbnail)
//! - [`backend`] - the [`ApiBackend`] implementing both traits

pub mod auth;
pub mod backend;
pub mod client;
pub mod config;

pub use backend::ApiBackend;
pub use client::YouTubeClient;
pub use config::{ApiConfig, CredentialBundle, RetryPolicy};
