//! Backend traits and implementations for broadcast scheduling.
//!
//! This crate provides the abstraction layer between the reconciliation
//! engine and the remote account:
//!
//! - [`RemoteSchedule`] - lists the broadcasts that exist on the account
//! - [`CreationBackend`] - creates one missing broadcast, reporting a
//!   [`CreateOutcome`]
//! - [`ProviderError`] - error types for backend operations
//!
//! Two structurally different creation backends implement the same
//! contract: the Data API backend (`youtube`) issues HTTP calls, the
//! Studio backend (`studio`) drives the web UI through WebDriver. The
//! engine cannot tell them apart.

pub mod backend;
pub mod error;
#[cfg(feature = "studio")]
pub mod studio;
#[cfg(feature = "api")]
pub mod youtube;

// Re-export main types at crate root
pub use backend::{BoxFuture, CreateOutcome, CreationBackend, RemoteSchedule};
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
#[cfg(feature = "studio")]
pub use studio::StudioBackend;
#[cfg(feature = "api")]
pub use youtube::ApiBackend;
