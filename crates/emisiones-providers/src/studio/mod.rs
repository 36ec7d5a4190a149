//! Studio web UI backend.
//!
//! Drives the channel's web interface through a WebDriver session to
//! schedule broadcasts the Data API cannot create with the channel's
//! saved presets. Module split:
//!
//! - [`config`] - backend settings (session file, WebDriver endpoint)
//! - [`storage_state`] - saved browser session cookies
//! - [`webdriver`] - minimal WebDriver wire client
//! - [`backend`] - the [`StudioBackend`] driving the scheduling flow

pub mod backend;
pub mod config;
pub mod storage_state;
pub mod webdriver;

pub use backend::StudioBackend;
pub use config::StudioConfig;
pub use storage_state::StorageState;
