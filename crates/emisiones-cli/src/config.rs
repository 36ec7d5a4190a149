//! Settings assembly from flags and environment.
//!
//! Credentials never travel as flags; each account is a triple of
//! `<PREFIX>_CLIENT_ID`, `<PREFIX>_CLIENT_SECRET` and
//! `<PREFIX>_REFRESH_TOKEN` environment variables.

use std::time::Duration;

use chrono_tz::Tz;

use emisiones_core::{CatalogKeywords, Category, build_catalog};
use emisiones_engine::EngineConfig;
use emisiones_providers::studio::StudioConfig;
use emisiones_providers::youtube::{ApiConfig, CredentialBundle, RetryPolicy};

use crate::cli::{Account, BackendKind, Cli};
use crate::error::{CliError, CliResult};

/// Everything a run needs, validated.
#[derive(Debug)]
pub struct Settings {
    pub engine: EngineConfig,
    pub backend: BackendKind,
    pub api: ApiConfig,
    /// Present only when the studio backend is selected.
    pub studio: Option<StudioConfig>,
}

impl Settings {
    /// Builds settings from parsed flags and the process environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown timezone, a blank
    /// keyword, missing credentials, or missing studio settings when the
    /// studio backend is selected.
    pub fn from_cli(cli: &Cli) -> CliResult<Self> {
        let timezone: Tz = cli
            .timezone
            .parse()
            .map_err(|_| CliError::Config(format!("unknown timezone '{}'", cli.timezone)))?;

        let catalog = catalog_from_cli(cli)?;

        let mut engine = EngineConfig::new(timezone, catalog);
        engine.start_offset_days = cli.start_offset_days;
        engine.max_days_ahead = cli.max_days_ahead;
        engine.stop_on_limit = !cli.continue_on_limit;

        let mut api = ApiConfig::new(credentials_from_env(cli.account)?);
        api.default_privacy_status = cli.privacy.clone();
        api.retry = RetryPolicy {
            limit: cli.retry_limit,
            base: Duration::from_secs(cli.retry_base_seconds),
            max: Duration::from_secs(cli.retry_max_seconds),
        };

        let studio = match cli.backend {
            BackendKind::Api => None,
            BackendKind::Studio => Some(studio_from_cli(cli)?),
        };

        Ok(Self {
            engine,
            backend: cli.backend,
            api,
            studio,
        })
    }
}

fn catalog_from_cli(cli: &Cli) -> CliResult<Vec<Category>> {
    let keywords = CatalogKeywords {
        misa_10: cli.keyword_misa_10.clone(),
        misa_12: cli.keyword_misa_12.clone(),
        misa_20: cli.keyword_misa_20.clone(),
        vela_21: cli.keyword_vela_21.clone(),
    };
    Ok(build_catalog(&keywords)?)
}

/// Reads the credential triple for `account` from the environment.
pub fn credentials_from_env(account: Account) -> CliResult<CredentialBundle> {
    let prefix = account.env_prefix();
    let read = |suffix: &str| {
        let name = format!("{}_{}", prefix, suffix);
        std::env::var(&name)
            .map_err(|_| CliError::Config(format!("missing environment variable {}", name)))
    };

    Ok(CredentialBundle::new(
        read("CLIENT_ID")?,
        read("CLIENT_SECRET")?,
        read("REFRESH_TOKEN")?,
    ))
}

fn studio_from_cli(cli: &Cli) -> CliResult<StudioConfig> {
    let storage_state = cli.storage_state.as_ref().ok_or_else(|| {
        CliError::Config("studio backend requires --storage-state".to_string())
    })?;
    let channel_id = cli.channel_id.as_ref().ok_or_else(|| {
        CliError::Config("studio backend requires --channel-id".to_string())
    })?;

    let mut config =
        StudioConfig::new(storage_state, channel_id).with_webdriver_url(&cli.webdriver_url);
    config.element_timeout = Duration::from_secs(cli.studio_timeout_seconds);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn rejects_unknown_timezone() {
        let cli = Cli::parse_from(["emisiones", "--timezone", "Mars/Olympus"]);
        let err = Settings::from_cli(&cli).err().unwrap();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("Mars/Olympus")));
    }

    #[test]
    fn studio_backend_requires_its_settings() {
        // Credentials present so the failure is about the studio settings.
        // Env mutation is process-wide; keep the variables unique per test.
        unsafe {
            std::env::set_var("EMISIONES_PRIMARY_CLIENT_ID", "id");
            std::env::set_var("EMISIONES_PRIMARY_CLIENT_SECRET", "secret");
            std::env::set_var("EMISIONES_PRIMARY_REFRESH_TOKEN", "token");
        }

        let cli = Cli::parse_from(["emisiones", "--backend", "studio"]);
        let err = Settings::from_cli(&cli).err().unwrap();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("--storage-state")));
    }

    #[test]
    fn missing_credentials_name_the_variable() {
        let err = credentials_from_env(Account::Secondary).err().unwrap();
        assert!(
            matches!(err, CliError::Config(msg) if msg.contains("EMISIONES_SECONDARY_CLIENT_ID"))
        );
    }
}
