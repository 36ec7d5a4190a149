//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Which creation backend performs the scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Data API calls.
    Api,
    /// Web UI automation through WebDriver.
    Studio,
}

/// Which configured account to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Account {
    Primary,
    Secondary,
}

impl Account {
    /// Environment variable prefix for this account's credentials.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Self::Primary => "EMISIONES_PRIMARY",
            Self::Secondary => "EMISIONES_SECONDARY",
        }
    }
}

/// emisiones - keeps the channel's scheduled broadcasts in place
#[derive(Debug, Parser)]
#[command(name = "emisiones")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    // --- Backend selection ---
    /// Creation backend to schedule through
    #[arg(long, value_enum, env = "EMISIONES_BACKEND", default_value = "api")]
    pub backend: BackendKind,

    /// Account whose credentials to use
    #[arg(long, value_enum, env = "EMISIONES_ACCOUNT", default_value = "primary")]
    pub account: Account,

    // --- Planning window ---
    /// IANA timezone the catalog times are expressed in
    #[arg(long, env = "EMISIONES_TIMEZONE", default_value = "Europe/Madrid")]
    pub timezone: String,

    /// Days after today the window starts at the earliest
    #[arg(long, env = "EMISIONES_START_OFFSET_DAYS", default_value = "1")]
    pub start_offset_days: u32,

    /// Upper bound on how far ahead to plan, in days
    #[arg(long, env = "EMISIONES_MAX_DAYS_AHEAD", default_value = "3650")]
    pub max_days_ahead: u32,

    /// Keep walking the window after a provider limit instead of stopping
    #[arg(long, env = "EMISIONES_CONTINUE_ON_LIMIT")]
    pub continue_on_limit: bool,

    // --- Catalog keywords ---
    /// Keyword for the morning mass category
    #[arg(long, env = "EMISIONES_KEYWORD_MISA_10", default_value = "Misa 10h")]
    pub keyword_misa_10: String,

    /// Keyword for the midday mass category
    #[arg(long, env = "EMISIONES_KEYWORD_MISA_12", default_value = "Misa 12h")]
    pub keyword_misa_12: String,

    /// Keyword for the evening mass category
    #[arg(long, env = "EMISIONES_KEYWORD_MISA_20", default_value = "Misa 20h")]
    pub keyword_misa_20: String,

    /// Keyword for the Thursday vigil category
    #[arg(long, env = "EMISIONES_KEYWORD_VELA_21", default_value = "Vela 21h")]
    pub keyword_vela_21: String,

    // --- Creation options ---
    /// Privacy status for new broadcasts when no template supplies one
    #[arg(long, env = "EMISIONES_PRIVACY", default_value = "unlisted")]
    pub privacy: String,

    // --- Rate-limit retry ---
    /// Retries for pure rate-limit refusals before treating them as a limit
    #[arg(long, env = "EMISIONES_RETRY_LIMIT", default_value = "3")]
    pub retry_limit: u32,

    /// Initial rate-limit backoff in seconds
    #[arg(long, env = "EMISIONES_RETRY_BASE_SECONDS", default_value = "2")]
    pub retry_base_seconds: u64,

    /// Rate-limit backoff ceiling in seconds
    #[arg(long, env = "EMISIONES_RETRY_MAX_SECONDS", default_value = "30")]
    pub retry_max_seconds: u64,

    // --- Studio backend ---
    /// Path to the saved browser session file (studio backend)
    #[arg(long, env = "EMISIONES_STORAGE_STATE")]
    pub storage_state: Option<PathBuf>,

    /// WebDriver endpoint to attach to (studio backend)
    #[arg(long, env = "EMISIONES_WEBDRIVER_URL", default_value = "http://localhost:9515")]
    pub webdriver_url: String,

    /// Channel id to drive (studio backend)
    #[arg(long, env = "EMISIONES_CHANNEL_ID")]
    pub channel_id: Option<String>,

    /// Seconds to wait for UI elements to appear (studio backend)
    #[arg(long, env = "EMISIONES_STUDIO_TIMEOUT_SECONDS", default_value = "15")]
    pub studio_timeout_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["emisiones"]);
        assert_eq!(cli.backend, BackendKind::Api);
        assert_eq!(cli.account, Account::Primary);
        assert_eq!(cli.timezone, "Europe/Madrid");
        assert_eq!(cli.start_offset_days, 1);
        assert!(!cli.continue_on_limit);
        assert_eq!(cli.keyword_misa_10, "Misa 10h");
        assert_eq!(cli.privacy, "unlisted");
    }

    #[test]
    fn backend_and_account_flags() {
        let cli = Cli::parse_from([
            "emisiones",
            "--backend",
            "studio",
            "--account",
            "secondary",
            "--channel-id",
            "UCabc",
        ]);
        assert_eq!(cli.backend, BackendKind::Studio);
        assert_eq!(cli.account, Account::Secondary);
        assert_eq!(cli.channel_id.as_deref(), Some("UCabc"));
    }

    #[test]
    fn account_env_prefixes() {
        assert_eq!(Account::Primary.env_prefix(), "EMISIONES_PRIMARY");
        assert_eq!(Account::Secondary.env_prefix(), "EMISIONES_SECONDARY");
    }

    #[test]
    fn keyword_overrides() {
        let cli = Cli::parse_from(["emisiones", "--keyword-misa-10", "Morning service"]);
        assert_eq!(cli.keyword_misa_10, "Morning service");
        assert_eq!(cli.keyword_misa_12, "Misa 12h");
    }
}
