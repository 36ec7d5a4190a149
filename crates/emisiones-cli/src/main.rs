//! emisiones entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, warn};

use emisiones_cli::cli::{BackendKind, Cli};
use emisiones_cli::config::Settings;
use emisiones_cli::error::{CliError, CliResult};
use emisiones_core::{TracingConfig, TracingOutputFormat, init_tracing};
use emisiones_engine::{RunResult, run};
use emisiones_providers::{ApiBackend, StudioBackend};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut tracing_config = TracingConfig::default();
    if cli.debug {
        tracing_config = tracing_config.with_level(Level::DEBUG);
    }
    if cli.log_json {
        tracing_config = tracing_config.with_format(TracingOutputFormat::Json);
    }
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match execute(cli).await {
        // Stopping on a provider limit is an expected end of a run.
        Ok(result) if result.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> CliResult<RunResult> {
    let settings = Settings::from_cli(&cli)?;

    // Listing always goes through the API, whichever backend creates.
    let api = ApiBackend::new(settings.api.clone())?;

    let result = match settings.backend {
        BackendKind::Api => run(&settings.engine, &api, &api).await?,
        BackendKind::Studio => {
            let studio_config = settings
                .studio
                .ok_or_else(|| CliError::Config("studio settings missing".to_string()))?;
            let studio = StudioBackend::new(studio_config)?;
            let result = run(&settings.engine, &api, &studio).await;
            if let Err(e) = studio.close().await {
                warn!(error = %e, "failed to close studio session");
            }
            result?
        }
    };

    Ok(result)
}
