//! CLI error types.

use thiserror::Error;

use emisiones_core::CatalogError;
use emisiones_engine::EngineError;
use emisiones_providers::ProviderError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that abort a run before or during reconciliation.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Catalog construction failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A backend could not be constructed.
    #[error("backend error: {0}")]
    Provider(#[from] ProviderError),

    /// The reconciliation run itself failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
