//! Error types for the command-line frontend.
//!
//! Wraps every subsystem error so subcommands can use `?` throughout.

use stockflow_core::{ConfigError, RunnerError};
use stockflow_engine::ModelError;
use stockflow_models::CatalogError;

/// Errors that can occur while executing a subcommand.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The configuration file could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The model or scenario could not be resolved.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The engine rejected a request, usually an unknown column.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// A run or sweep failed.
    #[error("runner error: {0}")]
    Runner(#[from] RunnerError),

    /// Writing CSV output failed.
    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing JSON output failed.
    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing to stdout failed.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}
