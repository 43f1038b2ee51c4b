//! Orchestration layer for Stockflow simulations.
//!
//! Loads `stockflow-config.yaml`, resolves a run request against a catalog
//! model, and executes single runs or concurrent scenario sweeps.
//!
//! # Modules
//!
//! - [`config`] -- [`StockflowConfig`] and its sections
//! - [`runner`] -- [`prepare`], [`execute`], and [`sweep`]

pub mod config;
pub mod runner;

pub use config::{
    ConfigError, ConfigSource, DEFAULT_CONFIG_FILE, LOG_ENV_VAR, LoggingConfig, OutputConfig,
    OutputFormat, RunConfig, StockflowConfig, SweepConfig,
};
pub use runner::{PreparedRun, RunOutcome, RunnerError, SweepSummary, execute, prepare, sweep};
