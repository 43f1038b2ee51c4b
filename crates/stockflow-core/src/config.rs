//! Configuration loading and typed config structures for Stockflow runs.
//!
//! The configuration lives in `stockflow-config.yaml` at the project root
//! (overridable with `--config`). Every section and field has a default,
//! so an empty or missing file yields a runnable configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "stockflow-config.yaml";

/// Environment variable overriding `logging.level`.
pub const LOG_ENV_VAR: &str = "STOCKFLOW_LOG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `stockflow-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockflowConfig {
    /// What to run.
    #[serde(default)]
    pub run: RunConfig,

    /// How to print results.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Scenario sweep settings.
    #[serde(default)]
    pub sweep: SweepConfig,
}

impl StockflowConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `STOCKFLOW_LOG` overrides `logging.level`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a mapping.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.logging.apply_env_overrides();
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    ///
    /// Nothing is logged here: the log level comes from the returned
    /// configuration, so callers report the [`ConfigSource`] once their
    /// subscriber is installed.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file) for an existing file.
    pub fn load_or_default(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        if path.exists() {
            Ok((Self::from_file(path)?, ConfigSource::File))
        } else {
            let mut config = Self::default();
            config.logging.apply_env_overrides();
            Ok((config, ConfigSource::Defaults))
        }
    }
}

/// Where a configuration returned by
/// [`load_or_default`](StockflowConfig::load_or_default) came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from the requested file.
    File,
    /// The file does not exist; every value is a default.
    Defaults,
}

/// The run to perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Catalog model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Scenario whose overrides apply on top of the defaults.
    #[serde(default)]
    pub scenario: Option<String>,

    /// Final time; the model's default when absent.
    #[serde(default)]
    pub final_time: Option<f64>,

    /// Integration step; the model's default when absent.
    #[serde(default)]
    pub time_step: Option<f64>,

    /// Explicit parameter values. These win over scenario overrides.
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,

    /// Initial stock values replacing the model's.
    #[serde(default)]
    pub initial_stocks: BTreeMap<String, f64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            scenario: None,
            final_time: None,
            time_step: None,
            parameters: BTreeMap::new(),
            initial_stocks: BTreeMap::new(),
        }
    }
}

/// Table output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated values with a header row, `time` first.
    #[default]
    Csv,
    /// Pretty-printed JSON.
    Json,
}

impl core::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format {other:?} (expected csv or json)")),
        }
    }
}

impl core::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Json => "json",
        })
    }
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Columns to print after `time`; empty prints every column.
    #[serde(default)]
    pub columns: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter
    /// directive.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LoggingConfig {
    /// Replace `level` with `STOCKFLOW_LOG` when set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var(LOG_ENV_VAR)
            && !level.trim().is_empty()
        {
            self.level = level;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Scenario sweep settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Maximum number of runs executing at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
        }
    }
}

fn default_model() -> String {
    String::from("ai_capex_dynamics")
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_max_concurrent() -> usize {
    4
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = StockflowConfig::default();
        assert_eq!(config.run.model, "ai_capex_dynamics");
        assert!(config.run.scenario.is_none());
        assert_eq!(config.output.format, OutputFormat::Csv);
        assert_eq!(config.sweep.max_concurrent, 4);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
run:
  model: silver_supply_dynamics
  scenario: "Silver Squeeze 2.0"
  final_time: 12
  time_step: 0.5
  parameters:
    social_media_amplifier: 5.5
  initial_stocks:
    silver_price: 40
output:
  format: json
  columns: [silver_price, retail_sentiment]
sweep:
  max_concurrent: 2
"#;
        let config = StockflowConfig::parse(yaml).unwrap();
        assert_eq!(config.run.model, "silver_supply_dynamics");
        assert_eq!(config.run.scenario.as_deref(), Some("Silver Squeeze 2.0"));
        assert_eq!(config.run.final_time, Some(12.0));
        assert_eq!(config.run.parameters.get("social_media_amplifier"), Some(&5.5));
        assert_eq!(config.run.initial_stocks.get("silver_price"), Some(&40.0));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.columns.len(), 2);
        assert_eq!(config.sweep.max_concurrent, 2);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = StockflowConfig::parse("output:\n  format: csv\n").unwrap();
        assert_eq!(config.run, RunConfig::default());
        assert_eq!(config.sweep, SweepConfig::default());
    }

    #[test]
    fn empty_document_is_default() {
        let config = StockflowConfig::parse("  \n").unwrap();
        assert_eq!(config.run, RunConfig::default());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = StockflowConfig::parse("run: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let (config, source) =
            StockflowConfig::load_or_default(Path::new("/nonexistent/stockflow-config.yaml"))
                .unwrap();
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(config.run.model, "ai_capex_dynamics");
    }

    #[test]
    fn sample_config_parses() {
        let config = StockflowConfig::parse(include_str!("../../../stockflow-config.yaml")).unwrap();
        assert_eq!(config.run, RunConfig::default());
        assert_eq!(config.output, OutputConfig::default());
        assert_eq!(config.sweep, SweepConfig::default());
    }

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
