//! Loading `stockflow-config.yaml` from disk and running what it describes.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use stockflow_core::{ConfigError, ConfigSource, OutputFormat, StockflowConfig, execute, prepare};

fn write_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("stockflow-{}-{name}.yaml", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn file_config_drives_a_run() {
    let path = write_config(
        "drives-a-run",
        r"
run:
  model: sodium_battery_energy
  final_time: 10
  time_step: 1
output:
  format: json
",
    );
    let config = StockflowConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.output.format, OutputFormat::Json);

    let definition = stockflow_models::load(&config.run.model).unwrap();
    let outcome = execute(&prepare(&definition, &config.run).unwrap()).unwrap();
    assert_eq!(outcome.model, "sodium_battery_energy");
    assert_eq!(outcome.table.len(), 11);
}

#[test]
fn existing_file_is_reported_as_the_source() {
    let path = write_config("source", "logging:\n  level: warn\n");
    let (config, source) = StockflowConfig::load_or_default(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(source, ConfigSource::File);
    assert_eq!(config.output.format, OutputFormat::Csv);
}

#[test]
fn unreadable_path_is_an_io_error() {
    let result = StockflowConfig::from_file(&std::env::temp_dir().join("stockflow-missing/none.yaml"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn malformed_file_is_a_yaml_error() {
    let path = write_config("malformed", "sweep:\n  max_concurrent: many\n");
    let result = StockflowConfig::from_file(&path);
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(result, Err(ConfigError::Yaml { .. })));
}
