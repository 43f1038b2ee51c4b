//! Command-line entry point for Stockflow.
//!
//! Lists and describes the built-in models, runs one model with overrides,
//! or sweeps every scenario of a model concurrently. Settings come from
//! `stockflow-config.yaml` (see `stockflow-core`) and command-line flags,
//! with flags taking precedence.
//!
//! Logs go to stderr so stdout carries only the requested output.

mod error;
mod output;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use stockflow_core::{
    ConfigSource, DEFAULT_CONFIG_FILE, OutputFormat, RunConfig, StockflowConfig, execute, prepare,
    sweep,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "stockflow")]
#[command(about = "Fixed-step stock-and-flow simulations of economic models")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the built-in models
    List,

    /// Show a model's stocks, evaluation order, parameters, and scenarios
    Describe {
        /// Model identifier
        model: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run one model and print its result table
    Run(RunArgs),

    /// Run the baseline and every scenario, printing final stock values
    Sweep {
        /// Model identifier (defaults to the configured model)
        #[arg(long)]
        model: Option<String>,

        /// Output format (csv or json)
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Maximum number of runs executing at once
        #[arg(long)]
        max_concurrent: Option<usize>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Model identifier (defaults to the configured model)
    #[arg(long)]
    model: Option<String>,

    /// Scenario to apply on top of the defaults
    #[arg(long)]
    scenario: Option<String>,

    /// Final simulation time
    #[arg(long)]
    final_time: Option<f64>,

    /// Integration step
    #[arg(long)]
    time_step: Option<f64>,

    /// Parameter override, repeatable
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    parameters: Vec<(String, f64)>,

    /// Initial stock value, repeatable
    #[arg(long = "initial", value_name = "STOCK=VALUE", value_parser = parse_assignment)]
    initial_stocks: Vec<(String, f64)>,

    /// Output format (csv or json)
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Columns to print after `time` (comma-separated, default all)
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,
}

/// Parse a `NAME=VALUE` flag.
fn parse_assignment(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in {raw:?}"));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|err| format!("invalid value in {raw:?}: {err}"))?;
    Ok((name.to_owned(), value))
}

/// Point `run` at `model`. Scenario, parameters, and initial values from the
/// config describe the configured model, so switching models drops them.
fn retarget(run: &mut RunConfig, model: String) {
    if run.model != model {
        debug!(from = %run.model, to = %model, "model overridden on the command line");
        *run = RunConfig {
            model,
            final_time: run.final_time,
            time_step: run.time_step,
            ..RunConfig::default()
        };
    }
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the
/// subcommand fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    try_main(Cli::parse()).await?;
    Ok(())
}

/// Loads configuration, initializes logging, then dispatches the
/// subcommand.
async fn try_main(cli: Cli) -> Result<(), CliError> {
    let (config, source) = StockflowConfig::load_or_default(&cli.config)?;
    init_logging(&config.logging.level);
    report_config_source(&cli.config, source);

    match cli.command {
        Command::List => list(),
        Command::Describe { model, json } => describe(&model, json),
        Command::Run(args) => run(config, args),
        Command::Sweep {
            model,
            format,
            max_concurrent,
        } => run_sweep(config, model, format, max_concurrent).await,
    }
}

/// Install the stderr subscriber. `STOCKFLOW_LOG` has already replaced the
/// configured level.
fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn report_config_source(path: &Path, source: ConfigSource) {
    match source {
        ConfigSource::File => debug!(path = %path.display(), "configuration file loaded"),
        ConfigSource::Defaults => {
            info!(path = %path.display(), "config file not found, using defaults");
        }
    }
}

fn list() -> Result<(), CliError> {
    let models = stockflow_models::load_all()?;
    output::write_catalog(&models, std::io::stdout().lock())
}

fn describe(model: &str, json: bool) -> Result<(), CliError> {
    let info = stockflow_models::load(model)?.info();
    let out = std::io::stdout().lock();
    if json {
        output::write_description_json(&info, out)
    } else {
        output::write_description(&info, out)
    }
}

fn run(config: StockflowConfig, args: RunArgs) -> Result<(), CliError> {
    let mut request = config.run;
    if let Some(model) = args.model {
        retarget(&mut request, model);
    }
    if args.scenario.is_some() {
        request.scenario = args.scenario;
    }
    request.final_time = args.final_time.or(request.final_time);
    request.time_step = args.time_step.or(request.time_step);
    request.parameters.extend(args.parameters);
    request.initial_stocks.extend(args.initial_stocks);

    let format = args.format.unwrap_or(config.output.format);
    let columns = if args.columns.is_empty() {
        config.output.columns
    } else {
        args.columns
    };

    let definition = stockflow_models::load(&request.model)?;
    let outcome = execute(&prepare(&definition, &request)?)?;
    let selection = outcome.table.select(&columns)?;
    info!(
        run_id = %outcome.run_id,
        model = %outcome.model,
        scenario = outcome.scenario.as_deref().unwrap_or("baseline"),
        rows = outcome.table.len(),
        "run complete"
    );

    let out = std::io::stdout().lock();
    match format {
        OutputFormat::Csv => output::write_run_csv(&selection, out),
        OutputFormat::Json => output::write_run_json(&outcome.summary(), &selection, out),
    }
}

async fn run_sweep(
    config: StockflowConfig,
    model: Option<String>,
    format: Option<OutputFormat>,
    max_concurrent: Option<usize>,
) -> Result<(), CliError> {
    let mut request = config.run;
    if let Some(model) = model {
        retarget(&mut request, model);
    }
    let definition = stockflow_models::load(&request.model)?;
    let summary = sweep(
        &definition,
        &request,
        max_concurrent.unwrap_or(config.sweep.max_concurrent),
    )
    .await?;
    info!(
        sweep_id = %summary.sweep_id,
        model = %summary.model,
        runs = summary.runs.len(),
        "sweep complete"
    );

    let out = std::io::stdout().lock();
    match format.unwrap_or(config.output.format) {
        OutputFormat::Csv => output::write_sweep_csv(&summary, out),
        OutputFormat::Json => output::write_sweep_json(&summary, out),
    }
}
