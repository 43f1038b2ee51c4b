//! Rendering of catalogs, model descriptions, result tables, and sweep
//! summaries.
//!
//! Every writer takes any [`Write`] sink so `main` can hand it a locked
//! stdout and tests a byte buffer. Tables go out as CSV (header row, `time`
//! first) or pretty-printed JSON.

use std::io::Write;

use serde::Serialize;
use stockflow_core::SweepSummary;
use stockflow_engine::{Selection, TIME_COLUMN};
use stockflow_models::{ModelDefinition, ModelInfo};
use stockflow_types::RunSummary;

use crate::error::CliError;

/// Label used for the run without scenario overrides.
const BASELINE: &str = "baseline";

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// One line per model: identifier, then title.
pub fn write_catalog<W: Write>(models: &[ModelDefinition], mut writer: W) -> Result<(), CliError> {
    for model in models {
        writeln!(writer, "{:<32} {}", model.id(), model.title())?;
    }
    Ok(())
}

/// Human-readable model description.
pub fn write_description<W: Write>(info: &ModelInfo, mut writer: W) -> Result<(), CliError> {
    writeln!(writer, "{} -- {}", info.id, info.title)?;
    writeln!(writer, "{}", info.description)?;

    writeln!(writer, "\nStocks:")?;
    for stock in &info.stocks {
        write!(
            writer,
            "  {:<32} initial {:<10} floor {}",
            stock.name, stock.initial, stock.floor
        )?;
        if let Some(flows) = info.flows.get(&stock.name) {
            if !flows.inflows.is_empty() {
                write!(writer, "  in: {}", flows.inflows.join(", "))?;
            }
            if !flows.outflows.is_empty() {
                write!(writer, "  out: {}", flows.outflows.join(", "))?;
            }
        }
        writeln!(writer)?;
    }

    writeln!(writer, "\nEvaluation order:")?;
    for (position, name) in info.evaluation_order.iter().enumerate() {
        let inputs = info.inputs.get(name).map(|inputs| inputs.join(", "));
        writeln!(
            writer,
            "  {:>3}. {name:<32} <- {}",
            position.saturating_add(1),
            inputs.as_deref().unwrap_or("")
        )?;
    }

    writeln!(writer, "\nParameters:")?;
    for parameter in &info.parameters {
        writeln!(
            writer,
            "  {:<32} {:<10} [{}, {}] step {}  {}",
            parameter.name,
            parameter.default,
            parameter.min,
            parameter.max,
            parameter.step,
            parameter.unit
        )?;
    }

    let controls = &info.time_controls;
    writeln!(
        writer,
        "\nTime: final {} (max {}), step {} (range [{}, {}])",
        controls.final_time,
        controls.final_time_max,
        controls.time_step,
        controls.time_step_min,
        controls.time_step_max
    )?;

    writeln!(writer, "\nScenarios:")?;
    for scenario in &info.scenarios {
        let overrides: Vec<String> = scenario
            .overrides
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        writeln!(writer, "  {}: {}", scenario.name, overrides.join(", "))?;
        writeln!(writer, "    {}", scenario.description)?;
    }
    Ok(())
}

/// Model description as pretty-printed JSON.
pub fn write_description_json<W: Write>(info: &ModelInfo, mut writer: W) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut writer, info)?;
    writeln!(writer)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Single runs
// ---------------------------------------------------------------------------

/// Selected columns as CSV, `time` first.
pub fn write_run_csv<W: Write>(selection: &Selection, writer: W) -> Result<(), CliError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(
        std::iter::once(TIME_COLUMN).chain(selection.series.iter().map(|s| s.name.as_str())),
    )?;
    for (row, time) in selection.time.iter().enumerate() {
        let values = selection
            .series
            .iter()
            .map(|series| series.values.get(row).copied().unwrap_or(f64::NAN));
        csv.write_record(std::iter::once(*time).chain(values).map(|v| v.to_string()))?;
    }
    csv.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct RunReport<'a> {
    run: &'a RunSummary,
    table: &'a Selection,
}

/// Run metadata and selected columns as pretty-printed JSON.
pub fn write_run_json<W: Write>(
    summary: &RunSummary,
    selection: &Selection,
    mut writer: W,
) -> Result<(), CliError> {
    let report = RunReport {
        run: summary,
        table: selection,
    };
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Sweeps
// ---------------------------------------------------------------------------

/// One CSV row per run: scenario name, then the final value of every stock.
pub fn write_sweep_csv<W: Write>(summary: &SweepSummary, writer: W) -> Result<(), CliError> {
    let stocks: Vec<&str> = summary
        .runs
        .first()
        .map(|run| run.final_stocks.keys().map(String::as_str).collect())
        .unwrap_or_default();

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(std::iter::once("scenario").chain(stocks.iter().copied()))?;
    for run in &summary.runs {
        let values = stocks.iter().map(|stock| {
            run.final_stocks
                .get(*stock)
                .map_or_else(String::new, ToString::to_string)
        });
        csv.write_record(
            std::iter::once(run.scenario.as_deref().unwrap_or(BASELINE).to_owned()).chain(values),
        )?;
    }
    csv.flush()?;
    Ok(())
}

/// The full sweep summary as pretty-printed JSON.
pub fn write_sweep_json<W: Write>(summary: &SweepSummary, mut writer: W) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)?;
    Ok(())
}
