//! Run preparation, single runs, and concurrent scenario sweeps.
//!
//! A run is resolved from a [`ModelDefinition`] and a [`RunConfig`] into a
//! [`PreparedRun`], which owns everything the integrator needs and can be
//! moved onto a worker thread. [`sweep`] executes the baseline and every
//! named scenario of a model on Tokio's blocking pool.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use stockflow_engine::{ModelError, ParameterSet, ResultTable, RunSpec, VariableGraph, run};
use stockflow_models::{CatalogError, ModelDefinition};
use stockflow_types::{RunId, RunSummary, SweepId};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::RunConfig;

/// Errors that can occur while preparing or executing runs.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The model or scenario could not be resolved.
    #[error("catalog error: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: CatalogError,
    },

    /// The engine rejected the run request.
    #[error("model error: {source}")]
    Model {
        /// The underlying engine error.
        #[from]
        source: ModelError,
    },

    /// A runner setting is unusable.
    #[error("invalid runner configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with the setting.
        reason: String,
    },

    /// A sweep worker panicked or was cancelled.
    #[error("sweep task failed: {source}")]
    Join {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },

    /// The sweep's concurrency limiter was closed.
    #[error("sweep scheduler closed: {source}")]
    Scheduler {
        /// The underlying acquire error.
        #[from]
        source: tokio::sync::AcquireError,
    },
}

// ---------------------------------------------------------------------------
// Single runs
// ---------------------------------------------------------------------------

/// A fully resolved run request, ready to execute.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    model: &'static str,
    scenario: Option<String>,
    graph: Arc<VariableGraph>,
    parameters: ParameterSet,
    spec: RunSpec,
}

impl PreparedRun {
    /// Catalog model identifier.
    pub const fn model(&self) -> &'static str {
        self.model
    }

    /// Scenario applied on top of the defaults, if any.
    pub fn scenario(&self) -> Option<&str> {
        self.scenario.as_deref()
    }

    /// Resolved parameter values.
    pub const fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Resolved step, horizon, and initial overrides.
    pub const fn spec(&self) -> &RunSpec {
        &self.spec
    }
}

/// Resolve `config` against `definition`.
///
/// Parameters start at the slider defaults, then take the scenario's
/// overrides, then the explicit values from `config` (explicit values
/// win). Time controls fall back to the model's defaults. Values outside a
/// slider's range are logged and kept.
///
/// # Errors
///
/// Returns [`RunnerError::Catalog`] for an unknown scenario. Step, horizon
/// and initial-value problems surface from [`execute`].
pub fn prepare(definition: &ModelDefinition, config: &RunConfig) -> Result<PreparedRun, RunnerError> {
    let mut parameters = definition.parameters_for(config.scenario.as_deref())?;
    parameters.extend(
        config
            .parameters
            .iter()
            .map(|(name, value)| (name.as_str(), *value)),
    );

    for (name, value) in parameters.iter() {
        if let Some(spec) = definition.parameter_spec(name)
            && !spec.contains(value)
        {
            warn!(
                model = definition.id(),
                parameter = name,
                value,
                min = spec.min,
                max = spec.max,
                "parameter outside slider range"
            );
        }
    }

    let controls = definition.time_controls();
    let time_step = config.time_step.unwrap_or(controls.time_step);
    let final_time = config.final_time.unwrap_or(controls.final_time);
    if time_step < controls.time_step_min || time_step > controls.time_step_max {
        warn!(
            model = definition.id(),
            time_step,
            min = controls.time_step_min,
            max = controls.time_step_max,
            "time step outside control range"
        );
    }
    if final_time > controls.final_time_max {
        warn!(
            model = definition.id(),
            final_time,
            max = controls.final_time_max,
            "final time beyond control range"
        );
    }

    let spec = config
        .initial_stocks
        .iter()
        .fold(RunSpec::new(time_step, final_time), |spec, (stock, value)| {
            spec.with_initial(stock, *value)
        });

    Ok(PreparedRun {
        model: definition.id(),
        scenario: config.scenario.clone(),
        graph: Arc::clone(definition.graph()),
        parameters,
        spec,
    })
}

/// The result of executing one [`PreparedRun`].
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Identifier of the run.
    pub run_id: RunId,
    /// Catalog model identifier.
    pub model: String,
    /// Scenario applied, or `None` for the defaults.
    pub scenario: Option<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Integration step.
    pub time_step: f64,
    /// Final time.
    pub final_time: f64,
    /// The simulated trajectories.
    pub table: ResultTable,
}

impl RunOutcome {
    /// Compact summary holding only the final stock values.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id,
            model: self.model.clone(),
            scenario: self.scenario.clone(),
            started_at: self.started_at,
            time_step: self.time_step,
            final_time: self.final_time,
            rows: u64::try_from(self.table.len()).unwrap_or(u64::MAX),
            final_stocks: self.table.final_stocks(),
        }
    }
}

/// Execute a prepared run on the current thread.
///
/// # Errors
///
/// Returns [`RunnerError::Model`] when the engine rejects the request.
pub fn execute(prepared: &PreparedRun) -> Result<RunOutcome, RunnerError> {
    let run_id = RunId::new();
    let started_at = Utc::now();
    debug!(
        %run_id,
        model = prepared.model,
        scenario = prepared.scenario.as_deref().unwrap_or("baseline"),
        "executing run"
    );
    let table = run(&prepared.graph, &prepared.parameters, &prepared.spec)?;
    Ok(RunOutcome {
        run_id,
        model: prepared.model.to_owned(),
        scenario: prepared.scenario.clone(),
        started_at,
        time_step: prepared.spec.time_step(),
        final_time: prepared.spec.final_time(),
        table,
    })
}

// ---------------------------------------------------------------------------
// Scenario sweeps
// ---------------------------------------------------------------------------

/// Final values of every run in one sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    /// Identifier of the sweep.
    pub sweep_id: SweepId,
    /// Catalog model identifier.
    pub model: String,
    /// One summary per run: the baseline first, then each scenario in
    /// declaration order.
    pub runs: Vec<RunSummary>,
}

/// Run the baseline and every scenario of `definition` concurrently.
///
/// `config.scenario` is ignored; the explicit parameters, time controls
/// and initial values of `config` apply to every run. At most
/// `max_concurrent` runs execute at once. Results come back in
/// declaration order whatever order the workers finish in.
///
/// # Errors
///
/// Returns [`RunnerError::InvalidConfig`] if `max_concurrent` is zero, and
/// the first preparation, engine, or worker failure otherwise.
pub async fn sweep(
    definition: &ModelDefinition,
    config: &RunConfig,
    max_concurrent: usize,
) -> Result<SweepSummary, RunnerError> {
    if max_concurrent == 0 {
        return Err(RunnerError::InvalidConfig {
            reason: String::from("sweep.max_concurrent must be at least 1"),
        });
    }

    let sweep_id = SweepId::new();
    let scenarios: Vec<Option<String>> = std::iter::once(None)
        .chain(
            definition
                .scenarios()
                .iter()
                .map(|scenario| Some(scenario.name.clone())),
        )
        .collect();
    let total = scenarios.len();
    info!(
        %sweep_id,
        model = definition.id(),
        runs = total,
        max_concurrent,
        "starting scenario sweep"
    );

    let prepared = scenarios
        .into_iter()
        .map(|scenario| {
            prepare(
                definition,
                &RunConfig {
                    scenario,
                    ..config.clone()
                },
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let limiter = Arc::new(Semaphore::new(max_concurrent));
    let mut workers = JoinSet::new();
    for (index, job) in prepared.into_iter().enumerate() {
        let permit = Arc::clone(&limiter).acquire_owned().await?;
        workers.spawn_blocking(move || {
            let outcome = execute(&job);
            drop(permit);
            (index, outcome)
        });
    }

    let mut slots: Vec<Option<RunSummary>> = vec![None; total];
    let mut finished: usize = 0;
    while let Some(joined) = workers.join_next().await {
        let (index, outcome) = joined?;
        let summary = outcome?.summary();
        finished = finished.saturating_add(1);
        info!(
            %sweep_id,
            scenario = summary.scenario.as_deref().unwrap_or("baseline"),
            rows = summary.rows,
            finished,
            total,
            "sweep run finished"
        );
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(summary);
        }
    }

    Ok(SweepSummary {
        sweep_id,
        model: definition.id().to_owned(),
        runs: slots.into_iter().flatten().collect(),
    })
}
