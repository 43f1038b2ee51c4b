//! Fixed-step explicit Euler integration.
//!
//! [`run`] is a pure function of its inputs. All mutable state lives in a
//! run state owned by a single call, so any number of runs may share one
//! [`VariableGraph`] concurrently.
//!
//! # Step
//!
//! Starting at `t = 0` with stocks at their initial values, each step:
//!
//! 1. evaluates every computed variable in the graph's evaluation order,
//! 2. appends a row holding `t` and every pre-update value,
//! 3. advances each connected stock by `dt * net_rate` and clamps it to its
//!    floor,
//! 4. advances `t` by `dt`.
//!
//! The loop continues while `t <= t_end + dt / 2`, which yields
//! `floor(t_end / dt) + 1` rows for steps that divide the horizon.

use std::collections::{BTreeMap, BTreeSet};

use stockflow_types::Row;
use tracing::{debug, warn};

use crate::error::ModelError;
use crate::graph::{Inputs, StockDef, Symbol, VariableGraph};
use crate::guard::guard_at_least;
use crate::params::ParameterSet;
use crate::table::ResultTable;

/// Largest number of rows a single run may produce.
pub const MAX_ROWS: u32 = 10_000_000;

/// Step size, horizon, and initial-value overrides for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSpec {
    time_step: f64,
    final_time: f64,
    initial_overrides: BTreeMap<String, f64>,
}

impl RunSpec {
    /// A run from `t = 0` to `final_time` in steps of `time_step`.
    pub const fn new(time_step: f64, final_time: f64) -> Self {
        Self {
            time_step,
            final_time,
            initial_overrides: BTreeMap::new(),
        }
    }

    /// Start `stock` at `value` instead of its declared initial value.
    #[must_use]
    pub fn with_initial(mut self, stock: &str, value: f64) -> Self {
        self.initial_overrides.insert(stock.to_owned(), value);
        self
    }

    /// Integration step.
    pub const fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Final time.
    pub const fn final_time(&self) -> f64 {
        self.final_time
    }

    /// Initial-value overrides keyed by stock name.
    pub const fn initial_overrides(&self) -> &BTreeMap<String, f64> {
        &self.initial_overrides
    }

    /// Check the step and horizon.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidTimeStep`] unless `time_step` is positive
    /// and finite, [`ModelError::InvalidFinalTime`] unless `final_time` is
    /// non-negative and finite, and [`ModelError::TooManySteps`] when the run
    /// would exceed [`MAX_ROWS`] rows.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(ModelError::InvalidTimeStep {
                time_step: self.time_step,
            });
        }
        if !self.final_time.is_finite() || self.final_time < 0.0 {
            return Err(ModelError::InvalidFinalTime {
                final_time: self.final_time,
            });
        }
        let rows = (self.final_time / self.time_step + 0.5).floor() + 1.0;
        if rows > f64::from(MAX_ROWS) {
            return Err(ModelError::TooManySteps {
                rows,
                limit: MAX_ROWS,
            });
        }
        Ok(())
    }
}

/// Mutable values of one run. Never shared between runs.
#[derive(Debug, Clone)]
pub(crate) struct RunState {
    stocks: Vec<f64>,
    parameters: Vec<f64>,
    computed: Vec<f64>,
}

impl RunState {
    /// Validate a run request against `graph` and set up the initial state.
    ///
    /// # Errors
    ///
    /// Fails with the first validation error: step and horizon, then stock
    /// overrides, then the first missing referenced parameter in name order,
    /// then the first non-finite referenced parameter in name order.
    pub(crate) fn prepare(
        graph: &VariableGraph,
        parameters: &ParameterSet,
        spec: &RunSpec,
    ) -> Result<Self, ModelError> {
        spec.validate()?;

        let mut stocks: Vec<f64> = graph.stocks.iter().map(StockDef::initial).collect();
        for (name, value) in &spec.initial_overrides {
            let (position, definition) = graph
                .stocks
                .iter()
                .enumerate()
                .find(|(_, stock)| stock.name() == name)
                .ok_or_else(|| ModelError::UnknownStock { name: name.clone() })?;
            let floor = definition.floor();
            if !value.is_finite() {
                return Err(ModelError::NonFinite {
                    name: name.clone(),
                    value: *value,
                });
            }
            if *value < floor {
                return Err(ModelError::InitialBelowFloor {
                    stock: name.clone(),
                    initial: *value,
                    floor,
                });
            }
            if let Some(slot) = stocks.get_mut(position) {
                *slot = *value;
            }
        }

        let referenced: BTreeSet<&str> = graph.referenced_parameters().into_iter().collect();
        if let Some(missing) = referenced.iter().find(|name| !parameters.contains(name)) {
            return Err(ModelError::MissingParameter {
                name: (*missing).to_owned(),
            });
        }
        // A NaN rate would slip through the floor clamp into every later row.
        if let Some((name, value)) = referenced
            .iter()
            .filter_map(|name| Some((*name, parameters.get(name)?)))
            .find(|(_, value)| !value.is_finite())
        {
            return Err(ModelError::NonFinite {
                name: name.to_owned(),
                value,
            });
        }

        for (name, _) in parameters.iter() {
            if !graph.parameters.iter().any(|declared| declared == name) {
                warn!(parameter = name, "ignoring value for undeclared parameter");
            }
        }

        // Unreferenced parameters may be absent; nothing reads them.
        let parameters = graph
            .parameters
            .iter()
            .map(|name| parameters.get(name).unwrap_or(f64::NAN))
            .collect();

        Ok(Self {
            stocks,
            parameters,
            computed: vec![f64::NAN; graph.computed.len()],
        })
    }

    fn lookup(&self, symbol: Symbol) -> f64 {
        let value = match symbol {
            Symbol::Parameter(index) => self.parameters.get(index),
            Symbol::Stock(index) => self.stocks.get(index),
            Symbol::Computed(index) => self.computed.get(index),
        };
        value.copied().unwrap_or(f64::NAN)
    }

    /// Evaluate every computed variable in evaluation order.
    fn evaluate(&mut self, graph: &VariableGraph, scratch: &mut Vec<f64>) {
        for &index in &graph.order {
            let Some(variable) = graph.computed.get(index) else {
                continue;
            };
            scratch.clear();
            scratch.extend(
                variable
                    .definition
                    .sources
                    .iter()
                    .map(|source| self.lookup(*source)),
            );
            let inputs = Inputs::new(&variable.definition.inputs, scratch);
            let value = (variable.definition.compute)(&inputs);
            if let Some(slot) = self.computed.get_mut(index) {
                *slot = value;
            }
        }
    }

    /// Snapshot the current values as a row.
    fn row(&self, graph: &VariableGraph, time: f64) -> Row {
        Row {
            time,
            values: graph
                .column_sources
                .iter()
                .map(|source| self.lookup(*source))
                .collect(),
        }
    }

    /// Apply one Euler step to every connected stock.
    fn advance(&mut self, graph: &VariableGraph, time_step: f64) {
        for ((stock, rate), definition) in self
            .stocks
            .iter_mut()
            .zip(&graph.rates)
            .zip(&graph.stocks)
        {
            let Some(rate) = rate else {
                continue;
            };
            let sum = |indices: &[usize]| -> f64 {
                indices
                    .iter()
                    .map(|index| self.computed.get(*index).copied().unwrap_or(f64::NAN))
                    .sum()
            };
            let net_rate = sum(&rate.inflows) - sum(&rate.outflows);
            *stock = guard_at_least(*stock + time_step * net_rate, definition.floor());
        }
    }
}

/// Integrate `graph` from `t = 0` to `spec.final_time()`.
///
/// # Errors
///
/// Every error is raised before the first step: step and horizon, then
/// initial overrides, then missing or non-finite referenced parameters.
/// Non-finite values produced by model formulas are not errors and appear
/// in the table as-is.
pub fn run(
    graph: &VariableGraph,
    parameters: &ParameterSet,
    spec: &RunSpec,
) -> Result<ResultTable, ModelError> {
    let mut state = RunState::prepare(graph, parameters, spec)?;
    let time_step = spec.time_step;
    let limit = spec.final_time + time_step / 2.0;

    debug!(
        time_step,
        final_time = spec.final_time,
        overrides = spec.initial_overrides.len(),
        "run started"
    );

    let mut rows = Vec::new();
    let mut scratch = Vec::new();
    let mut time = 0.0_f64;
    while time <= limit {
        state.evaluate(graph, &mut scratch);
        rows.push(state.row(graph, time));
        state.advance(graph, time_step);
        time += time_step;
    }

    debug!(rows = rows.len(), "run finished");
    Ok(ResultTable::new(graph.columns.clone(), rows))
}
