//! A catalog model: its graph plus the metadata a frontend needs.
//!
//! Each built-in model is plain data on top of the engine: a frozen
//! [`VariableGraph`], slider metadata for every parameter, default time
//! controls, and the named scenarios from the model's narrative.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use stockflow_engine::{ParameterSet, ResultTable, RunSpec, VariableGraph, run};
use stockflow_types::{ParameterSpec, Scenario, TimeControls};

use crate::error::CatalogError;

/// Helper to build a [`ParameterSpec`].
pub(crate) fn param(
    name: &str,
    label: &str,
    unit: &str,
    default: f64,
    min: f64,
    max: f64,
    step: f64,
) -> ParameterSpec {
    ParameterSpec {
        name: name.to_owned(),
        label: label.to_owned(),
        unit: unit.to_owned(),
        default,
        min,
        max,
        step,
    }
}

/// Helper to build a [`Scenario`].
pub(crate) fn scenario(name: &str, description: &str, overrides: &[(&str, f64)]) -> Scenario {
    Scenario {
        name: name.to_owned(),
        description: description.to_owned(),
        overrides: overrides
            .iter()
            .map(|(key, value)| ((*key).to_owned(), *value))
            .collect(),
    }
}

/// A complete, runnable catalog model.
#[derive(Debug, Clone)]
pub struct ModelDefinition {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    graph: Arc<VariableGraph>,
    parameters: Vec<ParameterSpec>,
    time_controls: TimeControls,
    scenarios: Vec<Scenario>,
}

impl ModelDefinition {
    /// Assemble a definition. The graph is wrapped in an `Arc` so that
    /// concurrent runs share it.
    pub(crate) fn new(
        id: &'static str,
        title: &'static str,
        description: &'static str,
        graph: VariableGraph,
        parameters: Vec<ParameterSpec>,
        time_controls: TimeControls,
        scenarios: Vec<Scenario>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            graph: Arc::new(graph),
            parameters,
            time_controls,
            scenarios,
        }
    }

    /// Catalog identifier, e.g. `ai_capex_dynamics`.
    pub const fn id(&self) -> &'static str {
        self.id
    }

    /// Human-readable title.
    pub const fn title(&self) -> &'static str {
        self.title
    }

    /// One-paragraph summary of what the model captures.
    pub const fn description(&self) -> &'static str {
        self.description
    }

    /// The shared variable graph.
    pub const fn graph(&self) -> &Arc<VariableGraph> {
        &self.graph
    }

    /// Slider metadata for every parameter, in display order.
    pub fn parameter_specs(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Slider metadata for one parameter.
    pub fn parameter_spec(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|spec| spec.name == name)
    }

    /// Default and permitted run-length controls.
    pub const fn time_controls(&self) -> TimeControls {
        self.time_controls
    }

    /// Named scenarios in narrative order.
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Look up a scenario by name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownScenario`] if the model has no such
    /// scenario.
    pub fn scenario(&self, name: &str) -> Result<&Scenario, CatalogError> {
        self.scenarios
            .iter()
            .find(|scenario| scenario.name == name)
            .ok_or_else(|| CatalogError::UnknownScenario {
                model: self.id.to_owned(),
                name: name.to_owned(),
            })
    }

    /// Every parameter at its slider default.
    pub fn default_parameters(&self) -> ParameterSet {
        self.parameters
            .iter()
            .map(|spec| (spec.name.as_str(), spec.default))
            .collect()
    }

    /// Defaults with the named scenario's overrides applied. `None` yields
    /// the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownScenario`] for an unknown name.
    pub fn parameters_for(&self, scenario: Option<&str>) -> Result<ParameterSet, CatalogError> {
        let mut parameters = self.default_parameters();
        if let Some(name) = scenario {
            let scenario = self.scenario(name)?;
            parameters.extend(
                scenario
                    .overrides
                    .iter()
                    .map(|(key, value)| (key.as_str(), *value)),
            );
        }
        Ok(parameters)
    }

    /// Run spec using the default time controls.
    pub const fn default_run_spec(&self) -> RunSpec {
        RunSpec::new(self.time_controls.time_step, self.time_controls.final_time)
    }

    /// Run the model with its defaults and default time controls.
    ///
    /// # Errors
    ///
    /// Propagates engine validation errors; none occur for a well-formed
    /// catalog model.
    pub fn run_default(&self) -> Result<ResultTable, CatalogError> {
        Ok(run(
            &self.graph,
            &self.default_parameters(),
            &self.default_run_spec(),
        )?)
    }

    /// Serializable description for listings and `describe` output.
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            id: self.id.to_owned(),
            title: self.title.to_owned(),
            description: self.description.to_owned(),
            stocks: self
                .graph
                .stocks()
                .iter()
                .map(|stock| StockInfo {
                    name: stock.name().to_owned(),
                    initial: stock.initial(),
                    floor: stock.floor(),
                })
                .collect(),
            evaluation_order: self
                .graph
                .evaluation_order()
                .into_iter()
                .map(str::to_owned)
                .collect(),
            inputs: self.input_map(),
            flows: self.flow_map(),
            parameters: self.parameters.clone(),
            time_controls: self.time_controls,
            scenarios: self.scenarios.clone(),
        }
    }

    fn input_map(&self) -> BTreeMap<String, Vec<String>> {
        self.graph
            .evaluation_order()
            .into_iter()
            .filter_map(|name| {
                let inputs = self.graph.inputs_of(name)?;
                Some((name.to_owned(), inputs.to_vec()))
            })
            .collect()
    }

    fn flow_map(&self) -> BTreeMap<String, StockFlows> {
        self.graph
            .stocks()
            .iter()
            .filter_map(|stock| {
                let (inflows, outflows) = self.graph.stock_flows(stock.name())?;
                Some((
                    stock.name().to_owned(),
                    StockFlows {
                        inflows: inflows.into_iter().map(str::to_owned).collect(),
                        outflows: outflows.into_iter().map(str::to_owned).collect(),
                    },
                ))
            })
            .collect()
    }
}

/// Serializable model summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    /// Catalog identifier.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Summary paragraph.
    pub description: String,
    /// Stocks with initial values and floors.
    pub stocks: Vec<StockInfo>,
    /// Computed variables in evaluation order.
    pub evaluation_order: Vec<String>,
    /// Declared inputs of each computed variable.
    pub inputs: BTreeMap<String, Vec<String>>,
    /// Net-rate structure keyed by stock name.
    pub flows: BTreeMap<String, StockFlows>,
    /// Parameter slider metadata.
    pub parameters: Vec<ParameterSpec>,
    /// Time controls.
    pub time_controls: TimeControls,
    /// Named scenarios.
    pub scenarios: Vec<Scenario>,
}

/// A stock as listed in [`ModelInfo`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockInfo {
    /// Stock name.
    pub name: String,
    /// Initial value.
    pub initial: f64,
    /// Floor.
    pub floor: f64,
}

/// Inflows and outflows of one stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockFlows {
    /// Computed variables added to the stock.
    pub inflows: Vec<String>,
    /// Computed variables subtracted from the stock.
    pub outflows: Vec<String>,
}
