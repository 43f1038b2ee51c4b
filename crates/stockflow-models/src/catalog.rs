//! Lookup of built-in models by identifier.

use stockflow_engine::ModelError;
use tracing::debug;

use crate::definition::ModelDefinition;
use crate::error::CatalogError;
use crate::models::{
    ai_agent_disruption, ai_capex_dynamics, ai_negative_growth, silver_supply_dynamics,
    sodium_battery_energy, solar_ai_power, structural_oil_supply_shortage,
};

type Constructor = fn() -> Result<ModelDefinition, ModelError>;

/// Every built-in model, in listing order.
const ENTRIES: [(&str, Constructor); 7] = [
    (ai_capex_dynamics::ID, ai_capex_dynamics::definition),
    (ai_agent_disruption::ID, ai_agent_disruption::definition),
    (ai_negative_growth::ID, ai_negative_growth::definition),
    (silver_supply_dynamics::ID, silver_supply_dynamics::definition),
    (sodium_battery_energy::ID, sodium_battery_energy::definition),
    (solar_ai_power::ID, solar_ai_power::definition),
    (
        structural_oil_supply_shortage::ID,
        structural_oil_supply_shortage::definition,
    ),
];

/// Identifiers of every built-in model in a stable order.
pub fn catalog() -> Vec<&'static str> {
    ENTRIES.iter().map(|(id, _)| *id).collect()
}

/// Build the model with identifier `id`.
///
/// Each call builds a fresh graph; callers that run a model repeatedly
/// should keep the returned definition and share its graph.
///
/// # Errors
///
/// Returns [`CatalogError::UnknownModel`] if no model has this identifier.
pub fn load(id: &str) -> Result<ModelDefinition, CatalogError> {
    let (_, constructor) = ENTRIES
        .iter()
        .find(|(candidate, _)| *candidate == id)
        .ok_or_else(|| CatalogError::UnknownModel { id: id.to_owned() })?;
    let definition = constructor()?;
    debug!(
        model = id,
        stocks = definition.graph().stock_count(),
        parameters = definition.parameter_specs().len(),
        scenarios = definition.scenarios().len(),
        "model loaded"
    );
    Ok(definition)
}

/// Build every built-in model in listing order.
///
/// # Errors
///
/// Fails on the first model whose graph does not build.
pub fn load_all() -> Result<Vec<ModelDefinition>, CatalogError> {
    ENTRIES
        .iter()
        .map(|(_, constructor)| constructor().map_err(CatalogError::from))
        .collect()
}
