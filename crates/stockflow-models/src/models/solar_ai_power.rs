//! Solar plus storage deployment racing AI data-center demand.
//!
//! Cheaper panels attract more projects, but projects wait in an
//! interconnection queue that clears at a fixed fraction per year.
//! Clean output is compared with data-center demand growing exponentially.

use stockflow_engine::{GraphBuilder, ModelError, VariableGraph, guard_denominator};
use stockflow_types::{ParameterSpec, Scenario, TimeControls};

use crate::definition::{ModelDefinition, param, scenario};

/// Catalog identifier.
pub const ID: &str = "solar_ai_power";

const TITLE: &str = "Solar Power and AI Demand";

const DESCRIPTION: &str = "The race between solar-plus-storage deployment and \
AI-driven electricity demand, with cost learning on one side and a grid \
interconnection bottleneck on the other.";

/// Build the model definition.
///
/// # Errors
///
/// Returns a [`ModelError`] only if the graph below is malformed.
pub fn definition() -> Result<ModelDefinition, ModelError> {
    let parameters = parameters();
    let graph = graph(&parameters)?;
    Ok(ModelDefinition::new(
        ID,
        TITLE,
        DESCRIPTION,
        graph,
        parameters,
        TimeControls::new(30.0, 0.5),
        scenarios(),
    ))
}

fn parameters() -> Vec<ParameterSpec> {
    vec![
        param("solar_investment", "Solar Investment", "billion$/year", 400.0, 50.0, 2000.0, 19.5),
        param("panel_lifetime", "Panel Lifetime", "years", 30.0, 15.0, 40.0, 0.25),
        param("demand_growth_rate", "Demand Growth Rate", "1/year", 0.22, 0.05, 0.5, 0.0045),
        param("cost_learning_rate", "Cost Learning Rate", "1/year", 0.1, 0.02, 0.2, 0.0018),
        param("storage_investment", "Storage Investment", "billion$/year", 50.0, 5.0, 500.0, 4.95),
        param("storage_unit_cost", "Storage Unit Cost", "billion$/GWh", 0.15, 0.05, 0.5, 0.0045),
        param("connection_rate", "Connection Rate", "1/year", 0.5, 0.1, 0.8, 0.007),
        param("capacity_factor", "Capacity Factor", "dimensionless", 0.25, 0.1, 0.4, 0.003),
        param("battery_lifetime", "Battery Lifetime", "years", 15.0, 8.0, 25.0, 0.17),
        param("discharge_hours", "Discharge Hours", "hours", 4.0, 1.0, 12.0, 0.11),
        param("battery_efficiency", "Battery Efficiency", "dimensionless", 0.9, 0.8, 0.95, 0.0015),
    ]
}

fn scenarios() -> Vec<Scenario> {
    vec![
        scenario(
            "US Grid Bottleneck",
            "US-only view with severe interconnection delays (14% approval \
             rate) and aggressive AI demand.",
            &[
                ("connection_rate", 0.14),
                ("solar_investment", 100.0),
                ("demand_growth_rate", 0.25),
            ],
        ),
        scenario(
            "Global Fast Transition",
            "Doubled investment with fast learning: can solar outrun AI demand?",
            &[
                ("solar_investment", 800.0),
                ("storage_investment", 200.0),
                ("cost_learning_rate", 0.15),
            ],
        ),
        scenario(
            "AI Slowdown",
            "AI demand grows at 10% a year instead of 22% as efficiency gains \
             and saturation set in.",
            &[("demand_growth_rate", 0.1)],
        ),
    ]
}

fn graph(parameters: &[ParameterSpec]) -> Result<VariableGraph, ModelError> {
    let mut g = GraphBuilder::new();
    for spec in parameters {
        g.declare_parameter(&spec.name)?;
    }

    g.add_stock("solar_capacity", 2300.0)?
        .add_stock("data_center_demand", 50.0)?
        .register_stock("solar_cost", 1.0, 0.01)?
        .add_stock("battery_storage", 200.0)?
        .add_stock("grid_queue", 1100.0)?;

    g.register_computed(
        "project_submissions",
        &["solar_investment", "solar_cost"],
        |v| v.get("solar_investment") / guard_denominator(v.get("solar_cost")),
    )?
    .register_computed("grid_connections", &["grid_queue", "connection_rate"], |v| {
        v.get("grid_queue") * v.get("connection_rate")
    })?
    .register_computed(
        "panel_retirements",
        &["solar_capacity", "panel_lifetime"],
        |v| v.get("solar_capacity") / v.get("panel_lifetime"),
    )?
    .register_computed(
        "demand_increase",
        &["data_center_demand", "demand_growth_rate"],
        |v| v.get("data_center_demand") * v.get("demand_growth_rate"),
    )?
    .register_computed("cost_reduction", &["solar_cost", "cost_learning_rate"], |v| {
        v.get("solar_cost") * v.get("cost_learning_rate")
    })?
    .register_computed(
        "storage_deployed",
        &["storage_investment", "storage_unit_cost"],
        |v| v.get("storage_investment") / v.get("storage_unit_cost"),
    )?
    .register_computed(
        "storage_retired",
        &["battery_storage", "battery_lifetime"],
        |v| v.get("battery_storage") / v.get("battery_lifetime"),
    )?
    .register_computed(
        "solar_power_output",
        &["solar_capacity", "capacity_factor"],
        |v| v.get("solar_capacity") * v.get("capacity_factor"),
    )?
    .register_computed(
        "dispatchable_storage",
        &["battery_storage", "battery_efficiency", "discharge_hours"],
        |v| v.get("battery_storage") * v.get("battery_efficiency") / v.get("discharge_hours"),
    )?
    .register_computed("queue_pressure", &["grid_queue", "solar_capacity"], |v| {
        v.get("grid_queue") / guard_denominator(v.get("solar_capacity"))
    })?
    .register_computed(
        "total_clean_power",
        &["solar_power_output", "dispatchable_storage"],
        |v| v.get("solar_power_output") + v.get("dispatchable_storage"),
    )?
    .register_computed(
        "clean_to_demand_ratio",
        &["total_clean_power", "data_center_demand"],
        |v| v.get("total_clean_power") / guard_denominator(v.get("data_center_demand")),
    )?;

    g.connect("solar_capacity", &["grid_connections"], &["panel_retirements"])?
        .set_net_rate("data_center_demand", "demand_increase")?
        .connect("solar_cost", &[], &["cost_reduction"])?
        .connect("battery_storage", &["storage_deployed"], &["storage_retired"])?
        .connect("grid_queue", &["project_submissions"], &["grid_connections"])?;

    g.build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn grid_connections_are_both_inflow_and_outflow() {
        let model = definition().unwrap();
        let graph = model.graph();
        let (queue_in, queue_out) = graph.stock_flows("grid_queue").unwrap();
        let (capacity_in, _) = graph.stock_flows("solar_capacity").unwrap();
        assert_eq!(queue_in, vec!["project_submissions"]);
        assert_eq!(queue_out, vec!["grid_connections"]);
        assert_eq!(capacity_in, vec!["grid_connections"]);
    }

    #[test]
    fn first_row_values() {
        let table = definition().unwrap().run_default().unwrap();
        let first = |name: &str| table.value(0, name).unwrap().unwrap();
        assert!((first("solar_power_output") - 575.0).abs() < 1e-9);
        // 200 * 0.9 / 4
        assert!((first("dispatchable_storage") - 45.0).abs() < 1e-9);
        // (575 + 45) / 50
        assert!((first("clean_to_demand_ratio") - 12.4).abs() < 1e-9);
    }

    #[test]
    fn grid_bottleneck_lags_fast_transition() {
        let model = definition().unwrap();
        let spec = model.default_run_spec();
        let capacity = |scenario: &str| {
            let params = model.parameters_for(Some(scenario)).unwrap();
            let table = stockflow_engine::run(model.graph(), &params, &spec).unwrap();
            *table.final_values().get("solar_capacity").unwrap()
        };
        assert!(capacity("US Grid Bottleneck") < capacity("Global Fast Transition"));
    }
}
