//! Sodium-ion storage cost decline and fossil displacement.
//!
//! Falling battery costs raise installations per dollar; the resulting
//! dispatchable storage displaces gas peakers and coal baseload in
//! proportion to its share of peak demand.

use stockflow_engine::{GraphBuilder, ModelError, VariableGraph, guard_denominator};
use stockflow_types::{ParameterSpec, Scenario, TimeControls};

use crate::definition::{ModelDefinition, param, scenario};

/// Catalog identifier.
pub const ID: &str = "sodium_battery_energy";

const TITLE: &str = "Sodium Battery Energy Transition";

const DESCRIPTION: &str = "Sodium-ion battery cost decline drives storage \
deployment, which displaces gas and coal generation and pulls their prices \
down.";

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
        TimeControls::new(50.0, 0.5),
        scenarios(),
    ))
}

fn parameters() -> Vec<ParameterSpec> {
    vec![
        param("investment_budget", "Investment Budget", "billion$/year", 50.0, 5.0, 500.0, 4.95),
        param("battery_lifetime", "Battery Lifetime", "years", 15.0, 5.0, 30.0, 0.25),
        param(
            "round_trip_efficiency",
            "Round Trip Efficiency",
            "dimensionless",
            0.85,
            0.5,
            0.99,
            0.0049,
        ),
        param("discharge_hours", "Discharge Hours", "hours", 4.0, 1.0, 12.0, 0.11),
        param("baseline_growth_rate", "Baseline Growth Rate", "1/year", 0.02, 0.0, 0.1, 0.001),
        param("cost_decline_rate", "Cost Decline Rate", "1/year", 0.08, 0.0, 0.2, 0.002),
        param(
            "capacity_utilization",
            "Capacity Utilization",
            "dimensionless",
            0.7,
            0.3,
            0.95,
            0.0065,
        ),
        param("gas_retirement_rate", "Gas Retirement Rate", "1/year", 0.05, 0.01, 0.15, 0.0014),
        param("coal_retirement_rate", "Coal Retirement Rate", "1/year", 0.03, 0.01, 0.1, 0.0009),
        param("gas_base_price", "Gas Base Price", "$/MMBtu", 4.0, 1.0, 15.0, 0.14),
        param("coal_base_price", "Coal Base Price", "$/ton", 60.0, 20.0, 200.0, 1.8),
    ]
}

fn scenarios() -> Vec<Scenario> {
    vec![
        scenario(
            "Conservative Scenario",
            "Lower investment, slower cost decline, modest demand growth: gas \
             and coal decline slowly.",
            &[
                ("investment_budget", 20.0),
                ("cost_decline_rate", 0.04),
                ("baseline_growth_rate", 0.01),
            ],
        ),
        scenario(
            "Aggressive Deployment",
            "Massive investment, fast learning, long-duration storage: rapid \
             fossil displacement.",
            &[
                ("investment_budget", 150.0),
                ("cost_decline_rate", 0.12),
                ("discharge_hours", 8.0),
            ],
        ),
        scenario(
            "Coal Phase-Out Policy",
            "Policy-driven coal retirement with a moderate gas transition.",
            &[
                ("coal_retirement_rate", 0.08),
                ("gas_retirement_rate", 0.03),
                ("investment_budget", 80.0),
            ],
        ),
    ]
}

fn graph(parameters: &[ParameterSpec]) -> Result<VariableGraph, ModelError> {
    let mut g = GraphBuilder::new();
    for spec in parameters {
        g.declare_parameter(&spec.name)?;
    }

    g.add_stock("installed_capacity", 100.0)?
        .register_stock("unit_cost", 0.08, 0.001)?
        .add_stock("total_demand", 5000.0)?
        .add_stock("gas_generation", 1500.0)?
        .add_stock("coal_generation", 2000.0)?;

    g.register_computed(
        "new_installations",
        &["investment_budget", "unit_cost"],
        |v| v.get("investment_budget") / guard_denominator(v.get("unit_cost")),
    )?
    .register_computed(
        "retirements",
        &["installed_capacity", "battery_lifetime"],
        |v| v.get("installed_capacity") / v.get("battery_lifetime"),
    )?
    .register_computed(
        "cost_reduction",
        &["unit_cost", "cost_decline_rate"],
        |v| v.get("unit_cost") * v.get("cost_decline_rate"),
    )?
    .register_computed(
        "demand_growth",
        &["total_demand", "baseline_growth_rate"],
        |v| v.get("total_demand") * v.get("baseline_growth_rate"),
    )?
    .register_computed(
        "dispatchable_power",
        &[
            "installed_capacity",
            "round_trip_efficiency",
            "capacity_utilization",
            "discharge_hours",
        ],
        |v| {
            v.get("installed_capacity")
                * v.get("round_trip_efficiency")
                * v.get("capacity_utilization")
                / v.get("discharge_hours")
        },
    )?
    .register_computed("cost_per_kwh", &["unit_cost"], |v| v.get("unit_cost") * 1000.0)?
    .register_computed("gas_price", &["gas_base_price", "gas_generation"], |v| {
        v.get("gas_base_price") * v.get("gas_generation") / 1500.0
    })?
    .register_computed("coal_price", &["coal_base_price", "coal_generation"], |v| {
        v.get("coal_base_price") * v.get("coal_generation") / 2000.0
    })?
    .register_computed(
        "net_peak_demand",
        &["total_demand", "dispatchable_power"],
        |v| v.get("total_demand") - v.get("dispatchable_power"),
    )?
    .register_computed(
        "storage_penetration",
        &["dispatchable_power", "total_demand"],
        |v| v.get("dispatchable_power") / guard_denominator(v.get("total_demand")),
    )?
    .register_computed(
        "gas_displaced",
        &["gas_generation", "storage_penetration", "gas_retirement_rate"],
        |v| {
            v.get("gas_generation") * v.get("storage_penetration") * v.get("gas_retirement_rate")
        },
    )?
    .register_computed(
        "coal_displaced",
        &["coal_generation", "storage_penetration", "coal_retirement_rate"],
        |v| {
            v.get("coal_generation")
                * v.get("storage_penetration")
                * v.get("coal_retirement_rate")
        },
    )?;

    g.connect("installed_capacity", &["new_installations"], &["retirements"])?
        .connect("unit_cost", &[], &["cost_reduction"])?
        .set_net_rate("total_demand", "demand_growth")?
        .connect("gas_generation", &[], &["gas_displaced"])?
        .connect("coal_generation", &[], &["coal_displaced"])?;

    g.build()
}
