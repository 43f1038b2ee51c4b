//! AI-driven economic stagnation through two compounding mechanisms.
//!
//! Keynesian demand collapse: automation shifts income from high-MPC
//! workers to low-MPC owners and shrinks the multiplier. Capital
//! decumulation: worker savings, the main source of investment, fall with
//! the labor share. A sovereign-wealth dividend (`ubi_rate`) routes owner
//! income back into consumption.

use stockflow_engine::{GraphBuilder, ModelError, VariableGraph, guard_at_least, guard_denominator};
use stockflow_types::{ParameterSpec, Scenario, TimeControls};

use crate::definition::{ModelDefinition, param, scenario};

/// Catalog identifier.
pub const ID: &str = "ai_negative_growth";

const TITLE: &str = "AI and Negative Economic Growth";

const DESCRIPTION: &str = "Advanced AI can shrink GDP despite productivity \
gains: income shifts from high-MPC workers to low-MPC owners, collapsing the \
Keynesian multiplier, while falling worker savings decumulate capital.";

/// Lower bound on `1 - MPC`, capping the Keynesian multiplier at 20.
const MIN_MULTIPLIER_DENOMINATOR: f64 = 0.05;

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
        TimeControls::new(60.0, 0.25),
        scenarios(),
    ))
}

fn parameters() -> Vec<ParameterSpec> {
    vec![
        param("mpc_workers", "Worker MPC", "fraction", 0.9, 0.5, 1.0, 0.005),
        param("mpc_owners", "Owner MPC", "fraction", 0.2, 0.0, 0.5, 0.005),
        param("mpc_spread", "MPC Spread", "fraction", 0.7, 0.0, 1.0, 0.01),
        param("base_consumption", "Base Consumption", "index", 38.0, 30.0, 50.0, 0.2),
        param("consumption_gain", "Consumption Gain", "index", 2.0, 0.0, 10.0, 0.1),
        param("ai_growth_rate", "AI Growth Rate", "1/year", 0.4, 0.1, 2.0, 0.019),
        param("min_labor_share", "Min Labor Share", "fraction", 0.05, 0.01, 0.5, 0.0049),
        param("displacement_speed", "Displacement Speed", "1/year", 0.1, 0.01, 0.5, 0.0049),
        param("worker_savings_rate", "Worker Savings Rate", "fraction", 0.07, 0.01, 0.3, 0.0029),
        param(
            "owner_reinvestment_rate",
            "Owner Reinvestment Rate",
            "fraction",
            0.03,
            0.01,
            0.3,
            0.0029,
        ),
        param("depreciation_fraction", "Depreciation Fraction", "1/year", 0.05, 0.01, 0.2, 0.0019),
        param("ai_productivity_gain", "AI Productivity Gain", "dimensionless", 0.8, 0.0, 3.0, 0.03),
        param("ai_productivity_max", "AI Productivity Max", "dimensionless", 3.0, 0.5, 10.0, 0.095),
        param("ubi_rate", "UBI Rate", "fraction", 0.0, 0.0, 0.9, 0.009),
    ]
}

fn scenarios() -> Vec<Scenario> {
    vec![
        scenario(
            "Slow Adoption",
            "AI growth held at its slowest setting: the economy stays close \
             to its pre-AI equilibrium for decades.",
            &[("ai_growth_rate", 0.1)],
        ),
        scenario(
            "Rapid AGI",
            "Fast adoption: the demand collapse arrives in 10-15 years instead \
             of 25.",
            &[("ai_growth_rate", 0.8)],
        ),
        scenario(
            "Partial Automation",
            "AI augments rather than replaces: labor keeps at least 30% of \
             income.",
            &[("min_labor_share", 0.3)],
        ),
        scenario(
            "UBI Policy",
            "A sovereign wealth fund pays half of owner income out as \
             dividends, restoring consumption.",
            &[("ubi_rate", 0.5)],
        ),
        scenario(
            "High-Savings Owners",
            "Owners reinvest 15% of income, keeping the capital stock higher.",
            &[("owner_reinvestment_rate", 0.15)],
        ),
    ]
}

fn graph(parameters: &[ParameterSpec]) -> Result<VariableGraph, ModelError> {
    let mut g = GraphBuilder::new();
    for spec in parameters {
        g.declare_parameter(&spec.name)?;
    }

    g.add_stock("ai_adoption", 0.01)?
        .add_stock("labor_share", 0.6)?
        .add_stock("capital_stock", 100.0)?;

    // Flows.
    g.register_computed("ai_adoption_growth", &["ai_growth_rate", "ai_adoption"], |v| {
        let adoption = v.get("ai_adoption");
        v.get("ai_growth_rate") * adoption * (1.0 - adoption)
    })?
    .register_computed(
        "labor_displacement_flow",
        &["displacement_speed", "ai_adoption", "labor_share", "min_labor_share"],
        |v| {
            v.get("displacement_speed")
                * v.get("ai_adoption")
                * (v.get("labor_share") - v.get("min_labor_share"))
        },
    )?
    .register_computed(
        "capital_depreciation",
        &["depreciation_fraction", "capital_stock"],
        |v| v.get("depreciation_fraction") * v.get("capital_stock"),
    )?;

    // Demand side.
    g.register_computed(
        "effective_mpc",
        &["mpc_workers", "mpc_owners", "labor_share"],
        |v| {
            let share = v.get("labor_share");
            v.get("mpc_workers") * share + v.get("mpc_owners") * (1.0 - share)
        },
    )?
    .register_computed(
        "ubi_boost",
        &["mpc_spread", "ubi_rate", "labor_share"],
        |v| v.get("mpc_spread") * v.get("ubi_rate") * (1.0 - v.get("labor_share")),
    )?
    .register_computed(
        "autonomous_consumption",
        &["base_consumption", "consumption_gain", "ai_adoption"],
        |v| v.get("base_consumption") + v.get("consumption_gain") * v.get("ai_adoption"),
    )?
    .register_computed(
        "effective_savings_rate",
        &["worker_savings_rate", "owner_reinvestment_rate", "labor_share"],
        |v| {
            let share = v.get("labor_share");
            v.get("worker_savings_rate") * share + v.get("owner_reinvestment_rate") * (1.0 - share)
        },
    )?
    .register_computed(
        "supply_side_capacity",
        &["capital_stock", "ai_productivity_max", "ai_adoption"],
        |v| v.get("capital_stock") * (1.0 + v.get("ai_productivity_max") * v.get("ai_adoption")),
    )?
    .register_computed(
        "effective_mpc_with_ubi",
        &["effective_mpc", "ubi_boost"],
        |v| v.get("effective_mpc") + v.get("ubi_boost"),
    )?
    .register_computed("multiplier_denom", &["effective_mpc_with_ubi"], |v| {
        guard_at_least(1.0 - v.get("effective_mpc_with_ubi"), MIN_MULTIPLIER_DENOMINATOR)
    })?
    .register_computed("keynesian_multiplier", &["multiplier_denom"], |v| {
        1.0 / guard_denominator(v.get("multiplier_denom"))
    })?
    .register_computed(
        "gdp",
        &["autonomous_consumption", "keynesian_multiplier"],
        |v| v.get("autonomous_consumption") * v.get("keynesian_multiplier"),
    )?
    .register_computed(
        "gross_investment",
        &["effective_savings_rate", "gdp"],
        |v| v.get("effective_savings_rate") * v.get("gdp"),
    )?
    .register_computed("worker_income", &["gdp", "labor_share"], |v| {
        v.get("gdp") * v.get("labor_share")
    })?
    .register_computed("owner_income", &["gdp", "labor_share"], |v| {
        v.get("gdp") * (1.0 - v.get("labor_share"))
    })?
    .register_computed(
        "real_gdp",
        &["gdp", "ai_productivity_gain", "ai_adoption"],
        |v| v.get("gdp") * (1.0 + v.get("ai_productivity_gain") * v.get("ai_adoption")),
    )?
    .register_computed("ubi_transfer", &["ubi_rate", "owner_income"], |v| {
        v.get("ubi_rate") * v.get("owner_income")
    })?;

    g.set_net_rate("ai_adoption", "ai_adoption_growth")?
        .connect("labor_share", &[], &["labor_displacement_flow"])?
        .connect("capital_stock", &["gross_investment"], &["capital_depreciation"])?;

    g.build()
}
