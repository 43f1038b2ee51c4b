//! Big Tech AI capex: valuation-driven investment against delayed returns.
//!
//! Capex flows through a deployment pipeline into installed infrastructure.
//! Revenue depends on infrastructure and on the tech workforce that the
//! same infrastructure displaces; the gap between realised and expected
//! ROI feeds back into market capitalisation and hence into capex.

use stockflow_engine::{GraphBuilder, ModelError, VariableGraph, guard_denominator};
use stockflow_types::{ParameterSpec, Scenario, TimeControls};

use crate::definition::{ModelDefinition, param, scenario};

/// Catalog identifier.
pub const ID: &str = "ai_capex_dynamics";

const TITLE: &str = "AI Capex Dynamics";

const DESCRIPTION: &str = "Massive AI capex driven by high valuations meets \
time-delayed returns (3-5 years) while displacing the workforce that drives \
demand for AI services.";

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
        TimeControls::new(20.0, 0.5),
        scenarios(),
    ))
}

fn parameters() -> Vec<ParameterSpec> {
    vec![
        param("base_capex_rate", "Base Capex Rate", "billion$/year", 200.0, 50.0, 500.0, 4.5),
        param("reference_valuation", "Reference Valuation", "trillion$", 15.0, 5.0, 30.0, 0.25),
        param("deployment_lag", "Deployment Lag", "years", 4.0, 2.0, 7.0, 0.05),
        param("infrastructure_life", "Infrastructure Life", "years", 8.0, 5.0, 15.0, 0.1),
        param("revenue_per_capacity", "Revenue Per Capacity", "1/year", 0.15, 0.05, 0.4, 0.0035),
        param("valuation_sensitivity", "Valuation Sensitivity", "1/year", 0.3, 0.05, 0.8, 0.0075),
        param("expected_roi", "Expected ROI", "1/year", 0.2, 0.05, 0.4, 0.0035),
        param(
            "displacement_intensity",
            "Displacement Intensity",
            "million/billion$/year",
            0.001,
            0.0002,
            0.003,
            2.8e-5,
        ),
        param("base_hiring_rate", "Base Hiring Rate", "1/year", 0.05, 0.01, 0.1, 0.0009),
        param("base_tech_workforce", "Base Tech Workforce", "million", 6.0, 4.0, 10.0, 0.06),
    ]
}

fn scenarios() -> Vec<Scenario> {
    vec![
        scenario(
            "Capex Arms Race",
            "Doubled investment, higher expectations, slow market correction: \
             maximum bubble dynamics before the crash.",
            &[
                ("base_capex_rate", 400.0),
                ("expected_roi", 0.3),
                ("valuation_sensitivity", 0.15),
            ],
        ),
        scenario(
            "Rapid Displacement",
            "Aggressive automation with a hiring freeze: employment collapses, \
             revenue follows, valuations correct sharply.",
            &[("displacement_intensity", 0.002), ("base_hiring_rate", 0.03)],
        ),
        scenario(
            "Soft Landing",
            "Higher revenue yield, faster deployment, mild displacement.",
            &[
                ("revenue_per_capacity", 0.25),
                ("deployment_lag", 3.0),
                ("displacement_intensity", 0.0005),
            ],
        ),
    ]
}

fn graph(parameters: &[ParameterSpec]) -> Result<VariableGraph, ModelError> {
    let mut g = GraphBuilder::new();
    for spec in parameters {
        g.declare_parameter(&spec.name)?;
    }

    g.add_stock("deployment_pipeline", 400.0)?
        .add_stock("ai_infrastructure", 500.0)?
        .register_stock("market_cap", 15.0, 1.0)?
        .add_stock("tech_employment", 6.0)?;

    g.register_computed(
        "new_capex",
        &["base_capex_rate", "market_cap", "reference_valuation"],
        |v| v.get("base_capex_rate") * v.get("market_cap") / v.get("reference_valuation"),
    )?
    .register_computed(
        "capacity_deployed",
        &["deployment_pipeline", "deployment_lag"],
        |v| v.get("deployment_pipeline") / v.get("deployment_lag"),
    )?
    .register_computed(
        "capacity_retired",
        &["ai_infrastructure", "infrastructure_life"],
        |v| v.get("ai_infrastructure") / v.get("infrastructure_life"),
    )?
    .register_computed(
        "tech_hiring",
        &["tech_employment", "base_hiring_rate"],
        |v| v.get("tech_employment") * v.get("base_hiring_rate"),
    )?
    .register_computed(
        "job_displacement",
        &["ai_infrastructure", "displacement_intensity"],
        |v| v.get("ai_infrastructure") * v.get("displacement_intensity"),
    )?
    .register_computed(
        "ai_revenue",
        &[
            "ai_infrastructure",
            "revenue_per_capacity",
            "tech_employment",
            "base_tech_workforce",
        ],
        |v| {
            v.get("ai_infrastructure") * v.get("revenue_per_capacity") * v.get("tech_employment")
                / v.get("base_tech_workforce")
        },
    )?
    .register_computed(
        "employment_ratio",
        &["tech_employment", "base_tech_workforce"],
        |v| v.get("tech_employment") / v.get("base_tech_workforce"),
    )?
    .register_computed("actual_roi", &["ai_revenue", "ai_infrastructure"], |v| {
        v.get("ai_revenue") / guard_denominator(v.get("ai_infrastructure"))
    })?
    .register_computed("pe_ratio", &["market_cap", "ai_revenue"], |v| {
        v.get("market_cap") * 1000.0 / guard_denominator(v.get("ai_revenue"))
    })?
    .register_computed("returns_gap", &["actual_roi", "expected_roi"], |v| {
        v.get("actual_roi") - v.get("expected_roi")
    })?
    .register_computed(
        "valuation_adjustment",
        &["market_cap", "valuation_sensitivity", "returns_gap"],
        |v| v.get("market_cap") * v.get("valuation_sensitivity") * v.get("returns_gap"),
    )?;

    g.connect("deployment_pipeline", &["new_capex"], &["capacity_deployed"])?
        .connect("ai_infrastructure", &["capacity_deployed"], &["capacity_retired"])?
        .connect("market_cap", &["valuation_adjustment"], &[])?
        .connect("tech_employment", &["tech_hiring"], &["job_displacement"])?;

    g.build()
}
