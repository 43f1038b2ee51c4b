//! AI coding agents displacing traditional SaaS revenue.
//!
//! Bass-style adoption gated by agent capability (task horizon) and by the
//! compute available per user. Agent revenue is reinvested in compute,
//! which in turn accelerates capability growth.

use stockflow_engine::{GraphBuilder, ModelError, VariableGraph, guard_denominator};
use stockflow_types::{ParameterSpec, Scenario, TimeControls};

use crate::definition::{ModelDefinition, param, scenario};

/// Catalog identifier.
pub const ID: &str = "ai_agent_disruption";

const TITLE: &str = "AI Agent Disruption";

const DESCRIPTION: &str = "AI coding agents displace SaaS software through a \
capability flywheel, word-of-mouth adoption, compute constraints, market \
saturation, and a capability gate on task horizon.";

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
        TimeControls::new(20.0, 0.25),
        scenarios(),
    ))
}

fn parameters() -> Vec<ParameterSpec> {
    vec![
        param("base_capability_growth", "Base Capability Growth", "1/yr", 1.2, 0.3, 3.0, 0.027),
        param("innovation_rate", "Innovation Rate", "1/yr", 0.01, 0.001, 0.05, 0.00049),
        param("imitation_rate", "Imitation Rate", "1/yr", 0.25, 0.05, 0.6, 0.0055),
        param("potential_market", "Potential Market", "million", 500.0, 100.0, 1000.0, 9.0),
        param("capability_threshold", "Capability Threshold", "hours", 4.0, 1.0, 16.0, 0.15),
        param("displacement_rate", "Displacement Rate", "1/yr", 0.08, 0.01, 0.25, 0.0024),
        param("revenue_per_user", "Revenue Per User", "$/yr", 200.0, 50.0, 600.0, 5.5),
        param("reinvestment_fraction", "Reinvestment Fraction", "dimensionless", 0.5, 0.1, 0.9, 0.008),
        param("compute_per_user", "Compute Per User", "units/million", 0.5, 0.1, 3.0, 0.029),
        param("depreciation_rate", "Depreciation Rate", "1/yr", 0.15, 0.05, 0.3, 0.0025),
        param("compute_cost_per_unit", "Compute Cost Per Unit", "$B", 0.5, 0.1, 2.0, 0.019),
        param("base_compute_growth", "Base Compute Growth", "units/yr", 10.0, 0.0, 40.0, 0.4),
    ]
}

fn scenarios() -> Vec<Scenario> {
    vec![
        scenario(
            "Compute Constrained",
            "Reduced infrastructure investment: adoption stalls as compute \
             cannot keep pace with demand.",
            &[
                ("base_compute_growth", 3.0),
                ("reinvestment_fraction", 0.3),
                ("compute_per_user", 1.0),
            ],
        ),
        scenario(
            "Rapid Disruption",
            "Breakthrough capability growth, viral adoption, and aggressive \
             displacement compress the timeline by five years or more.",
            &[
                ("base_capability_growth", 2.0),
                ("imitation_rate", 0.4),
                ("displacement_rate", 0.15),
            ],
        ),
        scenario(
            "SaaS Resilience",
            "Sticky incumbents: switching costs and compliance mean agents \
             need much longer task horizons to displace complex workflows.",
            &[
                ("displacement_rate", 0.03),
                ("capability_threshold", 10.0),
                ("innovation_rate", 0.005),
            ],
        ),
    ]
}

fn graph(parameters: &[ParameterSpec]) -> Result<VariableGraph, ModelError> {
    let mut g = GraphBuilder::new();
    for spec in parameters {
        g.declare_parameter(&spec.name)?;
    }

    g.add_stock("task_horizon", 1.0)?
        .add_stock("agent_users", 50.0)?
        .add_stock("saas_revenue", 300.0)?
        .add_stock("gpu_compute", 100.0)?;

    g.register_computed(
        "capability_growth",
        &["task_horizon", "base_capability_growth", "gpu_compute"],
        |v| v.get("task_horizon") * v.get("base_capability_growth") * v.get("gpu_compute") / 100.0,
    )?
    .register_computed(
        "compute_depreciation",
        &["gpu_compute", "depreciation_rate"],
        |v| v.get("gpu_compute") * v.get("depreciation_rate"),
    )?
    .register_computed(
        "adoption_fraction",
        &["agent_users", "potential_market"],
        |v| v.get("agent_users") / v.get("potential_market"),
    )?
    .register_computed(
        "remaining_market",
        &["potential_market", "agent_users"],
        |v| v.get("potential_market") - v.get("agent_users"),
    )?
    .register_computed(
        "ai_revenue",
        &["agent_users", "revenue_per_user"],
        |v| v.get("agent_users") * v.get("revenue_per_user") / 1000.0,
    )?
    .register_computed(
        "capability_readiness",
        &["task_horizon", "capability_threshold"],
        |v| {
            let horizon = v.get("task_horizon");
            horizon / guard_denominator(horizon + v.get("capability_threshold"))
        },
    )?
    .register_computed(
        "compute_demand",
        &["agent_users", "compute_per_user"],
        |v| v.get("agent_users") * v.get("compute_per_user"),
    )?
    .register_computed(
        "compute_investment",
        &[
            "base_compute_growth",
            "ai_revenue",
            "reinvestment_fraction",
            "compute_cost_per_unit",
        ],
        |v| {
            v.get("base_compute_growth")
                + v.get("ai_revenue") * v.get("reinvestment_fraction")
                    / v.get("compute_cost_per_unit")
        },
    )?
    .register_computed(
        "revenue_displacement",
        &[
            "saas_revenue",
            "displacement_rate",
            "adoption_fraction",
            "capability_readiness",
        ],
        |v| {
            v.get("saas_revenue")
                * v.get("displacement_rate")
                * v.get("adoption_fraction")
                * v.get("capability_readiness")
        },
    )?
    .register_computed(
        "compute_availability",
        &["gpu_compute", "compute_demand"],
        |v| {
            let gpu = v.get("gpu_compute");
            gpu / guard_denominator(v.get("compute_demand") + gpu)
        },
    )?
    .register_computed(
        "new_adoptions",
        &[
            "innovation_rate",
            "imitation_rate",
            "adoption_fraction",
            "remaining_market",
            "capability_readiness",
            "compute_availability",
        ],
        |v| {
            (v.get("innovation_rate") + v.get("imitation_rate") * v.get("adoption_fraction"))
                * v.get("remaining_market")
                * v.get("capability_readiness")
                * v.get("compute_availability")
        },
    )?;

    g.set_net_rate("task_horizon", "capability_growth")?
        .set_net_rate("agent_users", "new_adoptions")?
        .connect("saas_revenue", &[], &["revenue_displacement"])?
        .connect("gpu_compute", &["compute_investment"], &["compute_depreciation"])?;

    g.build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn initial_readiness_and_revenue() {
        let table = definition().unwrap().run_default().unwrap();
        let first = |name: &str| table.value(0, name).unwrap().unwrap();
        // 1 / (1 + 4)
        assert!((first("capability_readiness") - 0.2).abs() < 1e-12);
        // 50 * 200 / 1000
        assert!((first("ai_revenue") - 10.0).abs() < 1e-12);
        // 100 / (25 + 100)
        assert!((first("compute_availability") - 0.8).abs() < 1e-12);
    }

    #[test]
    fn saas_revenue_only_declines() {
        let table = definition().unwrap().run_default().unwrap();
        let saas = table.column("saas_revenue").unwrap();
        for pair in saas.windows(2) {
            if let [a, b] = pair {
                assert!(b <= a);
            }
        }
    }

    #[test]
    fn rapid_disruption_displaces_more_revenue() {
        let model = definition().unwrap();
        let spec = model.default_run_spec();
        let baseline = stockflow_engine::run(model.graph(), &model.default_parameters(), &spec).unwrap();
        let rapid = stockflow_engine::run(
            model.graph(),
            &model.parameters_for(Some("Rapid Disruption")).unwrap(),
            &spec,
        )
        .unwrap();
        let last = |t: &stockflow_engine::ResultTable| *t.final_values().get("saas_revenue").unwrap();
        assert!(last(&rapid) < last(&baseline));
    }
}
