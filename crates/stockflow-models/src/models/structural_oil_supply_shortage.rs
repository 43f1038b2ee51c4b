//! Structural oil supply shortage under field decline and slow EV uptake.
//!
//! Natural field decline erodes supply capacity faster than price-driven
//! investment can replace it, while base demand keeps growing. Higher
//! prices accelerate EV adoption, but displaced demand stays small.

use stockflow_engine::{GraphBuilder, ModelError, VariableGraph, guard_denominator};
use stockflow_types::{ParameterSpec, Scenario, TimeControls};

use crate::definition::{ModelDefinition, param, scenario};

/// Catalog identifier.
pub const ID: &str = "structural_oil_supply_shortage";

const TITLE: &str = "Structural Oil Supply Shortage";

const DESCRIPTION: &str = "Whether a structural oil supply deficit is \
emerging: field decline outpaces price-driven investment while EV \
displacement of demand lags optimistic forecasts.";

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
        TimeControls::new(100.0, 1.0),
        scenarios(),
    ))
}

fn parameters() -> Vec<ParameterSpec> {
    const MBD: &str = "million barrels per day";
    const PRICE: &str = "dollars per barrel";
    vec![
        param("natural_decline_fraction", "Natural Decline Fraction", "1/year", 0.05, 0.0, 1.0, 0.01),
        param(
            "base_ev_growth_rate",
            "Base EV Growth Rate",
            "million vehicles per year",
            12.0,
            0.0,
            60.0,
            0.6,
        ),
        param("price_sensitivity", "Price Sensitivity", "dimensionless", 0.3, 0.0, 2.0, 0.02),
        param(
            "barrels_per_ev_per_day",
            "Barrels Per EV Per Day",
            "barrels per vehicle per day",
            0.002,
            0.0,
            1.0,
            0.01,
        ),
        param(
            "displacement_efficiency",
            "Displacement Efficiency",
            "dimensionless",
            0.7,
            0.0,
            1.0,
            0.01,
        ),
        param(
            "annual_demand_growth_fraction",
            "Annual Demand Growth Fraction",
            "1/year",
            0.009,
            0.0,
            0.05,
            0.0005,
        ),
        param("reference_oil_price", "Reference Oil Price", PRICE, 75.0, 0.0, 375.0, 3.75),
        param("price_elasticity", "Price Elasticity", "dimensionless", 2.5, 0.0, 10.0, 0.1),
        param(
            "positive_incentive_filter",
            "Positive Incentive Filter",
            "dimensionless",
            0.1,
            0.0,
            1.0,
            0.01,
        ),
        param("breakeven_price", "Breakeven Price", PRICE, 65.0, 0.0, 325.0, 3.25),
        param(
            "investment_response_factor",
            "Investment Response Factor",
            "million barrels per day per year",
            1.5,
            0.0,
            7.5,
            0.075,
        ),
        // Reference projections shown beside the charts; no formula reads them.
        param("vitol_peak_demand_projection", "Vitol Peak Demand Projection", MBD, 112.0, 0.0, 560.0, 5.6),
        param(
            "realistic_peak_demand_estimate",
            "Realistic Peak Demand Estimate",
            MBD,
            120.0,
            0.0,
            600.0,
            6.0,
        ),
    ]
}

fn scenarios() -> Vec<Scenario> {
    vec![
        scenario(
            "Aggressive EV Adoption",
            "Faster EV sales and stronger price response: can displacement \
             prevent the shortage?",
            &[("base_ev_growth_rate", 19.0), ("price_sensitivity", 0.65)],
        ),
        scenario(
            "Higher Investment Response",
            "Producers respond more strongly and at a lower breakeven price.",
            &[
                ("investment_response_factor", 2.75),
                ("breakeven_price", 57.5),
            ],
        ),
        scenario(
            "Slower Demand Growth",
            "Economic slowdown or efficiency gains halve base demand growth.",
            &[("annual_demand_growth_fraction", 0.005)],
        ),
        scenario(
            "Lower Field Decline",
            "Improved recovery techniques or new discoveries slow depletion.",
            &[("natural_decline_fraction", 0.035)],
        ),
    ]
}

fn graph(parameters: &[ParameterSpec]) -> Result<VariableGraph, ModelError> {
    let mut g = GraphBuilder::new();
    for spec in parameters {
        g.declare_parameter(&spec.name)?;
    }

    g.add_stock("oil_supply_capacity", 107.0)?
        .add_stock("cumulative_ev_fleet", 22.0)?
        .add_stock("base_oil_demand_growth", 107.0)?;

    g.register_computed(
        "oil_demand_displaced_by_evs",
        &[
            "cumulative_ev_fleet",
            "barrels_per_ev_per_day",
            "displacement_efficiency",
        ],
        |v| {
            v.get("cumulative_ev_fleet")
                * v.get("barrels_per_ev_per_day")
                * v.get("displacement_efficiency")
        },
    )?
    .register_computed(
        "actual_oil_demand",
        &["base_oil_demand_growth", "oil_demand_displaced_by_evs"],
        |v| v.get("base_oil_demand_growth") - v.get("oil_demand_displaced_by_evs"),
    )?
    .register_computed(
        "supply_demand_gap",
        &["actual_oil_demand", "oil_supply_capacity"],
        |v| v.get("actual_oil_demand") - v.get("oil_supply_capacity"),
    )?
    .register_computed(
        "gap_ratio",
        &["supply_demand_gap", "oil_supply_capacity"],
        |v| v.get("supply_demand_gap") / guard_denominator(v.get("oil_supply_capacity")),
    )?
    .register_computed(
        "oil_price",
        &["reference_oil_price", "gap_ratio", "price_elasticity"],
        |v| {
            let reference = v.get("reference_oil_price");
            reference + v.get("gap_ratio") * v.get("price_elasticity") * reference
        },
    )?
    .register_computed(
        "oil_price_effect_on_evs",
        &["oil_price", "reference_oil_price", "price_sensitivity"],
        |v| {
            let reference = v.get("reference_oil_price");
            (v.get("oil_price") - reference) / guard_denominator(reference)
                * v.get("price_sensitivity")
        },
    )?
    .register_computed("ev_adoption_multiplier", &["oil_price_effect_on_evs"], |v| {
        1.0 + v.get("oil_price_effect_on_evs")
    })?
    .register_computed(
        "price_above_breakeven",
        &["oil_price", "breakeven_price"],
        |v| v.get("oil_price") - v.get("breakeven_price"),
    )?
    .register_computed(
        "normalized_investment_signal",
        &["price_above_breakeven", "breakeven_price"],
        |v| v.get("price_above_breakeven") / guard_denominator(v.get("breakeven_price")),
    )?
    .register_computed(
        "investment_incentive",
        &["normalized_investment_signal", "positive_incentive_filter"],
        |v| (v.get("normalized_investment_signal") + v.get("positive_incentive_filter")) / 2.0,
    )?
    .register_computed(
        "new_capacity_investment",
        &["investment_incentive", "investment_response_factor"],
        |v| v.get("investment_incentive") * v.get("investment_response_factor"),
    )?
    .register_computed(
        "field_decline_rate",
        &["oil_supply_capacity", "natural_decline_fraction"],
        |v| v.get("oil_supply_capacity") * v.get("natural_decline_fraction"),
    )?
    .register_computed(
        "ev_adoption_rate",
        &["base_ev_growth_rate", "ev_adoption_multiplier"],
        |v| v.get("base_ev_growth_rate") * v.get("ev_adoption_multiplier"),
    )?
    .register_computed(
        "demand_increase_rate",
        &["base_oil_demand_growth", "annual_demand_growth_fraction"],
        |v| v.get("base_oil_demand_growth") * v.get("annual_demand_growth_fraction"),
    )?;

    g.connect(
        "oil_supply_capacity",
        &["new_capacity_investment"],
        &["field_decline_rate"],
    )?
    .set_net_rate("cumulative_ev_fleet", "ev_adoption_rate")?
    .set_net_rate("base_oil_demand_growth", "demand_increase_rate")?;

    g.build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn price_effect_follows_price_in_evaluation_order() {
        let model = definition().unwrap();
        let order = model.graph().evaluation_order();
        let position = |name: &str| order.iter().position(|n| *n == name).unwrap();
        assert!(position("oil_price") < position("oil_price_effect_on_evs"));
        assert!(position("oil_price_effect_on_evs") < position("ev_adoption_rate"));
    }

    #[test]
    fn shortage_builds_over_fifteen_years() {
        let model = definition().unwrap();
        let spec = stockflow_engine::RunSpec::new(1.0, 15.0);
        let table = stockflow_engine::run(model.graph(), &model.default_parameters(), &spec).unwrap();
        let capacity = table.column("oil_supply_capacity").unwrap();
        let price = table.column("oil_price").unwrap();
        assert!(capacity.last().unwrap() < capacity.first().unwrap());
        assert!(*price.last().unwrap() > 150.0);
    }

    #[test]
    fn projection_parameters_are_not_required() {
        let model = definition().unwrap();
        let referenced = model.graph().referenced_parameters();
        assert!(!referenced.contains(&"vitol_peak_demand_projection"));
        assert!(!referenced.contains(&"realistic_peak_demand_estimate"));
        assert_eq!(model.parameter_specs().len(), 13);
    }
}
