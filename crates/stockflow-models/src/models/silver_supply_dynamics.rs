//! Silver supply squeezes and retail versus institutional positioning.
//!
//! Warehouse inventory is drained by industrial and retail demand and
//! replenished by western mining and Chinese exports. Scarcity lifts the
//! price; price momentum, amplified by social media and damped by
//! institutional desks, drives retail sentiment and retail buying.

use stockflow_engine::{GraphBuilder, ModelError, VariableGraph, guard_denominator};
use stockflow_types::{ParameterSpec, Scenario, TimeControls};

use crate::definition::{ModelDefinition, param, scenario};

/// Catalog identifier.
pub const ID: &str = "silver_supply_dynamics";

const TITLE: &str = "Silver Supply Dynamics";

const DESCRIPTION: &str = "Silver market supply squeezes and the information \
asymmetry between commodity desks and retail traders.";

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
        TimeControls::new(24.0, 0.25),
        scenarios(),
    ))
}

fn parameters() -> Vec<ParameterSpec> {
    vec![
        param("western_supply_base", "Western Supply Base", "Moz/yr", 640.0, 500.0, 800.0, 3.0),
        param("base_industrial_demand", "Base Industrial Demand", "Moz/yr", 500.0, 400.0, 650.0, 2.5),
        param("solar_demand_growth", "Solar Demand Growth", "Moz/yr", 200.0, 100.0, 400.0, 3.0),
        param("retail_buy_intensity", "Retail Buy Intensity", "1/yr", 0.15, 0.05, 0.4, 0.0035),
        param("china_export_fraction", "China Export Fraction", "dimensionless", 0.8, 0.2, 1.0, 0.008),
        param("restriction_rate", "Restriction Rate", "1/yr", 0.03, 0.0, 0.15, 0.0015),
        param("geopolitical_pressure", "Geopolitical Pressure", "dimensionless", 1.5, 0.5, 3.0, 0.025),
        param("price_adjustment_speed", "Price Adjustment Speed", "1/yr", 0.5, 0.1, 1.5, 0.014),
        param(
            "institutional_dampening",
            "Institutional Dampening",
            "dimensionless",
            1.0,
            0.0,
            2.5,
            0.025,
        ),
        param("social_media_amplifier", "Social Media Amplifier", "dimensionless", 3.0, 1.0, 8.0, 0.07),
        param("sentiment_decay_rate", "Sentiment Decay Rate", "1/yr", 0.4, 0.1, 1.0, 0.009),
        param("reference_inventory", "Reference Inventory", "Moz", 300.0, 100.0, 500.0, 4.0),
    ]
}

fn scenarios() -> Vec<Scenario> {
    vec![
        scenario(
            "Chinese Export Ban",
            "Acute Chinese restriction on the rare-earth playbook: a rapid \
             supply deficit forces a price revaluation.",
            &[
                ("geopolitical_pressure", 3.0),
                ("restriction_rate", 0.12),
                ("china_export_fraction", 0.3),
            ],
        ),
        scenario(
            "Silver Squeeze 2.0",
            "Viral social media campaign against reduced institutional \
             resistance.",
            &[
                ("social_media_amplifier", 7.0),
                ("retail_buy_intensity", 0.35),
                ("sentiment_decay_rate", 0.2),
                ("institutional_dampening", 0.5),
            ],
        ),
        scenario(
            "No Institutional Resistance",
            "Full social media amplification without desk counter-trading \
             reveals the price signal institutions normally damp.",
            &[("institutional_dampening", 0.0), ("geopolitical_pressure", 2.0)],
        ),
    ]
}

fn graph(parameters: &[ParameterSpec]) -> Result<VariableGraph, ModelError> {
    let mut g = GraphBuilder::new();
    for spec in parameters {
        g.declare_parameter(&spec.name)?;
    }

    g.register_stock("warehouse_inventory", 300.0, 10.0)?
        .add_stock("retail_holdings", 200.0)?
        .register_stock("silver_price", 30.0, 5.0)?
        .add_stock("chinese_export_capacity", 80.0)?
        .register_stock("retail_sentiment", 0.3, 0.01)?;

    g.register_computed("western_supply", &["western_supply_base"], |v| {
        v.get("western_supply_base")
    })?
    .register_computed(
        "industrial_demand",
        &["base_industrial_demand", "solar_demand_growth"],
        |v| v.get("base_industrial_demand") + v.get("solar_demand_growth"),
    )?
    .register_computed(
        "net_retail_flow",
        &["retail_buy_intensity", "retail_sentiment", "warehouse_inventory"],
        |v| {
            v.get("retail_buy_intensity") * v.get("retail_sentiment") * v.get("warehouse_inventory")
        },
    )?
    .register_computed(
        "chinese_export_flow",
        &["chinese_export_capacity", "china_export_fraction"],
        |v| v.get("chinese_export_capacity") * v.get("china_export_fraction"),
    )?
    .register_computed(
        "export_restriction",
        &["chinese_export_capacity", "restriction_rate", "geopolitical_pressure"],
        |v| {
            v.get("chinese_export_capacity")
                * v.get("restriction_rate")
                * v.get("geopolitical_pressure")
        },
    )?
    .register_computed(
        "inventory_ratio",
        &["warehouse_inventory", "reference_inventory"],
        |v| v.get("warehouse_inventory") / v.get("reference_inventory"),
    )?
    .register_computed(
        "effective_amplification",
        &["social_media_amplifier", "institutional_dampening"],
        |v| v.get("social_media_amplifier") - v.get("institutional_dampening"),
    )?
    .register_computed(
        "sentiment_decay",
        &["retail_sentiment", "sentiment_decay_rate"],
        |v| v.get("retail_sentiment") * v.get("sentiment_decay_rate"),
    )?
    .register_computed("demand_supply_pressure", &["inventory_ratio"], |v| {
        1.0 - v.get("inventory_ratio")
    })?
    .register_computed(
        "price_change",
        &["silver_price", "price_adjustment_speed", "demand_supply_pressure"],
        |v| {
            v.get("silver_price")
                * v.get("price_adjustment_speed")
                * v.get("demand_supply_pressure")
        },
    )?
    .register_computed("price_momentum", &["price_change", "silver_price"], |v| {
        v.get("price_change") / guard_denominator(v.get("silver_price"))
    })?
    .register_computed(
        "sentiment_change",
        &["effective_amplification", "price_momentum", "sentiment_decay"],
        |v| v.get("effective_amplification") * v.get("price_momentum") - v.get("sentiment_decay"),
    )?
    .register_computed(
        "institutional_edge",
        &["demand_supply_pressure", "price_momentum"],
        |v| v.get("demand_supply_pressure") - v.get("price_momentum"),
    )?;

    g.connect(
        "warehouse_inventory",
        &["western_supply", "chinese_export_flow"],
        &["industrial_demand", "net_retail_flow"],
    )?
    .set_net_rate("retail_holdings", "net_retail_flow")?
    .set_net_rate("silver_price", "price_change")?
    .connect("chinese_export_capacity", &[], &["export_restriction"])?
    .set_net_rate("retail_sentiment", "sentiment_change")?;

    g.build()
}
