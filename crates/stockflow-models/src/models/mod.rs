//! Built-in model definitions, one module per model.
//!
//! Every module exposes an `ID` constant and a `definition()` constructor.

pub mod ai_agent_disruption;
pub mod ai_capex_dynamics;
pub mod ai_negative_growth;
pub mod silver_supply_dynamics;
pub mod sodium_battery_energy;
pub mod solar_ai_power;
pub mod structural_oil_supply_shortage;
