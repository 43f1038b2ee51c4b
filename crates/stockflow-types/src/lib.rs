//! Shared type definitions for the Stockflow simulation workspace.
//!
//! This crate is the single source of truth for the data exchanged between
//! the engine, the model catalog, and presentation frontends. Types defined
//! here flow downstream to `TypeScript` via `ts-rs` for chart and table
//! frontends.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for run identifiers
//! - [`enums`] -- [`VariableKind`] (stock, flow, auxiliary)
//! - [`structs`] -- Result rows and columns, parameter slider metadata,
//!   scenarios, time controls, and run summaries

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::VariableKind;
pub use ids::{RunId, SweepId};
pub use structs::{Column, ParameterSpec, Row, RunSummary, Scenario, TimeControls};
