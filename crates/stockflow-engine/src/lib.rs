//! Generic stock-and-flow simulation engine.
//!
//! A model is a [`VariableGraph`]: stocks (integrated accumulators with
//! initial values and floors), computed variables (pure functions of
//! parameters, stocks, and other computed variables), and the net rate of
//! each stock. [`run`] integrates the graph with fixed-step explicit Euler
//! and returns a [`ResultTable`] with one row per evaluated step.
//!
//! # Modules
//!
//! - [`graph`] -- [`GraphBuilder`] and the frozen [`VariableGraph`]
//! - [`params`] -- [`ParameterSet`] supplied per run
//! - [`integrator`] -- [`RunSpec`] and the Euler loop
//! - [`table`] -- [`ResultTable`] and column selections
//! - [`guard`] -- denominator guard used by model formulas
//! - [`error`] -- [`ModelError`]
//!
//! # Example
//!
//! ```
//! use stockflow_engine::{GraphBuilder, ParameterSet, RunSpec, run};
//!
//! # fn main() -> Result<(), stockflow_engine::ModelError> {
//! let mut builder = GraphBuilder::new();
//! builder.declare_parameter("growth")?;
//! builder.add_stock("x", 10.0)?;
//! builder.register_computed("inflow", &["growth"], |inputs| inputs.get("growth"))?;
//! builder.connect("x", &["inflow"], &[])?;
//! let graph = builder.build()?;
//!
//! let table = run(&graph, &ParameterSet::new().with("growth", 2.0), &RunSpec::new(1.0, 5.0))?;
//! assert_eq!(table.len(), 6);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod graph;
pub mod guard;
pub mod integrator;
pub mod params;
pub mod table;

pub use error::ModelError;
pub use graph::{ComputeFn, GraphBuilder, Inputs, StockDef, TIME_COLUMN, VariableGraph};
pub use guard::{DENOMINATOR_EPSILON, guard_at_least, guard_denominator};
pub use integrator::{MAX_ROWS, RunSpec, run};
pub use params::ParameterSet;
pub use table::{ResultTable, Selection, Series};
