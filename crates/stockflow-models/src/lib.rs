//! Built-in stock-and-flow economic models.
//!
//! Each model is authored as data on top of `stockflow-engine`: a variable
//! graph, slider metadata for its parameters, default time controls, and
//! the named scenarios from its narrative.
//!
//! # Modules
//!
//! - [`catalog`] -- [`catalog()`], [`load`], and [`load_all`]
//! - [`definition`] -- [`ModelDefinition`] and its serializable [`ModelInfo`]
//! - [`error`] -- [`CatalogError`]
//! - [`models`] -- one module per model

pub mod catalog;
pub mod definition;
pub mod error;
pub mod models;

pub use catalog::{catalog, load, load_all};
pub use definition::{ModelDefinition, ModelInfo, StockFlows, StockInfo};
pub use error::CatalogError;
