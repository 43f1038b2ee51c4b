//! Error types for the `stockflow-models` crate.

use stockflow_engine::ModelError;

/// Errors raised while loading a catalog model or resolving its scenarios.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    /// No model with this identifier exists in the catalog.
    #[error("unknown model: {id}")]
    UnknownModel {
        /// The requested identifier.
        id: String,
    },

    /// The model has no scenario with this name.
    #[error("model {model} has no scenario named {name:?}")]
    UnknownScenario {
        /// The model identifier.
        model: String,
        /// The requested scenario name.
        name: String,
    },

    /// The model's graph failed to build.
    #[error("model definition error: {0}")]
    Model(#[from] ModelError),
}
