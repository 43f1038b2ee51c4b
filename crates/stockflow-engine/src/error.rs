//! Error types for the `stockflow-engine` crate.
//!
//! Definition-time failures (graph construction) and run-time failures
//! (request validation, column lookup) share one enum, [`ModelError`]. A run
//! either fails before its first step or completes; there is no partial
//! result.

/// Errors raised while defining a model graph or running it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// The name is already used by a stock, computed variable, or parameter.
    #[error("duplicate variable name: {name}")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// The name is empty or collides with the implicit `time` column.
    #[error("reserved or empty variable name: {name:?}")]
    ReservedName {
        /// The rejected name.
        name: String,
    },

    /// A computed variable reads a name that has not been declared.
    #[error("variable {variable} depends on undeclared name {dependency}")]
    UnknownDependency {
        /// The variable being registered.
        variable: String,
        /// The undeclared input.
        dependency: String,
    },

    /// Registering the variable would close a cycle among computed variables.
    #[error("cyclic dependency: {}", .path.join(" -> "))]
    CyclicDependency {
        /// The cycle, starting and ending at the same variable.
        path: Vec<String>,
    },

    /// A computed variable was forward-declared but never defined.
    #[error("computed variable {name} was declared but never defined")]
    UndefinedVariable {
        /// The undefined variable.
        name: String,
    },

    /// The name does not refer to a stock.
    #[error("unknown stock: {name}")]
    UnknownStock {
        /// The name that was expected to be a stock.
        name: String,
    },

    /// A stock's net rate references a stock or parameter instead of a
    /// computed variable.
    #[error("stock {stock} cannot use {name} as a flow: not a computed variable")]
    NotComputed {
        /// The stock being connected.
        stock: String,
        /// The offending name.
        name: String,
    },

    /// The stock already has a net rate.
    #[error("net rate for stock {stock} is already defined")]
    RateAlreadyDefined {
        /// The stock connected twice.
        stock: String,
    },

    /// A stock's initial value lies below its floor.
    #[error("initial value {initial} of stock {stock} is below its floor {floor}")]
    InitialBelowFloor {
        /// The stock.
        stock: String,
        /// The requested initial value.
        initial: f64,
        /// The stock's floor.
        floor: f64,
    },

    /// A stock definition, initial override, or referenced parameter value
    /// is NaN or an infinity.
    #[error("non-finite value {value} for {name}")]
    NonFinite {
        /// The variable the value belongs to.
        name: String,
        /// The offending value.
        value: f64,
    },

    /// A parameter read by some computed variable has no value for this run.
    #[error("missing value for parameter {name}")]
    MissingParameter {
        /// The missing parameter.
        name: String,
    },

    /// The integration step is not a positive finite number.
    #[error("time step must be positive and finite, got {time_step}")]
    InvalidTimeStep {
        /// The rejected step.
        time_step: f64,
    },

    /// The final time is negative or not finite.
    #[error("final time must be non-negative and finite, got {final_time}")]
    InvalidFinalTime {
        /// The rejected final time.
        final_time: f64,
    },

    /// The step and horizon would produce more rows than a run may hold.
    #[error("{rows} rows requested (final time / time step + 1), limit is {limit}")]
    TooManySteps {
        /// Rows the step and horizon would produce.
        rows: f64,
        /// The largest row count a run accepts.
        limit: u32,
    },

    /// The column was never a stock, flow, or auxiliary of the graph.
    #[error("unknown column: {name}")]
    UnknownColumn {
        /// The requested column.
        name: String,
    },
}
