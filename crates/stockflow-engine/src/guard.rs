//! Modeling helpers shared by model formulas.
//!
//! Division by a near-zero stock is a modeling concern, not an engine
//! error. Formulas that divide by a stock or computed value route the
//! denominator through [`guard_denominator`].

/// Smallest denominator a guarded division will use.
pub const DENOMINATOR_EPSILON: f64 = 1e-6;

/// Return `value`, raised to [`DENOMINATOR_EPSILON`] if smaller.
///
/// `NaN` passes through unchanged so that an upstream defect stays visible
/// in the result table.
pub const fn guard_denominator(value: f64) -> f64 {
    guard_at_least(value, DENOMINATOR_EPSILON)
}

/// Return `value`, raised to `minimum` if smaller. `NaN` passes through.
pub const fn guard_at_least(value: f64, minimum: f64) -> f64 {
    if value < minimum { minimum } else { value }
}
