//! Core data structs exchanged between the engine, the model catalog, and
//! presentation frontends.
//!
//! Covers result-table rows and columns, slider metadata for parameters,
//! named scenarios, time controls, and per-run summaries.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::VariableKind;
use crate::ids::RunId;

// ---------------------------------------------------------------------------
// Result table shape
// ---------------------------------------------------------------------------

/// A named column of a result table.
///
/// The implicit `time` column is not listed; every [`Row`] carries its time
/// separately so that frontends can treat it as the distinguished first
/// column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Column {
    /// Variable name as declared in the model graph.
    pub name: String,
    /// Whether the column holds a stock, flow, or auxiliary.
    pub kind: VariableKind,
}

/// One evaluated instant of a simulation run.
///
/// `values` is aligned with the owning table's column list. Stock values are
/// the pre-update values at the start of the interval `[time, time + dt)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Row {
    /// Simulation time of this row.
    pub time: f64,
    /// Variable values, one per table column.
    pub values: Vec<f64>,
}

impl Row {
    /// Return the value at a column position, if present.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }
}

// ---------------------------------------------------------------------------
// Model metadata
// ---------------------------------------------------------------------------

/// Slider metadata for one model parameter.
///
/// The range and step mirror the interactive control a frontend renders; the
/// engine itself only consumes `default` (or a caller-supplied value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ParameterSpec {
    /// Parameter name referenced by computed variables.
    pub name: String,
    /// Human-readable label shown next to the control.
    pub label: String,
    /// Unit string, e.g. `billion$/year`.
    pub unit: String,
    /// Value used when the caller does not override the parameter.
    pub default: f64,
    /// Lower slider bound.
    pub min: f64,
    /// Upper slider bound.
    pub max: f64,
    /// Slider increment.
    pub step: f64,
}

impl ParameterSpec {
    /// Whether `value` lies within the slider range (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Label with the unit appended, as shown in legends.
    pub fn display_label(&self) -> String {
        if self.unit.is_empty() {
            self.label.clone()
        } else {
            format!("{} ({})", self.label, self.unit)
        }
    }
}

/// A named set of parameter overrides describing one storyline of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Scenario {
    /// Short scenario name, unique within its model.
    pub name: String,
    /// What the scenario explores.
    pub description: String,
    /// Parameter values replacing the defaults for this scenario.
    pub overrides: BTreeMap<String, f64>,
}

/// Default and permitted values for the run-length controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimeControls {
    /// Default final time.
    pub final_time: f64,
    /// Largest final time the control accepts.
    pub final_time_max: f64,
    /// Default integration step.
    pub time_step: f64,
    /// Smallest integration step the control accepts.
    pub time_step_min: f64,
    /// Largest integration step the control accepts.
    pub time_step_max: f64,
}

impl TimeControls {
    /// Controls with the given defaults and the standard bounds used by
    /// every catalog model (final time up to ten times the default, step in
    /// `[0.1, 5.0]`).
    pub fn new(final_time: f64, time_step: f64) -> Self {
        Self {
            final_time,
            final_time_max: final_time * 10.0,
            time_step,
            time_step_min: 0.1,
            time_step_max: 5.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Run summaries
// ---------------------------------------------------------------------------

/// Compact description of one completed run.
///
/// Used for scenario sweeps, where the full tables are usually too large to
/// display side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RunSummary {
    /// Identifier of the run.
    pub run_id: RunId,
    /// Catalog model identifier.
    pub model: String,
    /// Scenario name, or `None` for the default parameter set.
    pub scenario: Option<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Integration step.
    pub time_step: f64,
    /// Final time.
    pub final_time: f64,
    /// Number of rows produced.
    pub rows: u64,
    /// Stock values at the last row, keyed by stock name.
    pub final_stocks: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ParameterSpec {
        ParameterSpec {
            name: "deployment_lag".to_owned(),
            label: "Deployment Lag".to_owned(),
            unit: "years".to_owned(),
            default: 4.0,
            min: 2.0,
            max: 7.0,
            step: 0.05,
        }
    }

    #[test]
    fn parameter_range_is_inclusive() {
        let spec = spec();
        assert!(spec.contains(2.0));
        assert!(spec.contains(7.0));
        assert!(!spec.contains(7.5));
        assert!(!spec.contains(f64::NAN));
    }

    #[test]
    fn display_label_appends_unit() {
        assert_eq!(spec().display_label(), "Deployment Lag (years)");
        let unitless = ParameterSpec {
            unit: String::new(),
            ..spec()
        };
        assert_eq!(unitless.display_label(), "Deployment Lag");
    }

    #[test]
    fn row_get_is_bounds_checked() {
        let row = Row {
            time: 0.5,
            values: vec![1.0, 2.0],
        };
        assert_eq!(row.get(1), Some(2.0));
        assert_eq!(row.get(2), None);
    }
}
