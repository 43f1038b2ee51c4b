//! Enumeration types shared across the Stockflow workspace.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The role a variable plays in a stock-and-flow model.
///
/// Charting frontends group result columns by kind: one figure for stocks,
/// one for flows, one for auxiliaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum VariableKind {
    /// An integrated accumulator advanced by the integrator each step.
    Stock,
    /// A computed rate that feeds at least one stock's net rate.
    Flow,
    /// A computed intermediate with no direct stock effect.
    Auxiliary,
}

impl VariableKind {
    /// Return the lowercase label used in tables and logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Flow => "flow",
            Self::Auxiliary => "auxiliary",
        }
    }
}

impl core::fmt::Display for VariableKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&VariableKind::Auxiliary).ok();
        assert_eq!(json.as_deref(), Some("\"auxiliary\""));
    }
}
