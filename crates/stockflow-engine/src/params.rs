//! Named scalar parameters supplied to one run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An ordered `name -> value` map of run parameters.
///
/// Immutable from the integrator's point of view: a run copies the values
/// it needs before the first step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, f64>,
}

impl ParameterSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the set with `name` set to `value`.
    #[must_use]
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.set(name, value);
        self
    }

    /// Set `name` to `value`, returning the previous value if any.
    pub fn set(&mut self, name: &str, value: f64) -> Option<f64> {
        self.values.insert(name.to_owned(), value)
    }

    /// Value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Whether `name` has a value.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Copy every entry of `other` into this set, replacing existing values.
    pub fn extend<'a, I>(&mut self, other: I)
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        for (name, value) in other {
            self.set(name, value);
        }
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ParameterSet {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

impl From<BTreeMap<String, f64>> for ParameterSet {
    fn from(values: BTreeMap<String, f64>) -> Self {
        Self { values }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn later_values_replace_earlier() {
        let mut params = ParameterSet::new().with("rate", 1.0).with("lag", 4.0);
        assert_eq!(params.set("rate", 2.0), Some(1.0));
        assert_eq!(params.get("rate"), Some(2.0));
        assert_eq!(params.len(), 2);
        assert!(params.get("missing").is_none());
    }

    #[test]
    fn extend_overrides_and_iterates_sorted() {
        let mut params: ParameterSet = [("b", 1.0), ("a", 2.0)].into_iter().collect();
        let overrides = ParameterSet::new().with("b", 5.0).with("c", 6.0);
        params.extend(overrides.iter());

        let names: Vec<&str> = params.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(params.get("b"), Some(5.0));
    }

    #[test]
    fn serializes_as_plain_map() {
        let params = ParameterSet::new().with("x", 1.5);
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"x":1.5}"#);
        let back: ParameterSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
