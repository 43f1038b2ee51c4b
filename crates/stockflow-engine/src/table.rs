//! The result table produced by one run.
//!
//! Rows are time-ascending and immutable once the table is returned. The
//! implicit `time` column is stored on each [`Row`]; every other column is
//! described by a [`Column`] and indexed positionally in `Row::values`.

use std::collections::BTreeMap;

use serde::Serialize;
use stockflow_types::{Column, Row, VariableKind};

use crate::error::ModelError;
use crate::graph::TIME_COLUMN;

/// Time series of every stock, flow, and auxiliary of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

/// A subset of columns as parallel sequences, the shape charts consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    /// Row times.
    pub time: Vec<f64>,
    /// Selected columns in request order.
    pub series: Vec<Series>,
}

/// One column of a [`Selection`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    /// Column name.
    pub name: String,
    /// Column kind.
    pub kind: VariableKind,
    /// Values aligned with [`Selection::time`].
    pub values: Vec<f64>,
}

impl ResultTable {
    pub(crate) const fn new(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// The rows, time-ascending.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Column descriptions, `time` excluded.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows. A successful run always has at least
    /// one.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The last row.
    pub fn last(&self) -> Option<&Row> {
        self.rows.last()
    }

    /// Row times.
    pub fn times(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.time).collect()
    }

    /// Position of a named column in `Row::values`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownColumn`] if the graph had no such
    /// variable.
    pub fn column_index(&self, name: &str) -> Result<usize, ModelError> {
        self.columns
            .iter()
            .position(|column| column.name == name)
            .ok_or_else(|| ModelError::UnknownColumn {
                name: name.to_owned(),
            })
    }

    /// One variable across all rows. `time` returns the row times.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownColumn`] if the graph had no such
    /// variable.
    pub fn column(&self, name: &str) -> Result<Vec<f64>, ModelError> {
        if name == TIME_COLUMN {
            return Ok(self.times());
        }
        let index = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(index).unwrap_or(f64::NAN))
            .collect())
    }

    /// Value of `name` at row `row`; `Ok(None)` if the row does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownColumn`] for an unknown name.
    pub fn value(&self, row: usize, name: &str) -> Result<Option<f64>, ModelError> {
        if name == TIME_COLUMN {
            return Ok(self.rows.get(row).map(|r| r.time));
        }
        let index = self.column_index(name)?;
        Ok(self.rows.get(row).and_then(|r| r.get(index)))
    }

    /// Every column's value at the last row, keyed by name.
    pub fn final_values(&self) -> BTreeMap<String, f64> {
        self.final_values_where(|_| true)
    }

    /// Stock values at the last row, keyed by name.
    pub fn final_stocks(&self) -> BTreeMap<String, f64> {
        self.final_values_where(|kind| kind == VariableKind::Stock)
    }

    /// `time` plus the requested columns as parallel sequences. An empty
    /// request selects every column. `time` is always present, so naming it
    /// adds nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownColumn`] for the first unknown name.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Selection, ModelError> {
        let indices = if names.is_empty() {
            (0..self.columns.len()).collect()
        } else {
            names
                .iter()
                .map(AsRef::<str>::as_ref)
                .filter(|name| *name != TIME_COLUMN)
                .map(|name| self.column_index(name))
                .collect::<Result<Vec<_>, _>>()?
        };

        let series = indices
            .into_iter()
            .filter_map(|index| {
                let column = self.columns.get(index)?;
                Some(Series {
                    name: column.name.clone(),
                    kind: column.kind,
                    values: self
                        .rows
                        .iter()
                        .map(|row| row.get(index).unwrap_or(f64::NAN))
                        .collect(),
                })
            })
            .collect();

        Ok(Selection {
            time: self.times(),
            series,
        })
    }

    fn final_values_where(&self, keep: impl Fn(VariableKind) -> bool) -> BTreeMap<String, f64> {
        let Some(last) = self.rows.last() else {
            return BTreeMap::new();
        };
        self.columns
            .iter()
            .zip(&last.values)
            .filter(|(column, _)| keep(column.kind))
            .map(|(column, value)| (column.name.clone(), *value))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn table() -> ResultTable {
        ResultTable::new(
            vec![
                Column {
                    name: "x".to_owned(),
                    kind: VariableKind::Stock,
                },
                Column {
                    name: "inflow".to_owned(),
                    kind: VariableKind::Flow,
                },
            ],
            vec![
                Row {
                    time: 0.0,
                    values: vec![10.0, 2.0],
                },
                Row {
                    time: 1.0,
                    values: vec![12.0, 2.0],
                },
            ],
        )
    }

    #[test]
    fn column_lookup() {
        let table = table();
        assert_eq!(table.column("x").unwrap(), vec![10.0, 12.0]);
        assert_eq!(table.column(TIME_COLUMN).unwrap(), vec![0.0, 1.0]);
        assert_eq!(
            table.column("nope"),
            Err(ModelError::UnknownColumn {
                name: "nope".to_owned()
            })
        );
    }

    #[test]
    fn value_and_final_values() {
        let table = table();
        assert_eq!(table.value(1, "x").unwrap(), Some(12.0));
        assert_eq!(table.value(7, "x").unwrap(), None);
        assert_eq!(table.final_values().len(), 2);
        let stocks = table.final_stocks();
        assert_eq!(stocks.len(), 1);
        assert_eq!(stocks.get("x"), Some(&12.0));
    }

    #[test]
    fn select_keeps_request_order() {
        let table = table();
        let selection = table.select(&["inflow", "x"]).unwrap();
        assert_eq!(selection.time, vec![0.0, 1.0]);
        let names: Vec<&str> = selection.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["inflow", "x"]);

        let all = table.select::<&str>(&[]).unwrap();
        assert_eq!(all.series.len(), 2);
        assert!(table.select(&["missing"]).is_err());
    }

    #[test]
    fn select_accepts_the_time_column() {
        let table = table();
        let selection = table.select(&[TIME_COLUMN, "x"]).unwrap();
        assert_eq!(selection.time, vec![0.0, 1.0]);
        let names: Vec<&str> = selection.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["x"]);

        let only_time = table.select(&[TIME_COLUMN]).unwrap();
        assert_eq!(only_time.time.len(), 2);
        assert!(only_time.series.is_empty());
    }
}
