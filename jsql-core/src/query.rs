use crate::{Result, Value};
use std::sync::Arc;

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(names: RowNames, values: Row) -> Self {
        Self {
            labels: names,
            values,
        }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    /// The row as a JSON object keyed by column label.
    ///
    /// Keys come out sorted, which keeps the output stable whatever order the
    /// columns were selected in. A repeated label keeps its last value.
    pub fn to_json(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        self.labels
            .iter()
            .zip(self.values.iter())
            .map(|(label, value)| Ok((label.clone(), value.to_json()?)))
            .collect()
    }
}
