//! Tabular query results
//!
//! A [`RowSet`] is the immutable flat result of one analytical query: named
//! columns with stable types, rows of [`Value`] cells. Everything downstream
//! (classification, pivoting, series building) derives fresh data from it;
//! nothing mutates it after creation.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Flat result set of a single query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> RowSet {
        RowSet { columns, rows }
    }

    /// Index of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell lookup by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
