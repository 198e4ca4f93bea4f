//! Pivoting - reshape flat rows into dense matrices
//!
//! Groups a flat row set by a (row-key, column-key) pair, aggregates the
//! group values, and emits a dense matrix over the union of observed keys.
//! Min over status ranks reproduces worst-status-wins: one bad product sinks
//! the store's cell.
//!
//! Global invariants enforced:
//! - Matrices are strictly derived (never stored, always computed)
//! - Deterministic axis ordering (natural key order; periods chronological)
//! - No modification of the input row set

use crate::row::RowSet;
use crate::status::StockStatus;
use crate::value::Key;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Aggregation policy for cells with multiple contributing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregator {
    Sum,
    Mean,
    /// Minimum value; over status ranks this selects the worst status.
    Min,
}

/// Pivoting error, surfaced to the caller rather than silently coerced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PivotError {
    #[error("unknown column: {column}")]
    UnknownColumn { column: String },

    #[error("type mismatch in column {column} at row {row}: {value:?} is not numeric")]
    TypeMismatch {
        column: String,
        row: usize,
        value: String,
    },
}

/// Dense two-dimensional aggregate over categorical keys.
///
/// Cells with no contributing rows hold the configured fill value;
/// [`Matrix::contributors`] distinguishes them from real zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub row_keys: Vec<Key>,
    pub col_keys: Vec<Key>,
    cells: Vec<MatrixCell>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct MatrixCell {
    value: f64,
    contributors: usize,
}

impl Matrix {
    /// Empty matrix (empty input row set pivots to this, not to an error).
    pub fn empty() -> Matrix {
        Matrix {
            row_keys: Vec::new(),
            col_keys: Vec::new(),
            cells: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_keys.is_empty() || self.col_keys.is_empty()
    }

    /// Cell value at (row index, column index).
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.row_keys.len() && col < self.col_keys.len() {
            Some(self.cells[row * self.col_keys.len() + col].value)
        } else {
            None
        }
    }

    /// Number of input rows that contributed to a cell (0 means fill).
    pub fn contributors(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.row_keys.len() && col < self.col_keys.len() {
            Some(self.cells[row * self.col_keys.len() + col].contributors)
        } else {
            None
        }
    }

    /// Cell value looked up by key pair.
    pub fn get_by_key(&self, row_key: &Key, col_key: &Key) -> Option<f64> {
        let row = self.row_keys.iter().position(|k| k == row_key)?;
        let col = self.col_keys.iter().position(|k| k == col_key)?;
        self.get(row, col)
    }

    /// Un-pivot: flatten back to (row-key, col-key, value) triples.
    ///
    /// Emits only cells with at least one contributor, so pivoting and
    /// flattening round-trips the aggregated values exactly.
    pub fn flatten(&self) -> Vec<(Key, Key, f64)> {
        let mut triples = Vec::new();
        for (r, row_key) in self.row_keys.iter().enumerate() {
            for (c, col_key) in self.col_keys.iter().enumerate() {
                let cell = self.cells[r * self.col_keys.len() + c];
                if cell.contributors > 0 {
                    triples.push((row_key.clone(), col_key.clone(), cell.value));
                }
            }
        }
        triples
    }
}

/// Categorical matrix of stock-status ranks.
///
/// Wraps a min-rank numeric matrix; cells with no contributors are absent
/// (`None`), not filled.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMatrix {
    pub matrix: Matrix,
}

impl CategoryMatrix {
    /// Wrap a matrix whose cell values are status ranks.
    pub fn from_ranks(matrix: Matrix) -> CategoryMatrix {
        CategoryMatrix { matrix }
    }

    /// Worst status observed for the cell, or `None` when no row
    /// contributed to that key pair.
    pub fn status(&self, row: usize, col: usize) -> Option<StockStatus> {
        if self.matrix.contributors(row, col)? == 0 {
            return None;
        }
        let rank = self.matrix.get(row, col)?;
        StockStatus::from_rank(rank as u8)
    }
}

/// Pivot a flat row set into a dense matrix.
///
/// Rows are grouped by the named key columns, the named value column is
/// aggregated per group, and absent (row-key, col-key) combinations take
/// `fill`. Axes cover the union of observed keys in ascending natural
/// order; `YYYY-MM` labels and dates order chronologically via
/// [`crate::value::Value::as_key`]. Rows with a NULL key are skipped.
///
/// An empty input yields an empty matrix. A non-numeric value under any
/// aggregator is a [`PivotError::TypeMismatch`].
pub fn pivot(
    rows: &RowSet,
    row_key: &str,
    col_key: &str,
    value_column: &str,
    aggregator: Aggregator,
    fill: f64,
) -> Result<Matrix, PivotError> {
    let unknown = |column: &str| PivotError::UnknownColumn {
        column: column.to_string(),
    };
    let row_idx = rows.column_index(row_key).ok_or_else(|| unknown(row_key))?;
    let col_idx = rows.column_index(col_key).ok_or_else(|| unknown(col_key))?;
    let val_idx = rows
        .column_index(value_column)
        .ok_or_else(|| unknown(value_column))?;

    if rows.is_empty() {
        return Ok(Matrix::empty());
    }

    // Group values by key pair: (sum, min, count)
    let mut groups: HashMap<(Key, Key), (f64, f64, usize)> = HashMap::new();
    let mut row_keys: BTreeSet<Key> = BTreeSet::new();
    let mut col_keys: BTreeSet<Key> = BTreeSet::new();

    for (i, record) in rows.rows.iter().enumerate() {
        let (rk, ck) = match (record[row_idx].as_key(), record[col_idx].as_key()) {
            (Some(rk), Some(ck)) => (rk, ck),
            _ => continue, // NULL key: no bucket to land in
        };
        let raw = &record[val_idx];
        let value = raw.as_f64().ok_or_else(|| PivotError::TypeMismatch {
            column: value_column.to_string(),
            row: i,
            value: raw.to_string(),
        })?;

        row_keys.insert(rk.clone());
        col_keys.insert(ck.clone());
        let entry = groups.entry((rk, ck)).or_insert((0.0, f64::INFINITY, 0));
        entry.0 += value;
        entry.1 = entry.1.min(value);
        entry.2 += 1;
    }

    let row_keys: Vec<Key> = row_keys.into_iter().collect();
    let col_keys: Vec<Key> = col_keys.into_iter().collect();

    let mut cells = Vec::with_capacity(row_keys.len() * col_keys.len());
    for rk in &row_keys {
        for ck in &col_keys {
            let cell = match groups.get(&(rk.clone(), ck.clone())) {
                Some(&(sum, min, count)) => {
                    let value = match aggregator {
                        Aggregator::Sum => sum,
                        Aggregator::Mean => sum / count as f64,
                        Aggregator::Min => min,
                    };
                    MatrixCell {
                        value,
                        contributors: count,
                    }
                }
                None => MatrixCell {
                    value: fill,
                    contributors: 0,
                },
            };
            cells.push(cell);
        }
    }

    Ok(Matrix {
        row_keys,
        col_keys,
        cells,
    })
}
