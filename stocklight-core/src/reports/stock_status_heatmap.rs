//! Product x store stock-status heatmap
//!
//! Classifies every (store, product) observation against its open order
//! quantity, then pivots with min-rank aggregation so the worst status
//! observed for a pair colors its cell.

use crate::pivot::{pivot, Aggregator, CategoryMatrix};
use crate::render::Legend;
use crate::row::RowSet;
use crate::source::DataSource;
use crate::status::{ReorderPolicy, StockStatus};
use crate::value::Value;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

const QUERY: &str = "
    SELECT
        i.store_id,
        i.product_id,
        i.inventory_level,
        i.units_ordered
    FROM inventory_snapshots i
    JOIN stores s ON i.store_id = s.store_id;
";

/// Dense product x store status grid. Cells nobody stocked are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StockStatusHeatmap {
    pub products: Vec<String>,
    pub stores: Vec<String>,
    /// Product-major: `cells[p][s]` is the worst status of product p in store s.
    pub cells: Vec<Vec<Option<StockStatus>>>,
    pub legend: Legend,
}

/// Run the stock-status heatmap report against an open data source.
pub fn run(source: &DataSource) -> Result<StockStatusHeatmap> {
    let rows = source
        .query(QUERY)
        .context("stock status query failed")?;
    build(&rows)
}

/// Classify and pivot the flat (store, product, level, ordered) rows.
pub fn build(rows: &RowSet) -> Result<StockStatusHeatmap> {
    let ranked = classify_rows(rows, ReorderPolicy::OrderedRatio)?;

    // Min over ranks: one bad observation sinks the cell
    let matrix = pivot(
        &ranked,
        "product_id",
        "store_id",
        "status_rank",
        Aggregator::Min,
        f64::NAN,
    )
    .context("failed to pivot stock statuses")?;
    let categories = CategoryMatrix::from_ranks(matrix);

    let products: Vec<String> = categories.matrix.row_keys.iter().map(|k| k.to_string()).collect();
    let stores: Vec<String> = categories.matrix.col_keys.iter().map(|k| k.to_string()).collect();
    let cells = (0..products.len())
        .map(|p| (0..stores.len()).map(|s| categories.status(p, s)).collect())
        .collect();

    Ok(StockStatusHeatmap {
        products,
        stores,
        cells,
        legend: Legend::stock_status(),
    })
}

/// Derive a (product_id, store_id, status_rank) row set from raw
/// observations under the given policy.
fn classify_rows(rows: &RowSet, policy: ReorderPolicy) -> Result<RowSet> {
    let store_idx = column(rows, "store_id")?;
    let product_idx = column(rows, "product_id")?;
    let level_idx = column(rows, "inventory_level")?;
    let ordered_idx = column(rows, "units_ordered")?;

    let mut ranked = Vec::with_capacity(rows.len());
    for (i, record) in rows.rows.iter().enumerate() {
        let (level, ordered) = match (record[level_idx].as_f64(), record[ordered_idx].as_f64()) {
            (Some(level), Some(ordered)) => (level, ordered),
            _ => bail!("row {i}: inventory_level/units_ordered is not numeric"),
        };
        let status = policy.classify(level, ordered);
        ranked.push(vec![
            record[product_idx].clone(),
            record[store_idx].clone(),
            Value::Int(i64::from(status.rank())),
        ]);
    }

    Ok(RowSet::new(
        vec![
            "product_id".to_string(),
            "store_id".to_string(),
            "status_rank".to_string(),
        ],
        ranked,
    ))
}

fn column(rows: &RowSet, name: &str) -> Result<usize> {
    rows.column_index(name)
        .with_context(|| format!("stock status result set is missing column {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::fixtures;

    fn raw_rows(records: Vec<(i64, i64, i64, i64)>) -> RowSet {
        RowSet::new(
            vec![
                "store_id".to_string(),
                "product_id".to_string(),
                "inventory_level".to_string(),
                "units_ordered".to_string(),
            ],
            records
                .into_iter()
                .map(|(store, product, level, ordered)| {
                    vec![
                        Value::Int(store),
                        Value::Int(product),
                        Value::Int(level),
                        Value::Int(ordered),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn test_worst_status_wins_per_cell() {
        // Product 101 in store 1 observed Adequate then Out of Stock
        let rows = raw_rows(vec![(1, 101, 80, 40), (1, 101, 0, 40)]);
        let heatmap = build(&rows).unwrap();
        assert_eq!(heatmap.cells[0][0], Some(StockStatus::OutOfStock));
    }

    #[test]
    fn test_unobserved_pair_is_absent() {
        let rows = raw_rows(vec![(1, 101, 80, 40), (2, 102, 10, 40)]);
        let heatmap = build(&rows).unwrap();
        assert_eq!(heatmap.products, vec!["101", "102"]);
        assert_eq!(heatmap.stores, vec!["1", "2"]);
        assert_eq!(heatmap.cells[0][0], Some(StockStatus::Adequate));
        assert_eq!(heatmap.cells[0][1], None);
        assert_eq!(heatmap.cells[1][0], None);
        assert_eq!(heatmap.cells[1][1], Some(StockStatus::BelowReorder));
    }

    #[test]
    fn test_empty_result_is_empty_heatmap() {
        let rows = raw_rows(vec![]);
        let heatmap = build(&rows).unwrap();
        assert!(heatmap.products.is_empty());
        assert!(heatmap.cells.is_empty());
    }

    #[test]
    fn test_end_to_end_against_seeded_database() {
        let source = fixtures::empty_source();
        fixtures::seed_dimensions(&source);
        // Store 1: 101 near reorder (30 < 40), 102 out of stock
        fixtures::insert_snapshot(&source, "2023-01-10", 1, 101, 1, 1, 30, 5, 40);
        fixtures::insert_snapshot(&source, "2023-01-10", 1, 102, 1, 1, 0, 5, 40);
        // Store 2: 101 adequate
        fixtures::insert_snapshot(&source, "2023-01-10", 2, 101, 2, 1, 90, 5, 40);

        let heatmap = run(&source).unwrap();
        source.close().unwrap();

        assert_eq!(heatmap.products, vec!["101", "102"]);
        assert_eq!(heatmap.stores, vec!["1", "2"]);
        assert_eq!(heatmap.cells[0][0], Some(StockStatus::NearReorder));
        assert_eq!(heatmap.cells[0][1], Some(StockStatus::Adequate));
        assert_eq!(heatmap.cells[1][0], Some(StockStatus::OutOfStock));
        assert_eq!(heatmap.cells[1][1], None);
        assert_eq!(heatmap.legend.entries.len(), 4);
    }
}
