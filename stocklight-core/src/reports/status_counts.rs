//! Per-store stock-status counts (stacked bars) and region issue heatmap
//!
//! Works on the latest snapshot only: classifies each product with the
//! fixed absolute cutoffs, counts products per (store, status) over the
//! fixed status order, and rolls the three non-adequate buckets up into a
//! region x store issue heatmap.

use crate::pivot::{pivot, Aggregator, Matrix};
use crate::render::Legend;
use crate::row::RowSet;
use crate::source::DataSource;
use crate::status::{ReorderPolicy, StockStatus};
use crate::value::{Key, Value};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const QUERY: &str = "
    WITH latest AS (
        SELECT MAX(snapshot_date) AS snapshot_date FROM inventory_snapshots
    )
    SELECT
        i.store_id,
        r.region_name AS region,
        i.product_id,
        i.inventory_level
    FROM inventory_snapshots i
    JOIN latest ld ON i.snapshot_date = ld.snapshot_date
    JOIN stores s ON i.store_id = s.store_id
    JOIN regions r ON i.region_id = r.region_id
    ORDER BY i.store_id;
";

/// Stacked-bar data per store plus the issue heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StatusCounts {
    pub stores: Vec<StoreStatusCounts>,
    pub issue_heatmap: RegionIssueHeatmap,
    pub legend: Legend,
}

/// Product counts for one store, in fixed status order (missing statuses
/// count 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StoreStatusCounts {
    pub store_id: i64,
    pub region: String,
    pub counts: Vec<StatusCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StatusCount {
    pub status: StockStatus,
    pub count: u64,
}

/// Region x store totals of the three non-adequate statuses. Absent pairs
/// fill with 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegionIssueHeatmap {
    pub regions: Vec<String>,
    pub stores: Vec<String>,
    /// Region-major: `issues[r][s]` is the issue count of store s in region r.
    pub issues: Vec<Vec<f64>>,
}

/// Run the status-count report against an open data source.
pub fn run(source: &DataSource) -> Result<StatusCounts> {
    let rows = source
        .query(QUERY)
        .context("status count query failed")?;
    build(&rows)
}

/// Classify, count, and pivot the latest-snapshot rows.
pub fn build(rows: &RowSet) -> Result<StatusCounts> {
    let store_idx = column(rows, "store_id")?;
    let region_idx = column(rows, "region")?;
    let level_idx = column(rows, "inventory_level")?;

    let policy = ReorderPolicy::AbsoluteLevels;
    let mut counted = Vec::with_capacity(rows.len());
    let mut issues = Vec::new();
    let mut store_regions: BTreeMap<i64, String> = BTreeMap::new();

    for (i, record) in rows.rows.iter().enumerate() {
        let store_id = match record[store_idx].as_f64() {
            Some(v) => v as i64,
            None => bail!("row {i}: store_id is not numeric"),
        };
        let level = match record[level_idx].as_f64() {
            Some(v) => v,
            None => bail!("row {i}: inventory_level is not numeric"),
        };
        let region = record[region_idx].to_string();
        store_regions.entry(store_id).or_insert(region.clone());

        // Order quantity is irrelevant under absolute cutoffs
        let status = policy.classify(level, 0.0);
        counted.push(vec![
            Value::Int(store_id),
            Value::Int(i64::from(status.rank())),
            Value::Int(1),
        ]);
        if status != StockStatus::Adequate {
            issues.push(vec![
                Value::Text(region),
                Value::Int(store_id),
                Value::Int(1),
            ]);
        }
    }

    let count_columns = vec![
        "store_id".to_string(),
        "status_rank".to_string(),
        "one".to_string(),
    ];
    let count_matrix = pivot(
        &RowSet::new(count_columns, counted),
        "store_id",
        "status_rank",
        "one",
        Aggregator::Sum,
        0.0,
    )
    .context("failed to pivot status counts")?;

    let issue_columns = vec![
        "region".to_string(),
        "store_id".to_string(),
        "one".to_string(),
    ];
    let issue_matrix = pivot(
        &RowSet::new(issue_columns, issues),
        "region",
        "store_id",
        "one",
        Aggregator::Sum,
        0.0,
    )
    .context("failed to pivot issue totals")?;

    Ok(StatusCounts {
        stores: expand_store_counts(&count_matrix, &store_regions),
        issue_heatmap: RegionIssueHeatmap {
            regions: issue_matrix.row_keys.iter().map(|k| k.to_string()).collect(),
            stores: issue_matrix.col_keys.iter().map(|k| k.to_string()).collect(),
            issues: (0..issue_matrix.row_keys.len())
                .map(|r| {
                    (0..issue_matrix.col_keys.len())
                        .map(|c| issue_matrix.get(r, c).unwrap_or(0.0))
                        .collect()
                })
                .collect(),
        },
        legend: Legend::stock_status(),
    })
}

/// Expand the pivoted counts to the fixed status order, filling statuses
/// nobody observed with 0.
fn expand_store_counts(
    matrix: &Matrix,
    store_regions: &BTreeMap<i64, String>,
) -> Vec<StoreStatusCounts> {
    matrix
        .row_keys
        .iter()
        .filter_map(|store_key| {
            // The derived rows always carry integer store ids
            let store_id = match store_key {
                Key::Int(id) => *id,
                _ => return None,
            };
            let counts = StockStatus::ALL
                .iter()
                .map(|&status| {
                    let rank_key = Key::Int(i64::from(status.rank()));
                    let count = matrix
                        .get_by_key(store_key, &rank_key)
                        .unwrap_or(0.0) as u64;
                    StatusCount { status, count }
                })
                .collect();
            Some(StoreStatusCounts {
                store_id,
                region: store_regions.get(&store_id).cloned().unwrap_or_default(),
                counts,
            })
        })
        .collect()
}

fn column(rows: &RowSet, name: &str) -> Result<usize> {
    rows.column_index(name)
        .with_context(|| format!("status count result set is missing column {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::fixtures;

    fn raw_rows(records: Vec<(i64, &str, i64, i64)>) -> RowSet {
        RowSet::new(
            vec![
                "store_id".to_string(),
                "region".to_string(),
                "product_id".to_string(),
                "inventory_level".to_string(),
            ],
            records
                .into_iter()
                .map(|(store, region, product, level)| {
                    vec![
                        Value::Int(store),
                        Value::Text(region.to_string()),
                        Value::Int(product),
                        Value::Int(level),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn test_counts_follow_fixed_status_order_with_zero_fill() {
        // Store 1: one out-of-stock, two adequate; nothing near/below
        let rows = raw_rows(vec![
            (1, "North", 101, 0),
            (1, "North", 102, 50),
            (1, "North", 103, 80),
        ]);
        let report = build(&rows).unwrap();

        let store = &report.stores[0];
        assert_eq!(store.store_id, 1);
        assert_eq!(store.region, "North");
        let by_status: Vec<(StockStatus, u64)> =
            store.counts.iter().map(|c| (c.status, c.count)).collect();
        assert_eq!(
            by_status,
            vec![
                (StockStatus::OutOfStock, 1),
                (StockStatus::BelowReorder, 0),
                (StockStatus::NearReorder, 0),
                (StockStatus::Adequate, 2),
            ]
        );
    }

    #[test]
    fn test_issue_heatmap_counts_non_adequate_only() {
        let rows = raw_rows(vec![
            (1, "North", 101, 0),  // issue
            (1, "North", 102, 15), // issue (near reorder)
            (1, "North", 103, 80), // fine
            (2, "South", 101, 5),  // issue (below reorder)
        ]);
        let report = build(&rows).unwrap();

        let heatmap = &report.issue_heatmap;
        assert_eq!(heatmap.regions, vec!["North", "South"]);
        assert_eq!(heatmap.stores, vec!["1", "2"]);
        assert_eq!(heatmap.issues[0], vec![2.0, 0.0]); // North store 2 absent: fill 0
        assert_eq!(heatmap.issues[1], vec![0.0, 1.0]);
    }

    #[test]
    fn test_end_to_end_uses_latest_snapshot_only() {
        let source = fixtures::empty_source();
        fixtures::seed_dimensions(&source);
        // Older snapshot has an outage that the latest one resolved
        fixtures::insert_snapshot(&source, "2023-01-10", 1, 101, 1, 1, 0, 5, 40);
        fixtures::insert_snapshot(&source, "2023-02-10", 1, 101, 1, 1, 50, 5, 40);
        fixtures::insert_snapshot(&source, "2023-02-10", 1, 102, 1, 1, 8, 5, 40);

        let report = run(&source).unwrap();
        source.close().unwrap();

        let store = &report.stores[0];
        assert_eq!(store.counts[0].count, 0); // out-of-stock row is stale
        assert_eq!(store.counts[1].count, 1); // 102 below reorder
        assert_eq!(store.counts[3].count, 1); // 101 adequate
        assert_eq!(report.issue_heatmap.issues[0], vec![1.0]);
    }
}
