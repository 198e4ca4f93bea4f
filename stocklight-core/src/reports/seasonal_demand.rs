//! Seasonal demand - average units sold by product category and season
//!
//! Grouped-bar data: one bar group per season, one bar per category,
//! height is the mean units sold over all matching snapshot rows.

use crate::pivot::{pivot, Aggregator};
use crate::row::RowSet;
use crate::source::DataSource;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const QUERY: &str = "
    SELECT
        p.category,
        se.season_name,
        i.units_sold
    FROM inventory_snapshots i
    JOIN products p ON i.product_id = p.product_id
    JOIN seasonality se ON i.season_id = se.season_id;
";

/// Category x season mean units sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SeasonalDemand {
    pub seasons: Vec<String>,
    pub categories: Vec<CategoryBars>,
}

/// One category's bar heights, aligned with `seasons`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryBars {
    pub category: String,
    pub avg_units_sold: Vec<f64>,
}

/// Run the seasonal demand report against an open data source.
pub fn run(source: &DataSource) -> Result<SeasonalDemand> {
    let rows = source
        .query(QUERY)
        .context("seasonal demand query failed")?;
    build(&rows)
}

/// Pivot the flat (category, season, units_sold) rows with mean
/// aggregation; seasons a category never sold in chart as 0.
pub fn build(rows: &RowSet) -> Result<SeasonalDemand> {
    let matrix = pivot(
        rows,
        "category",
        "season_name",
        "units_sold",
        Aggregator::Mean,
        0.0,
    )
    .context("failed to pivot seasonal demand")?;

    let seasons: Vec<String> = matrix.col_keys.iter().map(|k| k.to_string()).collect();
    let categories = matrix
        .row_keys
        .iter()
        .enumerate()
        .map(|(r, key)| CategoryBars {
            category: key.to_string(),
            avg_units_sold: (0..seasons.len())
                .map(|c| matrix.get(r, c).unwrap_or(0.0))
                .collect(),
        })
        .collect();

    Ok(SeasonalDemand { seasons, categories })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::fixtures;
    use crate::value::Value;

    fn raw_rows(records: Vec<(&str, &str, i64)>) -> RowSet {
        RowSet::new(
            vec![
                "category".to_string(),
                "season_name".to_string(),
                "units_sold".to_string(),
            ],
            records
                .into_iter()
                .map(|(category, season, sold)| {
                    vec![
                        Value::Text(category.to_string()),
                        Value::Text(season.to_string()),
                        Value::Int(sold),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn test_mean_per_category_and_season() {
        let rows = raw_rows(vec![
            ("Electronics", "Summer", 10),
            ("Electronics", "Summer", 20),
            ("Groceries", "Winter", 6),
        ]);
        let demand = build(&rows).unwrap();

        assert_eq!(demand.seasons, vec!["Summer", "Winter"]);
        let electronics = &demand.categories[0];
        assert_eq!(electronics.category, "Electronics");
        assert_eq!(electronics.avg_units_sold, vec![15.0, 0.0]);
        let groceries = &demand.categories[1];
        assert_eq!(groceries.avg_units_sold, vec![0.0, 6.0]);
    }

    #[test]
    fn test_empty_result_is_empty_report() {
        let demand = build(&raw_rows(vec![])).unwrap();
        assert!(demand.seasons.is_empty());
        assert!(demand.categories.is_empty());
    }

    #[test]
    fn test_end_to_end_against_seeded_database() {
        let source = fixtures::empty_source();
        fixtures::seed_dimensions(&source);
        // Electronics sell 10 and 20 in Summer (season 2)
        fixtures::insert_snapshot(&source, "2023-07-01", 1, 101, 1, 2, 50, 10, 5);
        fixtures::insert_snapshot(&source, "2023-07-02", 1, 101, 1, 2, 40, 20, 5);
        // Clothing sells 8 in Winter (season 4)
        fixtures::insert_snapshot(&source, "2023-12-01", 2, 103, 2, 4, 30, 8, 5);

        let demand = run(&source).unwrap();
        source.close().unwrap();

        assert_eq!(demand.seasons, vec!["Summer", "Winter"]);
        assert_eq!(demand.categories.len(), 2);
        assert_eq!(demand.categories[0].category, "Clothing");
        assert_eq!(demand.categories[0].avg_units_sold, vec![0.0, 8.0]);
        assert_eq!(demand.categories[1].category, "Electronics");
        assert_eq!(demand.categories[1].avg_units_sold, vec![15.0, 0.0]);
    }
}
