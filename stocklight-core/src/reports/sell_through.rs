//! Monthly sell-through rate, units sold, and inventory by region
//!
//! Line-chart data: one chronological series per region carrying total
//! units sold, weighted average inventory, and the sell-through percentage
//! with its traffic light. A month whose denominator is zero has no STR
//! value (the NULLIF guard in the query) and charts as a gray gap.

use crate::kpi::{classify, Kpi, TrafficLight};
use crate::period::Period;
use crate::row::RowSet;
use crate::source::DataSource;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const QUERY: &str = "
    WITH daily AS (
        SELECT
            r.region_name AS region,
            date(i.snapshot_date) AS day,
            strftime('%Y-%m', i.snapshot_date) AS month,
            SUM(i.units_sold) AS daily_sales,
            SUM(i.inventory_level) AS daily_inventory
        FROM inventory_snapshots i
        JOIN regions r ON i.region_id = r.region_id
        GROUP BY region, day, month
    ),
    monthly AS (
        SELECT
            month,
            region,
            ROUND(AVG(daily_inventory), 2) AS weighted_avg_inventory,
            SUM(daily_sales) AS total_units_sold
        FROM daily
        GROUP BY region, month
    )
    SELECT
        month,
        region,
        total_units_sold,
        weighted_avg_inventory,
        ROUND(total_units_sold * 1.0
              / NULLIF(total_units_sold + weighted_avg_inventory, 0) * 100, 2)
            AS sell_through_rate_percent
    FROM monthly
    ORDER BY month, region;
";

/// Per-region monthly sell-through series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SellThroughReport {
    pub regions: Vec<RegionSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegionSeries {
    pub region: String,
    pub points: Vec<SellThroughPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SellThroughPoint {
    pub period: Period,
    pub units_sold: f64,
    pub avg_inventory: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sell_through: Option<f64>,
    pub light: TrafficLight,
}

/// Run the sell-through report against an open data source.
pub fn run(source: &DataSource) -> Result<SellThroughReport> {
    let rows = source
        .query(QUERY)
        .context("sell-through query failed")?;
    build(&rows)
}

/// Build chronological per-region series from the flat monthly rows.
pub fn build(rows: &RowSet) -> Result<SellThroughReport> {
    let month_idx = column(rows, "month")?;
    let region_idx = column(rows, "region")?;
    let sold_idx = column(rows, "total_units_sold")?;
    let inventory_idx = column(rows, "weighted_avg_inventory")?;
    let str_idx = column(rows, "sell_through_rate_percent")?;

    let mut by_region: BTreeMap<String, BTreeMap<Period, SellThroughPoint>> = BTreeMap::new();

    for (i, record) in rows.rows.iter().enumerate() {
        let period = record[month_idx]
            .to_string()
            .parse::<Period>()
            .with_context(|| format!("row {i}: bad month label"))?;
        let region = record[region_idx].to_string();
        let (units_sold, avg_inventory) =
            match (record[sold_idx].as_f64(), record[inventory_idx].as_f64()) {
                (Some(sold), Some(inventory)) => (sold, inventory),
                _ => bail!("row {i}: units sold/inventory is not numeric"),
            };
        let sell_through = record[str_idx].as_f64();

        let point = SellThroughPoint {
            period,
            units_sold,
            avg_inventory,
            sell_through,
            light: sell_through
                .map(|v| classify(v, Kpi::SellThroughRate))
                .unwrap_or(TrafficLight::Gray),
        };
        by_region.entry(region).or_default().insert(period, point);
    }

    Ok(SellThroughReport {
        regions: by_region
            .into_iter()
            .map(|(region, months)| RegionSeries {
                region,
                // BTreeMap iteration is already chronological
                points: months.into_values().collect(),
            })
            .collect(),
    })
}

fn column(rows: &RowSet, name: &str) -> Result<usize> {
    rows.column_index(name)
        .with_context(|| format!("sell-through result set is missing column {name}"))
}
