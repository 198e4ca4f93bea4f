//! Monthly KPI dashboard - traffic lights per store and month
//!
//! One panel per KPI; each panel holds a chronological series per store
//! with a traffic light on every point. A trailing-window copy of the
//! panels feeds the sparkline view.

use crate::kpi::{classify, Kpi, TrafficLight};
use crate::period::{last_n, Period};
use crate::row::RowSet;
use crate::source::DataSource;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Default trailing window for the sparkline panels (months).
pub const DEFAULT_SPARKLINE_WINDOW: usize = 3;

/// Monthly KPI rollup per store. The zero-denominator KPIs carry a NULLIF
/// guard; the resulting NULL surfaces as a gray point, never an error.
const QUERY: &str = "
    SELECT
        store_id,
        strftime('%Y-%m', snapshot_date) AS month,
        ROUND(AVG(inventory_level), 2) AS average_stock_level,
        ROUND(SUM(CASE WHEN inventory_level = 0 THEN 1 ELSE 0 END) * 1.0 / COUNT(*), 2)
            AS stockout_rate,
        ROUND(SUM(units_sold) * 1.0 / NULLIF(AVG(inventory_level), 0), 2)
            AS inventory_turnover,
        ROUND(SUM(units_sold) * 1.0 / NULLIF(SUM(units_sold) + MAX(inventory_level), 0) * 100, 2)
            AS sell_through_rate
    FROM inventory_snapshots
    GROUP BY store_id, month
    ORDER BY store_id, month;
";

/// Complete dashboard: full-history panels plus sparkline panels over the
/// last few periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct KpiDashboard {
    pub periods: Vec<Period>,
    pub panels: Vec<KpiPanel>,
    pub sparklines: Vec<KpiPanel>,
}

/// One KPI across all stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct KpiPanel {
    pub kpi: Kpi,
    pub title: String,
    pub series: Vec<StoreSeries>,
}

/// One store's chronological points within a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StoreSeries {
    pub store_id: i64,
    pub points: Vec<KpiPoint>,
}

/// A single (month, value) observation with its traffic light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct KpiPoint {
    pub period: Period,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub light: TrafficLight,
}

/// Run the monthly KPI report against an open data source.
pub fn run(source: &DataSource, sparkline_window: usize) -> Result<KpiDashboard> {
    let rows = source
        .query(QUERY)
        .context("monthly KPI query failed")?;
    build(&rows, sparkline_window)
}

/// Build the dashboard from the flat KPI rows.
pub fn build(rows: &RowSet, sparkline_window: usize) -> Result<KpiDashboard> {
    let store_idx = column(rows, "store_id")?;
    let month_idx = column(rows, "month")?;
    let kpi_idx: Vec<usize> = Kpi::ALL
        .iter()
        .map(|kpi| column(rows, kpi.as_str()))
        .collect::<Result<_>>()?;

    // store -> period -> one optional value per KPI
    let mut by_store: BTreeMap<i64, BTreeMap<Period, [Option<f64>; 4]>> = BTreeMap::new();
    let mut periods: BTreeSet<Period> = BTreeSet::new();

    for (i, record) in rows.rows.iter().enumerate() {
        let store_id = match record[store_idx].as_f64() {
            Some(v) => v as i64,
            None => bail!("row {i}: store_id is not numeric"),
        };
        let month = record[month_idx]
            .to_string()
            .parse::<Period>()
            .with_context(|| format!("row {i}: bad month label"))?;
        periods.insert(month);

        let mut values = [None; 4];
        for (k, idx) in kpi_idx.iter().enumerate() {
            values[k] = record[*idx].as_f64();
        }
        by_store.entry(store_id).or_default().insert(month, values);
    }

    let periods: Vec<Period> = periods.into_iter().collect();
    let panels = build_panels(&by_store, None);
    let window: BTreeSet<Period> = last_n(&periods, sparkline_window).iter().copied().collect();
    let sparklines = build_panels(&by_store, Some(&window));

    Ok(KpiDashboard {
        periods,
        panels,
        sparklines,
    })
}

fn build_panels(
    by_store: &BTreeMap<i64, BTreeMap<Period, [Option<f64>; 4]>>,
    window: Option<&BTreeSet<Period>>,
) -> Vec<KpiPanel> {
    Kpi::ALL
        .iter()
        .enumerate()
        .map(|(k, &kpi)| KpiPanel {
            kpi,
            title: kpi.title().to_string(),
            series: by_store
                .iter()
                .map(|(&store_id, months)| StoreSeries {
                    store_id,
                    // BTreeMap iteration is already chronological
                    points: months
                        .iter()
                        .filter(|(period, _)| window.map_or(true, |w| w.contains(period)))
                        .map(|(&period, values)| KpiPoint {
                            period,
                            value: values[k],
                            light: values[k]
                                .map(|v| classify(v, kpi))
                                .unwrap_or(TrafficLight::Gray),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

fn column(rows: &RowSet, name: &str) -> Result<usize> {
    rows.column_index(name)
        .with_context(|| format!("KPI result set is missing column {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::fixtures;
    use crate::value::Value;

    fn kpi_rows(records: Vec<Vec<Value>>) -> RowSet {
        RowSet::new(
            vec![
                "store_id".to_string(),
                "month".to_string(),
                "average_stock_level".to_string(),
                "stockout_rate".to_string(),
                "inventory_turnover".to_string(),
                "sell_through_rate".to_string(),
            ],
            records,
        )
    }

    fn record(store: i64, month: &str, level: f64) -> Vec<Value> {
        vec![
            Value::Int(store),
            Value::Text(month.to_string()),
            Value::Real(level),
            Value::Real(0.05),
            Value::Real(3.0),
            Value::Real(80.0),
        ]
    }

    #[test]
    fn test_stock_levels_classify_green_then_red() {
        // 120 in January is green, 60 in February is red
        let rows = kpi_rows(vec![record(1, "2023-01", 120.0), record(1, "2023-02", 60.0)]);
        let dashboard = build(&rows, 3).unwrap();

        let panel = &dashboard.panels[0];
        assert_eq!(panel.kpi, Kpi::AverageStockLevel);
        let points = &panel.series[0].points;
        assert_eq!(points[0].light, TrafficLight::Green);
        assert_eq!(points[1].light, TrafficLight::Red);
    }

    #[test]
    fn test_points_sort_chronologically_across_years() {
        let rows = kpi_rows(vec![record(1, "2023-01", 90.0), record(1, "2022-12", 90.0)]);
        let dashboard = build(&rows, 3).unwrap();

        let points = &dashboard.panels[0].series[0].points;
        assert_eq!(points[0].period.to_string(), "2022-12");
        assert_eq!(points[1].period.to_string(), "2023-01");
        assert_eq!(dashboard.periods.first().unwrap().to_string(), "2022-12");
    }

    #[test]
    fn test_null_kpi_value_is_gray() {
        let rows = kpi_rows(vec![vec![
            Value::Int(1),
            Value::Text("2023-01".to_string()),
            Value::Real(0.0),
            Value::Real(1.0),
            Value::Null, // turnover undefined: average inventory was zero
            Value::Null,
        ]]);
        let dashboard = build(&rows, 3).unwrap();

        let turnover = &dashboard.panels[2];
        assert_eq!(turnover.kpi, Kpi::InventoryTurnover);
        let point = &turnover.series[0].points[0];
        assert_eq!(point.value, None);
        assert_eq!(point.light, TrafficLight::Gray);
    }

    #[test]
    fn test_sparklines_keep_only_trailing_window() {
        let rows = kpi_rows(vec![
            record(1, "2023-01", 90.0),
            record(1, "2023-02", 90.0),
            record(1, "2023-03", 90.0),
            record(1, "2023-04", 90.0),
        ]);
        let dashboard = build(&rows, 3).unwrap();

        let full = &dashboard.panels[0].series[0].points;
        let spark = &dashboard.sparklines[0].series[0].points;
        assert_eq!(full.len(), 4);
        assert_eq!(spark.len(), 3);
        assert_eq!(spark[0].period.to_string(), "2023-02");
    }

    #[test]
    fn test_empty_result_set_builds_empty_dashboard() {
        let rows = kpi_rows(vec![]);
        let dashboard = build(&rows, 3).unwrap();
        assert!(dashboard.periods.is_empty());
        assert_eq!(dashboard.panels.len(), 4);
        assert!(dashboard.panels.iter().all(|p| p.series.is_empty()));
    }

    #[test]
    fn test_end_to_end_against_seeded_database() {
        let source = fixtures::empty_source();
        fixtures::seed_dimensions(&source);
        // Store 1: January averages 120 (green), February 60 (red)
        fixtures::insert_snapshot(&source, "2023-01-10", 1, 101, 1, 1, 120, 30, 50);
        fixtures::insert_snapshot(&source, "2023-02-10", 1, 101, 1, 1, 60, 30, 50);

        let dashboard = run(&source, 3).unwrap();
        source.close().unwrap();

        let panel = &dashboard.panels[0];
        let points = &panel.series[0].points;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, Some(120.0));
        assert_eq!(points[0].light, TrafficLight::Green);
        assert_eq!(points[1].value, Some(60.0));
        assert_eq!(points[1].light, TrafficLight::Red);
    }

    #[test]
    fn test_zero_inventory_turnover_is_gray_end_to_end() {
        let source = fixtures::empty_source();
        fixtures::seed_dimensions(&source);
        // All stock gone: AVG(inventory_level) = 0, NULLIF guard kicks in
        fixtures::insert_snapshot(&source, "2023-01-10", 1, 101, 1, 1, 0, 30, 50);

        let dashboard = run(&source, 3).unwrap();
        source.close().unwrap();

        let turnover = &dashboard.panels[2];
        let point = &turnover.series[0].points[0];
        assert_eq!(point.value, None);
        assert_eq!(point.light, TrafficLight::Gray);
    }
}
