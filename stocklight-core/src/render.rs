//! Render-ready output and text/JSON sinks
//!
//! The report structs plus a color legend are the renderer boundary: the
//! core produces them and consumes nothing back. Text output is
//! fixed-width columns; JSON is pretty-printed serde output.
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Identical input yields byte-for-byte identical output

use crate::kpi::TrafficLight;
use crate::reports::monthly_kpis::KpiDashboard;
use crate::reports::seasonal_demand::SeasonalDemand;
use crate::reports::sell_through::SellThroughReport;
use crate::reports::status_counts::StatusCounts;
use crate::reports::stock_status_heatmap::StockStatusHeatmap;
use crate::status::StockStatus;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Fixed color legend accompanying a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Legend {
    pub entries: Vec<LegendEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

impl Legend {
    /// Legend over the four stock statuses, in fixed display order.
    pub fn stock_status() -> Legend {
        Legend {
            entries: StockStatus::ALL
                .iter()
                .map(|s| LegendEntry {
                    label: s.as_str().to_string(),
                    color: s.color().to_string(),
                })
                .collect(),
        }
    }

    /// Legend over the traffic-light categories.
    pub fn traffic_light() -> Legend {
        Legend {
            entries: [TrafficLight::Green, TrafficLight::Yellow, TrafficLight::Red, TrafficLight::Gray]
                .iter()
                .map(|l| LegendEntry {
                    label: l.as_str().to_string(),
                    color: l.color().to_string(),
                })
                .collect(),
        }
    }
}

/// Serialize any report to pretty JSON.
pub fn render_json<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize report to JSON")
}

/// Render the KPI dashboard as text: one section per KPI panel, one line
/// per (store, month) point with its traffic light.
pub fn render_dashboard_text(dashboard: &KpiDashboard) -> String {
    let mut output = String::new();
    for panel in &dashboard.panels {
        output.push_str(&format!("== {} ==\n", panel.title));
        output.push_str(&format!(
            "{:<8} {:<9} {:<12} {}\n",
            "STORE", "MONTH", "VALUE", "LIGHT"
        ));
        for series in &panel.series {
            for point in &series.points {
                let value = point
                    .value
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_else(|| "-".to_string());
                output.push_str(&format!(
                    "{:<8} {:<9} {:<12} {}\n",
                    series.store_id,
                    point.period.to_string(),
                    value,
                    point.light.as_str(),
                ));
            }
        }
        output.push('\n');
    }
    output
}

/// Render the stock-status heatmap as a text grid (one row per product).
pub fn render_heatmap_text(heatmap: &StockStatusHeatmap) -> String {
    let mut output = String::new();
    output.push_str(&format!("{:<12}", "PRODUCT"));
    for store in &heatmap.stores {
        output.push_str(&format!(" {:<14}", format!("store {store}")));
    }
    output.push('\n');

    for (product, row) in heatmap.products.iter().zip(&heatmap.cells) {
        output.push_str(&format!("{product:<12}"));
        for cell in row {
            let label = cell.map(|s| s.as_str()).unwrap_or("-");
            output.push_str(&format!(" {label:<14}"));
        }
        output.push('\n');
    }
    output
}

/// Render per-store status counts as a table in fixed status order.
pub fn render_status_counts_text(counts: &StatusCounts) -> String {
    let mut output = String::new();
    output.push_str(&format!("{:<8} {:<12}", "STORE", "REGION"));
    for status in StockStatus::ALL {
        output.push_str(&format!(" {:<14}", status.as_str()));
    }
    output.push('\n');

    for store in &counts.stores {
        output.push_str(&format!("{:<8} {:<12}", store.store_id, store.region));
        for entry in &store.counts {
            output.push_str(&format!(" {:<14}", entry.count));
        }
        output.push('\n');
    }

    let heatmap = &counts.issue_heatmap;
    if !heatmap.regions.is_empty() {
        output.push_str("\nStock issues by region and store:\n");
        output.push_str(&format!("{:<12}", "REGION"));
        for store in &heatmap.stores {
            output.push_str(&format!(" {:<8}", format!("store {store}")));
        }
        output.push('\n');
        for (region, row) in heatmap.regions.iter().zip(&heatmap.issues) {
            output.push_str(&format!("{region:<12}"));
            for issues in row {
                output.push_str(&format!(" {:<8}", format!("{issues:.0}")));
            }
            output.push('\n');
        }
    }
    output
}

/// Render seasonal demand as a category x season table.
pub fn render_seasonal_text(demand: &SeasonalDemand) -> String {
    let mut output = String::new();
    output.push_str(&format!("{:<16}", "CATEGORY"));
    for season in &demand.seasons {
        output.push_str(&format!(" {season:<10}"));
    }
    output.push('\n');
    for group in &demand.categories {
        output.push_str(&format!("{:<16}", group.category));
        for value in &group.avg_units_sold {
            output.push_str(&format!(" {value:<10.2}"));
        }
        output.push('\n');
    }
    output
}

/// Render sell-through series as one line per (region, month).
pub fn render_sell_through_text(report: &SellThroughReport) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<12} {:<9} {:<12} {:<12} {:<8} {}\n",
        "REGION", "MONTH", "UNITS_SOLD", "INVENTORY", "STR%", "LIGHT"
    ));
    for series in &report.regions {
        for point in &series.points {
            let str_pct = point
                .sell_through
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "{:<12} {:<9} {:<12.2} {:<12.2} {:<8} {}\n",
                series.region,
                point.period.to_string(),
                point.units_sold,
                point.avg_inventory,
                str_pct,
                point.light.as_str(),
            ));
        }
    }
    output
}
