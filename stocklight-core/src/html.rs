//! Static HTML report generation
//!
//! Self-contained pages with embedded CSS, no scripts: heatmap grids are
//! colored table cells, stacked bars are proportional CSS spans. Output is
//! a plain artifact for human inspection; nothing is read back.

use crate::reports::monthly_kpis::KpiDashboard;
use crate::reports::seasonal_demand::SeasonalDemand;
use crate::reports::sell_through::SellThroughReport;
use crate::reports::status_counts::StatusCounts;
use crate::reports::stock_status_heatmap::StockStatusHeatmap;
use crate::render::Legend;

/// Render the KPI dashboard as a static HTML page.
pub fn render_html_dashboard(dashboard: &KpiDashboard) -> String {
    let mut sections = String::new();
    for panel in &dashboard.panels {
        let mut rows = String::new();
        for series in &panel.series {
            for point in &series.points {
                let value = point
                    .value
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_else(|| "&ndash;".to_string());
                rows.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td class=\"num\">{}</td>\
                     <td><span class=\"dot\" style=\"background:{}\"></span>{}</td></tr>\n",
                    series.store_id,
                    point.period,
                    value,
                    point.light.color(),
                    point.light.as_str(),
                ));
            }
        }
        sections.push_str(&format!(
            "<section><h2>{}</h2><table>\
             <tr><th>Store</th><th>Month</th><th>Value</th><th>Light</th></tr>\n{rows}</table></section>\n",
            panel.title,
        ));
    }
    page("Monthly KPI Dashboard", &sections, Some(&Legend::traffic_light()))
}

/// Render the product x store status heatmap as a static HTML page.
pub fn render_html_heatmap(heatmap: &StockStatusHeatmap) -> String {
    let mut header = String::from("<tr><th>Product</th>");
    for store in &heatmap.stores {
        header.push_str(&format!("<th>Store {store}</th>"));
    }
    header.push_str("</tr>\n");

    let mut rows = String::new();
    for (product, cells) in heatmap.products.iter().zip(&heatmap.cells) {
        rows.push_str(&format!("<tr><td>{product}</td>"));
        for cell in cells {
            match cell {
                Some(status) => rows.push_str(&format!(
                    "<td class=\"cell\" style=\"background:{}\" title=\"{}\"></td>",
                    status.color(),
                    status.as_str(),
                )),
                None => rows.push_str("<td class=\"cell empty\"></td>"),
            }
        }
        rows.push_str("</tr>\n");
    }

    let body = format!("<section><table>{header}{rows}</table></section>");
    page("Stock Status Heatmap", &body, Some(&heatmap.legend))
}

/// Render the per-store status counts as stacked bars plus the region
/// issue heatmap.
pub fn render_html_status_counts(counts: &StatusCounts) -> String {
    let mut bars = String::new();
    for store in &counts.stores {
        let total: u64 = store.counts.iter().map(|c| c.count).sum();
        let mut segments = String::new();
        if total > 0 {
            for entry in &store.counts {
                if entry.count == 0 {
                    continue;
                }
                let pct = entry.count as f64 / total as f64 * 100.0;
                segments.push_str(&format!(
                    "<span class=\"seg\" style=\"width:{pct:.1}%;background:{}\" \
                     title=\"{}: {}\"></span>",
                    entry.status.color(),
                    entry.status.as_str(),
                    entry.count,
                ));
            }
        }
        bars.push_str(&format!(
            "<div class=\"bar-row\"><div class=\"bar-label\">Store {} ({})</div>\
             <div class=\"bar\">{segments}</div></div>\n",
            store.store_id, store.region,
        ));
    }

    let mut heat = String::new();
    let heatmap = &counts.issue_heatmap;
    if !heatmap.regions.is_empty() {
        let max_issues = heatmap
            .issues
            .iter()
            .flatten()
            .fold(0.0f64, |acc, &v| acc.max(v))
            .max(1.0);
        heat.push_str("<h2>Stock issues by region and store</h2><table><tr><th>Region</th>");
        for store in &heatmap.stores {
            heat.push_str(&format!("<th>Store {store}</th>"));
        }
        heat.push_str("</tr>\n");
        for (region, row) in heatmap.regions.iter().zip(&heatmap.issues) {
            heat.push_str(&format!("<tr><td>{region}</td>"));
            for &issues in row {
                // Single-hue ramp, darker means more issues
                let alpha = issues / max_issues;
                heat.push_str(&format!(
                    "<td class=\"num\" style=\"background:rgba(215,39,40,{alpha:.2})\">{issues:.0}</td>",
                ));
            }
            heat.push_str("</tr>\n");
        }
        heat.push_str("</table>");
    }

    let body = format!("<section><h2>Inventory status by store</h2>{bars}</section><section>{heat}</section>");
    page("Inventory Status by Store", &body, Some(&counts.legend))
}

/// Render seasonal demand as a category x season table.
pub fn render_html_seasonal(demand: &SeasonalDemand) -> String {
    let mut header = String::from("<tr><th>Category</th>");
    for season in &demand.seasons {
        header.push_str(&format!("<th>{season}</th>"));
    }
    header.push_str("</tr>\n");

    let mut rows = String::new();
    for group in &demand.categories {
        rows.push_str(&format!("<tr><td>{}</td>", group.category));
        for value in &group.avg_units_sold {
            rows.push_str(&format!("<td class=\"num\">{value:.2}</td>"));
        }
        rows.push_str("</tr>\n");
    }

    let body = format!("<section><table>{header}{rows}</table></section>");
    page("Average Units Sold by Category and Season", &body, None)
}

/// Render the sell-through series as per-region tables.
pub fn render_html_sell_through(report: &SellThroughReport) -> String {
    let mut sections = String::new();
    for series in &report.regions {
        let mut rows = String::new();
        for point in &series.points {
            let str_pct = point
                .sell_through
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "&ndash;".to_string());
            rows.push_str(&format!(
                "<tr><td>{}</td><td class=\"num\">{:.2}</td><td class=\"num\">{:.2}</td>\
                 <td class=\"num\">{}</td>\
                 <td><span class=\"dot\" style=\"background:{}\"></span>{}</td></tr>\n",
                point.period,
                point.units_sold,
                point.avg_inventory,
                str_pct,
                point.light.color(),
                point.light.as_str(),
            ));
        }
        sections.push_str(&format!(
            "<section><h2>{}</h2><table>\
             <tr><th>Month</th><th>Units Sold</th><th>Avg Inventory</th><th>STR %</th><th>Light</th></tr>\n\
             {rows}</table></section>\n",
            series.region,
        ));
    }
    page("Monthly Sell-Through Rate by Region", &sections, Some(&Legend::traffic_light()))
}

fn page(title: &str, body: &str, legend: Option<&Legend>) -> String {
    let legend_html = legend.map(render_legend).unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <h1>{title}</h1>
        {legend_html}
        {body}
        <footer>Generated by stocklight v{version}</footer>
    </div>
</body>
</html>"#,
        title = title,
        css = inline_css(),
        legend_html = legend_html,
        body = body,
        version = env!("CARGO_PKG_VERSION"),
    )
}

fn render_legend(legend: &Legend) -> String {
    let entries: String = legend
        .entries
        .iter()
        .map(|e| {
            format!(
                "<span class=\"legend-entry\"><span class=\"dot\" style=\"background:{}\"></span>{}</span>",
                e.color, e.label,
            )
        })
        .collect();
    format!("<div class=\"legend\">{entries}</div>")
}

fn inline_css() -> &'static str {
    r#"
body { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; margin: 0; background: #f7f7f5; color: #222; }
.container { max-width: 960px; margin: 0 auto; padding: 24px; }
h1 { font-size: 22px; }
h2 { font-size: 16px; margin-top: 28px; }
table { border-collapse: collapse; margin-top: 8px; }
th, td { border: 1px solid #ccc; padding: 4px 10px; font-size: 13px; text-align: left; }
td.num { text-align: right; font-variant-numeric: tabular-nums; }
td.cell { width: 28px; height: 20px; padding: 0; }
td.cell.empty { background: repeating-linear-gradient(45deg, #eee, #eee 4px, #fff 4px, #fff 8px); }
.dot { display: inline-block; width: 10px; height: 10px; border-radius: 50%; margin-right: 6px; border: 1px solid #0003; }
.legend { margin: 12px 0; }
.legend-entry { margin-right: 16px; font-size: 13px; }
.bar-row { display: flex; align-items: center; margin: 4px 0; }
.bar-label { width: 180px; font-size: 13px; }
.bar { flex: 1; height: 18px; background: #eee; display: flex; }
.seg { display: inline-block; height: 100%; }
footer { margin-top: 32px; font-size: 11px; color: #999; }
"#
}
