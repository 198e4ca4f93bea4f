//! Report jobs - one module per standalone reporting script
//!
//! Each job is a single batch operation: fixed analytical SQL in, a
//! render-ready struct out. No state survives the run; every invocation
//! recomputes from the full result set.

pub mod monthly_kpis;
pub mod seasonal_demand;
pub mod sell_through;
pub mod status_counts;
pub mod stock_status_heatmap;
