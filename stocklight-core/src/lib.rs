//! stocklight-core - inventory KPI classification and pivoting
//!
//! Batch reporting core: connect to a relational store, run a fixed
//! analytical query, classify KPI values into traffic-light or stock-status
//! categories, pivot flat rows into dense matrices, and hand render-ready
//! chart data to a sink. Everything is recomputed from scratch per run;
//! nothing persists past process exit.
//!
//! Global invariants enforced:
//! - Deterministic classification and axis ordering
//! - Calendar months compare chronologically, never lexicographically
//! - Undefined measures degrade to a neutral category instead of failing

pub mod config;
pub mod error;
pub mod html;
pub mod kpi;
pub mod period;
pub mod pivot;
pub mod render;
pub mod reports;
pub mod row;
pub mod source;
pub mod status;
pub mod value;

// Classification
pub use kpi::{classify, classify_name, classify_with, Kpi, KpiThresholds, TrafficLight};
pub use status::{ReorderPolicy, StockStatus};

// Reshaping
pub use pivot::{pivot, Aggregator, CategoryMatrix, Matrix, PivotError};

// Data model
pub use period::Period;
pub use row::RowSet;
pub use value::{Key, Value};

// Data source
pub use config::{Driver, SourceConfig, SourceOptions};
pub use error::{ConfigError, SourceError};
pub use source::DataSource;

// Rendering
pub use render::{render_json, Legend, LegendEntry};

/// Crate version reported in rendered artifacts.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
