//! Per-(store, product) stock-status classification
//!
//! Two distinct reorder policies exist in the source data and stay distinct:
//! one compares inventory against the open order quantity, the other against
//! fixed absolute cutoffs. Which applies is determined by the report, not
//! merged here.
//!
//! Global invariants enforced:
//! - Rank, label, and color are total over the closed status set
//! - Rank is worst-first (Out of Stock = 0) so a min-rank aggregation
//!   picks the worst status

use serde::{Deserialize, Serialize};

/// Stock status bucket, worst first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    BelowReorder,
    NearReorder,
    Adequate,
}

/// Classification policy selecting the threshold source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReorderPolicy {
    /// Compare inventory against the outstanding order quantity
    /// (below half the order, below the order, at or above it).
    OrderedRatio,
    /// Fixed absolute cutoffs: 0, <= 10, <= 20, above.
    AbsoluteLevels,
}

impl StockStatus {
    /// All statuses in rank order (worst first). Also the fixed display
    /// order for stacked bars and legends.
    pub const ALL: [StockStatus; 4] = [
        StockStatus::OutOfStock,
        StockStatus::BelowReorder,
        StockStatus::NearReorder,
        StockStatus::Adequate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "Out of Stock",
            StockStatus::BelowReorder => "Below Reorder",
            StockStatus::NearReorder => "Near Reorder",
            StockStatus::Adequate => "Adequate",
        }
    }

    /// Fixed display color.
    pub fn color(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "#d62728",
            StockStatus::BelowReorder => "#ff7f0e",
            StockStatus::NearReorder => "#ffdf00",
            StockStatus::Adequate => "#2ca02c",
        }
    }

    /// Worst-first ordinal rank (Out of Stock = 0).
    pub fn rank(&self) -> u8 {
        match self {
            StockStatus::OutOfStock => 0,
            StockStatus::BelowReorder => 1,
            StockStatus::NearReorder => 2,
            StockStatus::Adequate => 3,
        }
    }

    /// Inverse of [`StockStatus::rank`].
    pub fn from_rank(rank: u8) -> Option<StockStatus> {
        match rank {
            0 => Some(StockStatus::OutOfStock),
            1 => Some(StockStatus::BelowReorder),
            2 => Some(StockStatus::NearReorder),
            3 => Some(StockStatus::Adequate),
            _ => None,
        }
    }
}

impl ReorderPolicy {
    /// Classify one (inventory_level, units_ordered) observation.
    ///
    /// Zero inventory is always Out of Stock, regardless of policy and of
    /// the order quantity. Under `OrderedRatio` a zero order quantity with
    /// stock on hand is Adequate by convention; the rule order never
    /// divides, so no guard is needed.
    pub fn classify(&self, inventory_level: f64, units_ordered: f64) -> StockStatus {
        if inventory_level == 0.0 {
            return StockStatus::OutOfStock;
        }
        match self {
            ReorderPolicy::OrderedRatio => {
                if inventory_level < units_ordered * 0.5 {
                    StockStatus::BelowReorder
                } else if inventory_level < units_ordered {
                    StockStatus::NearReorder
                } else {
                    StockStatus::Adequate
                }
            }
            ReorderPolicy::AbsoluteLevels => {
                if inventory_level <= 10.0 {
                    StockStatus::BelowReorder
                } else if inventory_level <= 20.0 {
                    StockStatus::NearReorder
                } else {
                    StockStatus::Adequate
                }
            }
        }
    }
}
