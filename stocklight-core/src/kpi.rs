//! Traffic-light KPI classification
//!
//! Maps a numeric KPI value to a green/yellow/red light through a
//! data-driven threshold table - one generic routine instead of a cascade of
//! per-KPI conditionals.
//!
//! Global invariants enforced:
//! - The three threshold intervals partition the real line per KPI
//!   (every finite value lands in exactly one light)
//! - Deterministic, pure, no side effects
//! - Undefined inputs (NaN from guarded division, unknown KPI names)
//!   degrade to the neutral light rather than failing

use serde::{Deserialize, Serialize};

/// KPI identifiers from the monthly performance query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kpi {
    AverageStockLevel,
    StockoutRate,
    InventoryTurnover,
    SellThroughRate,
}

/// Traffic-light category.
///
/// Rank is the worst-first ordinal (red = 0) used for sorting; the neutral
/// gray light sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLight {
    Red,
    Yellow,
    Green,
    Gray,
}

/// Which direction of the value range is favorable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Favor {
    HigherIsBetter,
    LowerIsBetter,
}

/// Ordered threshold pair for one KPI.
///
/// For `HigherIsBetter`: `> green_cut` is green, `>= yellow_cut` is yellow,
/// below that is red. For `LowerIsBetter` the comparisons flip:
/// `< green_cut` green, `<= yellow_cut` yellow, above that red.
/// Boundary values are inclusive on the yellow side in both directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiThresholds {
    pub favor: Favor,
    pub green_cut: f64,
    pub yellow_cut: f64,
}

impl Kpi {
    /// All KPIs in dashboard display order.
    pub const ALL: [Kpi; 4] = [
        Kpi::AverageStockLevel,
        Kpi::StockoutRate,
        Kpi::InventoryTurnover,
        Kpi::SellThroughRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kpi::AverageStockLevel => "average_stock_level",
            Kpi::StockoutRate => "stockout_rate",
            Kpi::InventoryTurnover => "inventory_turnover",
            Kpi::SellThroughRate => "sell_through_rate",
        }
    }

    /// Human-readable panel title.
    pub fn title(&self) -> &'static str {
        match self {
            Kpi::AverageStockLevel => "Average Stock Level",
            Kpi::StockoutRate => "Stockout Rate",
            Kpi::InventoryTurnover => "Inventory Turnover",
            Kpi::SellThroughRate => "Sell-Through Rate",
        }
    }

    /// Parse a snake_case KPI name. Unknown names yield `None`; callers
    /// classify those to the neutral light instead of failing.
    pub fn parse(name: &str) -> Option<Kpi> {
        Kpi::ALL.iter().copied().find(|k| k.as_str() == name)
    }

    /// Fixed threshold table for this KPI.
    pub fn thresholds(&self) -> KpiThresholds {
        match self {
            Kpi::AverageStockLevel => KpiThresholds {
                favor: Favor::HigherIsBetter,
                green_cut: 100.0,
                yellow_cut: 70.0,
            },
            Kpi::StockoutRate => KpiThresholds {
                favor: Favor::LowerIsBetter,
                green_cut: 0.10,
                yellow_cut: 0.30,
            },
            Kpi::InventoryTurnover => KpiThresholds {
                favor: Favor::HigherIsBetter,
                green_cut: 2.5,
                yellow_cut: 1.5,
            },
            Kpi::SellThroughRate => KpiThresholds {
                favor: Favor::HigherIsBetter,
                green_cut: 70.0,
                yellow_cut: 50.0,
            },
        }
    }
}

impl TrafficLight {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficLight::Red => "red",
            TrafficLight::Yellow => "yellow",
            TrafficLight::Green => "green",
            TrafficLight::Gray => "gray",
        }
    }

    /// Fixed display color.
    pub fn color(&self) -> &'static str {
        match self {
            TrafficLight::Red => "#f44336",
            TrafficLight::Yellow => "#ffeb3b",
            TrafficLight::Green => "#4caf50",
            TrafficLight::Gray => "#888888",
        }
    }

    /// Worst-first ordinal rank (red = 0, gray sorts last).
    pub fn rank(&self) -> u8 {
        match self {
            TrafficLight::Red => 0,
            TrafficLight::Yellow => 1,
            TrafficLight::Green => 2,
            TrafficLight::Gray => 3,
        }
    }
}

/// Classify a KPI value with the fixed threshold table.
pub fn classify(value: f64, kpi: Kpi) -> TrafficLight {
    classify_with(value, &kpi.thresholds())
}

/// Classify a KPI value with explicit thresholds.
///
/// NaN (a measure left undefined by a guarded division upstream) degrades to
/// the neutral light so downstream rendering always has a defined label.
pub fn classify_with(value: f64, thresholds: &KpiThresholds) -> TrafficLight {
    if value.is_nan() {
        return TrafficLight::Gray;
    }
    match thresholds.favor {
        Favor::HigherIsBetter => {
            if value > thresholds.green_cut {
                TrafficLight::Green
            } else if value >= thresholds.yellow_cut {
                TrafficLight::Yellow
            } else {
                TrafficLight::Red
            }
        }
        Favor::LowerIsBetter => {
            if value < thresholds.green_cut {
                TrafficLight::Green
            } else if value <= thresholds.yellow_cut {
                TrafficLight::Yellow
            } else {
                TrafficLight::Red
            }
        }
    }
}

/// Classify by KPI name. Unknown names degrade to the neutral light.
pub fn classify_name(name: &str, value: f64) -> TrafficLight {
    match Kpi::parse(name) {
        Some(kpi) => classify(value, kpi),
        None => {
            tracing::warn!(kpi = name, "unrecognized KPI name, classifying as gray");
            TrafficLight::Gray
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_stock_level_bands() {
        assert_eq!(classify(120.0, Kpi::AverageStockLevel), TrafficLight::Green);
        assert_eq!(classify(100.0, Kpi::AverageStockLevel), TrafficLight::Yellow);
        assert_eq!(classify(85.0, Kpi::AverageStockLevel), TrafficLight::Yellow);
        assert_eq!(classify(60.0, Kpi::AverageStockLevel), TrafficLight::Red);
    }

    #[test]
    fn test_stockout_rate_bands() {
        assert_eq!(classify(0.05, Kpi::StockoutRate), TrafficLight::Green);
        assert_eq!(classify(0.10, Kpi::StockoutRate), TrafficLight::Yellow);
        assert_eq!(classify(0.20, Kpi::StockoutRate), TrafficLight::Yellow);
        assert_eq!(classify(0.35, Kpi::StockoutRate), TrafficLight::Red);
    }

    #[test]
    fn test_inventory_turnover_bands() {
        assert_eq!(classify(3.0, Kpi::InventoryTurnover), TrafficLight::Green);
        assert_eq!(classify(2.5, Kpi::InventoryTurnover), TrafficLight::Yellow);
        assert_eq!(classify(1.5, Kpi::InventoryTurnover), TrafficLight::Yellow);
        assert_eq!(classify(1.0, Kpi::InventoryTurnover), TrafficLight::Red);
    }

    #[test]
    fn test_sell_through_rate_bands() {
        assert_eq!(classify(80.0, Kpi::SellThroughRate), TrafficLight::Green);
        assert_eq!(classify(70.0, Kpi::SellThroughRate), TrafficLight::Yellow);
        assert_eq!(classify(50.0, Kpi::SellThroughRate), TrafficLight::Yellow);
        assert_eq!(classify(40.0, Kpi::SellThroughRate), TrafficLight::Red);
    }

    #[test]
    fn test_boundaries_are_inclusive_on_yellow() {
        // Tabulated boundary values land in yellow, not red
        assert_eq!(classify(70.0, Kpi::AverageStockLevel), TrafficLight::Yellow);
        assert_eq!(classify(0.30, Kpi::StockoutRate), TrafficLight::Yellow);
        assert_eq!(classify(50.0, Kpi::SellThroughRate), TrafficLight::Yellow);
    }

    #[test]
    fn test_partition_has_no_gaps() {
        // A sweep of values per KPI always yields exactly one colored light
        for kpi in Kpi::ALL {
            for i in -500..=500 {
                let value = i as f64 / 100.0;
                let light = classify(value, kpi);
                assert_ne!(light, TrafficLight::Gray, "{kpi:?} at {value}");
            }
        }
    }

    #[test]
    fn test_nan_degrades_to_gray() {
        for kpi in Kpi::ALL {
            assert_eq!(classify(f64::NAN, kpi), TrafficLight::Gray);
        }
    }

    #[test]
    fn test_unknown_kpi_name_degrades_to_gray() {
        assert_eq!(classify_name("profit_margin", 1.0), TrafficLight::Gray);
        assert_eq!(classify_name("stockout_rate", 0.05), TrafficLight::Green);
    }

    #[test]
    fn test_kpi_name_round_trip() {
        for kpi in Kpi::ALL {
            assert_eq!(Kpi::parse(kpi.as_str()), Some(kpi));
        }
    }
}
