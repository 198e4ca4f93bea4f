//! Calendar period (year + month) handling
//!
//! The source data labels months as `YYYY-MM` strings. Sorting those labels
//! lexicographically is only correct within a single calendar year, so every
//! ordering and windowing operation in this crate goes through [`Period`],
//! which compares chronologically.
//!
//! Global invariants enforced:
//! - Chronological ordering (year first, then month)
//! - `Display` round-trips `parse` exactly (`YYYY-MM`, zero-padded)

use chrono::{Datelike, NaiveDate};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A calendar month, ordered chronologically.
///
/// Field order matters: the derived `Ord` compares `year` before `month`,
/// which is exactly chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

/// Error parsing a `YYYY-MM` period label
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid period label {label:?}: expected YYYY-MM")]
pub struct ParsePeriodError {
    pub label: String,
}

impl Period {
    /// Create a period, validating the month range.
    pub fn new(year: i32, month: u32) -> Option<Period> {
        if (1..=12).contains(&month) {
            Some(Period { year, month })
        } else {
            None
        }
    }

    /// Period containing a calendar date.
    pub fn from_date(date: NaiveDate) -> Period {
        Period {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Period, ParsePeriodError> {
        let err = || ParsePeriodError {
            label: s.to_string(),
        };

        // Strict YYYY-MM: 4 digits, dash, 2 digits
        let (year_part, month_part) = s.split_once('-').ok_or_else(err)?;
        if year_part.len() != 4 || month_part.len() != 2 {
            return Err(err());
        }
        let year: i32 = year_part.parse().map_err(|_| err())?;
        let month: u32 = month_part.parse().map_err(|_| err())?;
        Period::new(year, month).ok_or_else(err)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Period, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(D::Error::custom)
    }
}

/// Last `n` periods of a chronologically sorted slice.
///
/// Mirrors the "last 3 months" sparkline window in the dashboard report.
/// Returns the whole slice when it has fewer than `n` entries.
pub fn last_n(periods: &[Period], n: usize) -> &[Period] {
    if periods.len() <= n {
        periods
    } else {
        &periods[periods.len() - n..]
    }
}
