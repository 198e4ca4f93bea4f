//! Cell values and pivot keys
//!
//! A [`Value`] is one cell of a query result: the stable column types the
//! data source exposes (string, integer, floating-point, date) plus NULL.
//! A [`Key`] is a categorical pivot-axis key derived from a value.
//!
//! Global invariants enforced:
//! - Values are immutable once constructed
//! - Key ordering is the natural key order (numeric ascending, text
//!   lexicographic, periods chronological)

use crate::period::Period;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One cell of a tabular query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
}

/// A categorical key on a pivot axis.
///
/// The derived `Ord` sorts each variant by its natural order; a single pivot
/// axis always holds one variant in practice.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Int(i64),
    Text(String),
    Period(Period),
}

impl Value {
    /// Numeric view of the value.
    ///
    /// Integers widen to `f64`; NULL is `None`. Text and dates have no
    /// numeric view; callers that require one surface a type mismatch.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            Value::Null | Value::Text(_) | Value::Date(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Categorical key view of the value. NULL has no key.
    ///
    /// Text that is a strict `YYYY-MM` label becomes a [`Key::Period`] so
    /// that time axes sort chronologically rather than lexicographically;
    /// dates collapse to their containing period for the same reason.
    pub fn as_key(&self) -> Option<Key> {
        match self {
            Value::Null => None,
            Value::Int(i) => Some(Key::Int(*i)),
            Value::Real(f) => Some(Key::Text(format!("{f}"))),
            Value::Text(s) => match s.parse::<Period>() {
                Ok(period) => Some(Key::Period(period)),
                Err(_) => Some(Key::Text(s.clone())),
            },
            Value::Date(d) => Some(Key::Period(Period::from_date(*d))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{d}"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Text(s) => write!(f, "{s}"),
            Key::Period(p) => write!(f, "{p}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_f64_widens_ints_and_rejects_text() {
        assert_eq!(Value::Int(42).as_f64(), Some(42.0));
        assert_eq!(Value::Real(0.3).as_f64(), Some(0.3));
        assert_eq!(Value::Null.as_f64(), None);
        assert_eq!(Value::Text("North".to_string()).as_f64(), None);
    }

    #[test]
    fn test_as_key_parses_month_labels_as_periods() {
        let key = Value::Text("2023-01".to_string()).as_key().unwrap();
        assert_eq!(key, Key::Period("2023-01".parse().unwrap()));

        // Non-period text stays text
        let key = Value::Text("North".to_string()).as_key().unwrap();
        assert_eq!(key, Key::Text("North".to_string()));
    }

    #[test]
    fn test_period_keys_sort_chronologically() {
        let dec = Value::Text("2022-12".to_string()).as_key().unwrap();
        let jan = Value::Text("2023-01".to_string()).as_key().unwrap();
        assert!(dec < jan);
    }

    #[test]
    fn test_null_has_no_key() {
        assert_eq!(Value::Null.as_key(), None);
    }
}
