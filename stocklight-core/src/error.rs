//! Error types for the data source and configuration layers
//!
//! Every failure is surfaced immediately to the invoking process - no retry
//! policy, no log-and-continue - consistent with single-shot batch semantics.
//! The one exception is classification of undefined values, which degrades
//! to a neutral category in `kpi::classify` rather than erroring here.

use thiserror::Error;

/// Data source errors. A connection failure is terminal for the run.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("database connection failed: {0}")]
    ConnectionFailure(String),

    #[error("query failed: {0}")]
    QueryFailure(String),

    #[error("unsupported column type in result set: {column} ({type_name})")]
    UnsupportedColumnType { column: String, type_name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration errors, reported before any connection attempt.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required connection option: {option}")]
    MissingOption { option: &'static str },

    #[error("unsupported driver: {driver} (supported: sqlite)")]
    UnsupportedDriver { driver: String },

    #[error("invalid value for {option}: {message}")]
    InvalidOption { option: &'static str, message: String },

    #[error("failed to read config file {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("failed to parse config file {path}: {message}")]
    Unparsable { path: String, message: String },
}

impl From<rusqlite::Error> for SourceError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, Some(msg)) => {
                if code.code == rusqlite::ErrorCode::CannotOpen {
                    SourceError::ConnectionFailure(msg)
                } else {
                    SourceError::QueryFailure(msg)
                }
            }
            other => SourceError::QueryFailure(other.to_string()),
        }
    }
}

/// Result alias for data source operations.
pub type SourceResult<T> = Result<T, SourceError>;
