//! Data source - scoped database connection and query execution
//!
//! The connection is a scoped resource: acquired once at job start, released
//! explicitly before rendering. SQL text is opaque here; the source only
//! guarantees named columns with the stable cell types in [`Value`].
//!
//! Every connection gets the same PRAGMA setup so behavior does not depend
//! on which report opened it.

use crate::config::{Driver, SourceConfig};
use crate::error::{SourceError, SourceResult};
use crate::row::RowSet;
use crate::value::Value;
use chrono::NaiveDate;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::time::Duration;

/// busy_timeout applied to every connection (milliseconds)
const BUSY_TIMEOUT_MS: u64 = 5_000;

/// Open database connection for one batch run.
#[derive(Debug)]
pub struct DataSource {
    conn: Connection,
}

impl DataSource {
    /// Connect with a validated configuration.
    ///
    /// An unreachable database is terminal: the error propagates to the
    /// caller and no partial results are produced. No retries.
    pub fn connect(config: &SourceConfig) -> SourceResult<DataSource> {
        match config.driver {
            Driver::Sqlite => {
                // Refuse to treat a missing file as an empty database;
                // Connection::open would happily create one.
                if config.database != ":memory:" && !std::path::Path::new(&config.database).exists()
                {
                    return Err(SourceError::ConnectionFailure(format!(
                        "database file not found: {}",
                        config.database
                    )));
                }
                let conn = Connection::open(&config.database)
                    .map_err(|e| SourceError::ConnectionFailure(e.to_string()))?;
                configure_connection(&conn)?;
                tracing::debug!(database = %config.database, "connected");
                Ok(DataSource { conn })
            }
        }
    }

    /// In-memory database, used by tests and fixtures.
    pub fn open_in_memory() -> SourceResult<DataSource> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SourceError::ConnectionFailure(e.to_string()))?;
        configure_connection(&conn)?;
        Ok(DataSource { conn })
    }

    /// Execute an opaque query and return its full result set.
    pub fn query(&self, sql: &str) -> SourceResult<RowSet> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut result = stmt.query([])?;
        while let Some(row) = result.next()? {
            let mut cells = Vec::with_capacity(column_count);
            for i in 0..column_count {
                cells.push(convert_cell(row.get_ref(i)?, &columns[i])?);
            }
            rows.push(cells);
        }

        Ok(RowSet::new(columns, rows))
    }

    /// Execute a batch of statements (schema setup in tests and fixtures).
    pub fn execute_batch(&self, sql: &str) -> SourceResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Release the connection explicitly.
    ///
    /// Call before handing results to a renderer; the `Drop` impl covers
    /// failure paths.
    pub fn close(self) -> SourceResult<()> {
        self.conn
            .close()
            .map_err(|(_conn, e)| SourceError::ConnectionFailure(e.to_string()))
    }
}

/// Uniform per-connection PRAGMAs (each connection needs its own).
fn configure_connection(conn: &Connection) -> SourceResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Map one result cell to a [`Value`].
///
/// SQLite stores dates as ISO-8601 text; a full `YYYY-MM-DD` value becomes
/// a typed date, anything else stays text.
fn convert_cell(cell: ValueRef<'_>, column: &str) -> SourceResult<Value> {
    match cell {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(i) => Ok(Value::Int(i)),
        ValueRef::Real(f) => Ok(Value::Real(f)),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|_| SourceError::QueryFailure(
                format!("column {column} holds non-UTF-8 text"),
            ))?;
            match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                Ok(date) => Ok(Value::Date(date)),
                Err(_) => Ok(Value::Text(text.to_string())),
            }
        }
        ValueRef::Blob(_) => Err(SourceError::UnsupportedColumnType {
            column: column.to_string(),
            type_name: "BLOB".to_string(),
        }),
    }
}
