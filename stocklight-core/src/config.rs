//! Connection configuration
//!
//! One explicit configuration struct handed to the data source instead of
//! ad-hoc environment lookups at call sites. Recognized options are
//! `{driver, host, port, database, user, password}`; resolution fails fast
//! when a required option is absent, before any connection is attempted.
//!
//! Search order:
//! 1. Explicit path (`--config` CLI flag)
//! 2. `stocklight.config.json` in the working directory
//! 3. `STOCKLIGHT_DB_*` environment variables
//!
//! Environment variables fill in any option the file leaves unset.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw connection options as read from a config file or the environment.
/// All fields optional here; `resolve` enforces what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceOptions {
    #[serde(default)]
    pub driver: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Supported database drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    Sqlite,
}

/// Validated connection configuration.
///
/// For SQLite, `database` is the file path; host, port, user, and password
/// are accepted for option-surface compatibility but unused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub driver: Driver,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "stocklight.config.json";

impl SourceOptions {
    /// Load options from the standard search order, then fill gaps from the
    /// environment.
    pub fn load(explicit: Option<&Path>) -> Result<SourceOptions, ConfigError> {
        let from_file = match explicit {
            Some(path) => Some(SourceOptions::from_file(path)?),
            None => {
                let default = Path::new(CONFIG_FILE_NAME);
                if default.exists() {
                    Some(SourceOptions::from_file(default)?)
                } else {
                    None
                }
            }
        };
        Ok(from_file.unwrap_or_default().merged_with_env())
    }

    /// Read options from a JSON config file.
    pub fn from_file(path: &Path) -> Result<SourceOptions, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Unparsable {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Read options from `STOCKLIGHT_DB_*` environment variables.
    pub fn from_env() -> SourceOptions {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        SourceOptions {
            driver: var("STOCKLIGHT_DB_DRIVER"),
            host: var("STOCKLIGHT_DB_HOST"),
            port: var("STOCKLIGHT_DB_PORT").and_then(|p| p.parse().ok()),
            database: var("STOCKLIGHT_DB_DATABASE"),
            user: var("STOCKLIGHT_DB_USER"),
            password: var("STOCKLIGHT_DB_PASSWORD"),
        }
    }

    /// Fill unset options from the environment. File values win.
    pub fn merged_with_env(self) -> SourceOptions {
        let env = SourceOptions::from_env();
        SourceOptions {
            driver: self.driver.or(env.driver),
            host: self.host.or(env.host),
            port: self.port.or(env.port),
            database: self.database.or(env.database),
            user: self.user.or(env.user),
            password: self.password.or(env.password),
        }
    }

    /// Validate into a usable configuration.
    ///
    /// Fail-fast rules: `driver` and `database` are required; an
    /// unrecognized driver name is rejected here, never at connect time.
    pub fn resolve(self) -> Result<SourceConfig, ConfigError> {
        let driver_name = self
            .driver
            .ok_or(ConfigError::MissingOption { option: "driver" })?;
        let driver = match driver_name.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Driver::Sqlite,
            _ => {
                return Err(ConfigError::UnsupportedDriver {
                    driver: driver_name,
                })
            }
        };
        let database = self
            .database
            .filter(|d| !d.is_empty())
            .ok_or(ConfigError::MissingOption { option: "database" })?;

        Ok(SourceConfig {
            driver,
            host: self.host,
            port: self.port,
            database,
            user: self.user,
            password: self.password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn options(driver: Option<&str>, database: Option<&str>) -> SourceOptions {
        SourceOptions {
            driver: driver.map(String::from),
            database: database.map(String::from),
            ..SourceOptions::default()
        }
    }

    #[test]
    fn test_resolve_requires_driver() {
        let err = options(None, Some("inventory.db")).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingOption { option: "driver" }));
    }

    #[test]
    fn test_resolve_requires_database() {
        let err = options(Some("sqlite"), None).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingOption { option: "database" }));

        let err = options(Some("sqlite"), Some("")).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingOption { option: "database" }));
    }

    #[test]
    fn test_resolve_rejects_unknown_driver() {
        let err = options(Some("mysql"), Some("inventory")).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedDriver { .. }));
    }

    #[test]
    fn test_resolve_accepts_sqlite() {
        let config = options(Some("SQLite"), Some("inventory.db")).resolve().unwrap();
        assert_eq!(config.driver, Driver::Sqlite);
        assert_eq!(config.database, "inventory.db");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"driver": "sqlite", "database": "inventory.db", "host": "localhost"}}"#
        )
        .unwrap();

        let options = SourceOptions::from_file(file.path()).unwrap();
        assert_eq!(options.driver.as_deref(), Some("sqlite"));
        assert_eq!(options.database.as_deref(), Some("inventory.db"));
        assert_eq!(options.host.as_deref(), Some("localhost"));
        assert_eq!(options.port, None);
    }

    #[test]
    fn test_from_file_rejects_unknown_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"driver": "sqlite", "dbname": "inventory.db"}}"#).unwrap();
        let err = SourceOptions::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Unparsable { .. }));
    }
}
