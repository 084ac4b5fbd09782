//! # Application Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults (this file)                                                │
//! │  2. Config file                                                         │
//! │     ~/.config/adega-pos/adega.toml (Linux)                              │
//! │     ~/Library/Application Support/br.adega.pos/adega.toml (macOS)       │
//! │  3. Environment variables                                               │
//! │     ADEGA_DB_PATH, ADEGA_LOG, ADEGA_STORE_NAME, ADEGA_MAX_CONNECTIONS   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Config File
//! ```toml
//! store_name = "Adega do Bairro"
//! database_path = "/var/lib/adega/adega.db"
//! log_filter = "info,adega=debug"
//! max_connections = 5
//! utc_offset_minutes = -180
//! recent_sales = 5
//! ```
//!
//! Configuration is read-only after initialization.

use adega_db::DbConfig;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const CONFIG_FILE: &str = "adega.toml";
const DATABASE_FILE: &str = "adega.db";

/// Configuration load/validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    /// No platform data directory and no explicit database path.
    #[error("Could not determine app data directory")]
    NoDataDir,
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Read(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Store name (shown on the dashboard header)
    pub store_name: String,

    /// SQLite file. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,

    /// `tracing_subscriber::EnvFilter` directive. `RUST_LOG` wins if set.
    pub log_filter: String,

    /// Pool size
    pub max_connections: u32,

    /// Store's offset from UTC, in minutes. Brasília is -180.
    /// Used to compute calendar-day windows for reports.
    pub utc_offset_minutes: i32,

    /// How many of the day's sales the dashboard lists
    pub recent_sales: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            store_name: "Adega".to_string(),
            database_path: None,
            log_filter: "info,adega=debug,sqlx=warn".to_string(),
            max_connections: 5,
            utc_offset_minutes: -180,
            recent_sales: 5,
        }
    }
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Loads config or falls back to defaults (plus environment).
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            let mut config = Self::default();
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies `ADEGA_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("ADEGA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(filter) = lookup("ADEGA_LOG") {
            self.log_filter = filter;
        }

        if let Some(name) = lookup("ADEGA_STORE_NAME") {
            self.store_name = name;
        }

        if let Some(max) = lookup("ADEGA_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid ADEGA_MAX_CONNECTIONS"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }
        if self.store_offset().is_none() {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// The store's fixed UTC offset, `None` if out of range.
    pub fn store_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.checked_mul(60)?)
    }

    /// Resolves the database file, creating the data directory if needed.
    pub fn resolve_database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let dirs = directories::ProjectDirs::from("br", "adega", "pos")
            .ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join(DATABASE_FILE))
    }

    /// Database settings derived from this config.
    pub fn db_config(&self) -> Result<DbConfig, ConfigError> {
        let path = self.resolve_database_path()?;
        Ok(DbConfig::new(path).max_connections(self.max_connections))
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("br", "adega", "pos")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            store_name = "Adega do Bairro"
            utc_offset_minutes = -240
            "#,
        )
        .unwrap();
        assert_eq!(config.store_name, "Adega do Bairro");
        assert_eq!(config.max_connections, 5);
        assert_eq!(
            config.store_offset().unwrap().local_minus_utc(),
            -240 * 60
        );
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("ADEGA_DB_PATH", "/tmp/test.db"),
            ("ADEGA_STORE_NAME", "Loja 2"),
            ("ADEGA_MAX_CONNECTIONS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/test.db")));
        assert_eq!(config.store_name, "Loja 2");
        // invalid value ignored
        assert_eq!(config.max_connections, 5);
        assert_eq!(
            config.resolve_database_path().unwrap(),
            PathBuf::from("/tmp/test.db")
        );
    }

    #[test]
    fn test_validate() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.max_connections = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.max_connections = 1;
        config.utc_offset_minutes = 24 * 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_toml() {
        assert!(toml::from_str::<AppConfig>("max_connections = \"five\"").is_err());
    }
}
