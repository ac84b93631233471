//! Database configuration.
//!
//! Every field has a serde default, so a partial document such as
//! `{"storage_mode": "multi_table"}` is a complete configuration.

use serde::{Deserialize, Serialize};

/// Where object rows live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageMode {
    /// Every type shares the `objects` table.
    #[default]
    SingleTable,
    /// One object table per registered type, named after the type.
    MultiTable,
}

/// Minimum level for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    #[default]
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub storage_mode: StorageMode,
    pub minimum_log_level: LogLevel,
    /// Install a global `tracing` subscriber when the database is built.
    pub install_log_subscriber: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            storage_mode: StorageMode::SingleTable,
            minimum_log_level: LogLevel::Error,
            install_log_subscriber: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DatabaseConfig::default();
        assert_eq!(config.storage_mode, StorageMode::SingleTable);
        assert_eq!(config.minimum_log_level, LogLevel::Error);
        assert!(config.install_log_subscriber);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: DatabaseConfig =
            serde_json::from_str(r#"{"storage_mode": "multi_table", "minimum_log_level": "debug"}"#)
                .unwrap();
        assert_eq!(config.storage_mode, StorageMode::MultiTable);
        assert_eq!(config.minimum_log_level, LogLevel::Debug);
        assert!(config.install_log_subscriber);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
    }
}
