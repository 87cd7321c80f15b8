//! Environment configuration.

use record_types::SiteId;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be an integer, got {value:?}")]
    NotAnInteger { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `RECORD_SITE_ID`; site stamped on newly created records.
    pub site_id: SiteId,
    /// `RECORD_DB_PATH`; SQLite file. Unset uses the in-memory store.
    pub db_path: Option<PathBuf>,
    /// `RECORD_LOG_PATH`; JSONL activity log. Unset uses the in-memory log.
    pub log_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let site_id = match lookup("RECORD_SITE_ID") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|_| ConfigError::NotAnInteger {
                    key: "RECORD_SITE_ID",
                    value: raw.clone(),
                })?,
            None => 1,
        };
        let path = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        };
        Ok(Self {
            site_id: SiteId(site_id),
            db_path: path("RECORD_DB_PATH"),
            log_path: path("RECORD_LOG_PATH"),
        })
    }
}
