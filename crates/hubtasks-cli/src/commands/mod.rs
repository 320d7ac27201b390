pub mod config;
pub mod evaluate;
pub mod recurrence;

use std::path::Path;

use chrono::{DateTime, Utc};
use hubtasks_core::{Config, CoreError};

/// Load the config from an explicit path or the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, CoreError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// clap value parser for RFC 3339 timestamps.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp '{raw}': {e}"))
}
