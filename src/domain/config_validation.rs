//! Configuration validation.
//!
//! Reads and checks the `[series]` and `[signals]` sections before any data
//! is loaded.

use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::error::BarlensError;
use crate::ports::config_port::ConfigPort;

/// Validated `[series]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesConfig {
    pub name: String,
    pub base_time: DateTime<Utc>,
    pub data: PathBuf,
    /// Overrides the period inferred from the data file.
    pub time_period: Option<TimeDelta>,
}

/// Validated `[signals]` section: SMA window lengths, `fast < slow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalsConfig {
    pub fast: usize,
    pub slow: usize,
}

pub fn validate_series_config(config: &dyn ConfigPort) -> Result<SeriesConfig, BarlensError> {
    let name = required(config, "series", "name")?;
    let raw_base = required(config, "series", "base_time")?;
    let base_time = DateTime::parse_from_rfc3339(&raw_base)
        .map_err(|e| invalid("series", "base_time", format!("expected RFC 3339, {e}")))?
        .with_timezone(&Utc);
    let data = PathBuf::from(required(config, "series", "data")?);

    let time_period = match config.get_int("series", "period_secs", 0) {
        0 if config.get_string("series", "period_secs").is_none() => None,
        secs if secs > 0 => Some(TimeDelta::seconds(secs)),
        _ => {
            return Err(invalid(
                "series",
                "period_secs",
                "period_secs must be a positive integer",
            ));
        }
    };

    Ok(SeriesConfig {
        name,
        base_time,
        data,
        time_period,
    })
}

pub fn validate_signals_config(config: &dyn ConfigPort) -> Result<SignalsConfig, BarlensError> {
    let fast = window(config, "fast")?;
    let slow = window(config, "slow")?;
    if fast >= slow {
        return Err(invalid(
            "signals",
            "fast",
            format!("fast ({fast}) must be shorter than slow ({slow})"),
        ));
    }
    Ok(SignalsConfig { fast, slow })
}

fn window(config: &dyn ConfigPort, key: &str) -> Result<usize, BarlensError> {
    required(config, "signals", key)?;
    let value = config.get_int("signals", key, 0);
    if value <= 0 {
        return Err(invalid(
            "signals",
            key,
            format!("{key} must be a positive integer"),
        ));
    }
    usize::try_from(value).map_err(|e| invalid("signals", key, e.to_string()))
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, BarlensError> {
    match config.get_string(section, key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(BarlensError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> BarlensError {
    BarlensError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}
