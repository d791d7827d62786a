//! Configuration types for kandel-backtest

use crate::backtest::BacktestConfig;
use crate::strategy::KandelConfig;
use crate::telemetry::LogFormat;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// Config file is not valid TOML for the schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A field is out of its domain
    #[error("Invalid {field} = {value}: {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ConfigError {
    /// Build an `Invalid` error for `field`
    pub fn invalid(field: &'static str, value: impl Display, reason: &'static str) -> Self {
        Self::Invalid {
            field,
            value: value.to_string(),
            reason,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub kandel: KandelConfig,
    #[serde(default)]
    pub backtest: BacktestConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// How the prepared series is backtested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleMode {
    /// One backtest over the whole series
    #[default]
    Single,
    /// Many fixed-length samples in parallel
    Multi,
}

/// Input data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV file with `timestamp` and `price` columns
    pub path: PathBuf,

    /// First day kept, inclusive
    #[serde(default, deserialize_with = "deserialize_day")]
    pub start: Option<NaiveDate>,

    /// Last day kept, inclusive
    #[serde(default, deserialize_with = "deserialize_day")]
    pub end: Option<NaiveDate>,

    /// Lookback of the exit volatility, in steps
    pub exit_vol_window: usize,

    #[serde(default)]
    pub mode: SampleMode,

    /// Steps per sample in multi mode
    #[serde(default = "default_sample_length")]
    pub sample_length: usize,

    /// Offset between sample start phases in multi mode
    #[serde(default = "default_sample_stride")]
    pub sample_stride: usize,
}

/// `YYYY-MM-DD`, or an RFC 3339 timestamp reduced to its UTC date
fn deserialize_day<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(day) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(Some(day));
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| Some(ts.with_timezone(&Utc).date_naive()))
        .map_err(|_| {
            serde::de::Error::custom(format!(
                "invalid date {raw:?}, expected YYYY-MM-DD or RFC 3339"
            ))
        })
}

fn default_sample_length() -> usize {
    7 * 24 * 3600
}
fn default_sample_stride() -> usize {
    24 * 3600
}

impl DataConfig {
    /// Reject out-of-domain data parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.exit_vol_window < 2 {
            return Err(ConfigError::invalid(
                "data.exit_vol_window",
                self.exit_vol_window,
                "must be at least 2 to estimate volatility",
            ));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(ConfigError::invalid(
                    "data.start",
                    start,
                    "must not be after data.end",
                ));
            }
        }
        if self.mode == SampleMode::Multi {
            if self.sample_length == 0 {
                return Err(ConfigError::invalid(
                    "data.sample_length",
                    0,
                    "must be positive",
                ));
            }
            if self.sample_stride == 0 {
                return Err(ConfigError::invalid(
                    "data.sample_stride",
                    0,
                    "must be positive",
                ));
            }
        }
        Ok(())
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.data.validate()?;
        self.kandel.validate()?;

        if self.kandel.step_size != 1 {
            tracing::warn!(
                step_size = self.kandel.step_size,
                "step_size is ignored, replenishment always moves one grid tick"
            );
        }
        Ok(())
    }
}
