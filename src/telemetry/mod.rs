//! Telemetry module
//!
//! Structured logging and backtest metrics

mod logging;
mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{increment_counter, set_gauge, CounterMetric, GaugeMetric};

use crate::config::TelemetryConfig;

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_logging(&config.log_level, config.log_format)
}
