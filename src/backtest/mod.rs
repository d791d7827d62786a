//! Backtesting module
//!
//! Steps a Kandel strategy through an aligned price/volatility series and
//! sweeps many independent samples in parallel.

mod analytics;
mod replay;
mod simulator;
mod sweep;

pub use analytics::{
    performance_rows, resample, Distribution, PerformanceRow, RunReport, SampleSummary,
    SweepSummary,
};
pub use replay::{BacktestRun, StepRecord};
pub use simulator::KandelBacktester;
pub use sweep::{run_sweep, SweepOutcome};

use crate::data::SeriesError;
use crate::strategy::StrategyError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backtest configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Record a ladder snapshot on every step
    #[serde(default)]
    pub record_history: bool,
    /// Worker threads for sweeps, 0 for the rayon default
    #[serde(default)]
    pub workers: usize,
    /// Keep the last row of every bucket of this many steps in reports, 0 keeps all
    #[serde(default)]
    pub resample_every: usize,
}

/// Backtest errors
#[derive(Debug, Error)]
pub enum BacktestError {
    /// Strategy could not be deployed
    #[error(transparent)]
    Strategy(#[from] StrategyError),
    /// Strategy failed while processing a series row
    #[error(
        "Step {index} at {timestamp} failed (price {price}, window vol {window_vol}, exit vol {exit_vol}): {source}"
    )]
    Step {
        index: usize,
        timestamp: DateTime<Utc>,
        price: f64,
        window_vol: f64,
        exit_vol: f64,
        #[source]
        source: StrategyError,
    },
    /// Input series is unusable
    #[error(transparent)]
    Series(#[from] SeriesError),
    /// Run was cancelled before `step`
    #[error("Backtest cancelled before step {step}")]
    Cancelled { step: usize },
    /// Sweep worker pool could not be created
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
