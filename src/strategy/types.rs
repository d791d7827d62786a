//! Kandel configuration and state types

use crate::book::LadderError;
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Strategy parameters, immutable for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KandelConfig {
    /// Capital deployed at start, in quote units
    pub initial_capital: f64,

    /// Decimal offset between base and quote for tick math
    #[serde(default)]
    pub decimals_diff: i32,

    /// Share of the gain since the last rebalance taken as fee
    #[serde(default = "default_performance_fees")]
    pub performance_fees: f64,

    /// Scales window volatility into the grid range; 0 selects `range_mult`
    pub vol_mult: f64,

    /// Static range multiplier used when `vol_mult` is 0
    #[serde(default = "default_range_mult")]
    pub range_mult: f64,

    /// Grid points on each side of the price
    pub n_points: usize,

    /// Grid ticks skipped when replenishing. Accepted, but the ladder always
    /// replenishes one tick over.
    #[serde(default = "default_step_size")]
    pub step_size: usize,

    /// Rebalance cadence in series steps
    pub window: usize,

    /// Exit volatility above which the strategy withdraws
    pub exit_vol_threshold: f64,

    /// Price move since the last rebalance that skews the exit inventory
    pub asymmetric_exit_threshold: f64,
}

fn default_performance_fees() -> f64 {
    0.1
}
fn default_range_mult() -> f64 {
    1.05
}
fn default_step_size() -> usize {
    1
}

impl KandelConfig {
    /// Reject out-of-domain parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        let floats = [
            ("kandel.initial_capital", self.initial_capital),
            ("kandel.performance_fees", self.performance_fees),
            ("kandel.vol_mult", self.vol_mult),
            ("kandel.range_mult", self.range_mult),
            ("kandel.exit_vol_threshold", self.exit_vol_threshold),
            ("kandel.asymmetric_exit_threshold", self.asymmetric_exit_threshold),
        ];
        for (field, value) in floats {
            if !value.is_finite() {
                return Err(ConfigError::invalid(field, value, "must be finite"));
            }
        }

        if self.initial_capital <= 0.0 {
            return Err(ConfigError::invalid(
                "kandel.initial_capital",
                self.initial_capital,
                "must be positive",
            ));
        }
        if !(0.0..1.0).contains(&self.performance_fees) {
            return Err(ConfigError::invalid(
                "kandel.performance_fees",
                self.performance_fees,
                "must be in [0, 1)",
            ));
        }
        if self.vol_mult < 0.0 {
            return Err(ConfigError::invalid(
                "kandel.vol_mult",
                self.vol_mult,
                "must not be negative",
            ));
        }
        if self.vol_mult == 0.0 && self.range_mult <= 1.0 {
            return Err(ConfigError::invalid(
                "kandel.range_mult",
                self.range_mult,
                "must be greater than 1 when vol_mult is 0",
            ));
        }
        if self.n_points == 0 {
            return Err(ConfigError::invalid("kandel.n_points", 0, "must be positive"));
        }
        if self.step_size == 0 {
            return Err(ConfigError::invalid("kandel.step_size", 0, "must be positive"));
        }
        if self.window == 0 {
            return Err(ConfigError::invalid("kandel.window", 0, "must be positive"));
        }
        if self.window < 2 && self.vol_mult != 0.0 {
            return Err(ConfigError::invalid(
                "kandel.window",
                self.window,
                "must be at least 2 to estimate volatility when vol_mult is not 0",
            ));
        }
        if self.exit_vol_threshold < 0.0 {
            return Err(ConfigError::invalid(
                "kandel.exit_vol_threshold",
                self.exit_vol_threshold,
                "must not be negative",
            ));
        }
        if self.asymmetric_exit_threshold < 0.0 {
            return Err(ConfigError::invalid(
                "kandel.asymmetric_exit_threshold",
                self.asymmetric_exit_threshold,
                "must not be negative",
            ));
        }

        Ok(())
    }
}

/// Quoting state of the strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KandelState {
    /// Two-sided ladder is live
    Active,
    /// Flat or skewed inventory, no resting orders
    Exited,
}

/// Strategy errors
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Invalid strategy configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Ladder could not be built or replenished
    #[error(transparent)]
    Ladder(#[from] LadderError),
    /// Spot prices must be strictly positive
    #[error("Spot price must be positive, got {0}")]
    NonPositiveSpot(f64),
}

#[cfg(test)]
pub(crate) fn test_config() -> KandelConfig {
    KandelConfig {
        initial_capital: 100_000.0,
        decimals_diff: 0,
        performance_fees: 0.1,
        vol_mult: 1.6,
        range_mult: 1.05,
        n_points: 2,
        step_size: 1,
        window: 24,
        exit_vol_threshold: 0.03,
        asymmetric_exit_threshold: 0.05,
    }
}
