//! Kandel strategy module
//!
//! Owns one order ladder plus base/quote inventory, sizes the tick grid from
//! volatility and drives rebalances and volatility-gated exits.

mod grid;
mod kandel;
mod types;

pub use grid::{build_ticks_grid, range_multiplier};
pub use kandel::{Kandel, StepOutcome};
pub use types::{KandelConfig, KandelState, StrategyError};

#[cfg(test)]
pub(crate) use types::test_config;
