//! Order ladder error types

use super::Side;
use thiserror::Error;

/// Structural failures of the order ladder. All of them abort the sample.
#[derive(Debug, Error, PartialEq)]
pub enum LadderError {
    /// Ladder capital must be strictly positive
    #[error("Capital must be positive, got {0}")]
    NonPositiveCapital(f64),
    /// A ladder needs at least two grid points to bound one order
    #[error("Tick grid needs at least 2 points, got {0}")]
    GridTooSmall(usize),
    /// Grid ticks must be strictly increasing
    #[error("Tick grid is not strictly increasing at index {0}")]
    GridNotIncreasing(usize),
    /// Prices must be strictly positive for tick math
    #[error("Price must be positive, got {0}")]
    NonPositivePrice(f64),
    /// A filled order does not sit on the active grid
    #[error("Tick {0} is not on the active grid")]
    TickOffGrid(i32),
    /// The dual offer of a fill would land outside the grid
    #[error("No grid tick to replenish {side:?} fill at tick {tick}")]
    ReplenishOutOfGrid { tick: i32, side: Side },
}
