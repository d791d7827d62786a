//! Volatility model module
//!
//! Realized volatility series feeding the grid range and the exit gate

mod volatility;

pub use volatility::{rolling_volatility, VolatilityEstimator};
