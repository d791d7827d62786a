//! Data module
//!
//! Loads price history, derives the volatility series and cuts the aligned
//! input series the backtest driver consumes.

mod loader;
mod samples;
mod series;

pub use loader::{load_prices, PriceHistory};
pub use samples::{prepare_series, split_samples};
pub use series::{AlignedSeries, SeriesError, SeriesRow};

#[cfg(test)]
pub(crate) use series::hourly;
