//! Time-aligned price and volatility series

use chrono::{DateTime, Duration, Utc};
use std::ops::Range;
use thiserror::Error;

/// Input series errors
#[derive(Debug, Error)]
pub enum SeriesError {
    /// Columns have different lengths
    #[error("Series lengths differ: {timestamps} timestamps, {prices} prices, {window_vol} window vols, {exit_vol} exit vols")]
    LengthMismatch {
        timestamps: usize,
        prices: usize,
        window_vol: usize,
        exit_vol: usize,
    },
    /// No rows
    #[error("Series is empty")]
    Empty,
    /// Timestamps must strictly increase
    #[error("Timestamp at index {index} does not increase")]
    NonIncreasing { index: usize },
    /// Timestamps must be evenly spaced
    #[error("Gap at index {index}: expected step {expected}, found {found}")]
    Gap {
        index: usize,
        expected: Duration,
        found: Duration,
    },
    /// Prices must be strictly positive
    #[error("Price at index {index} must be positive, got {price}")]
    NonPositivePrice { index: usize, price: f64 },
    /// Volatility must be finite and non-negative
    #[error("Volatility at index {index} is invalid: {value}")]
    InvalidVolatility { index: usize, value: f64 },
    /// Timestamp cannot be represented
    #[error("Timestamp {value} at row {index} is out of range")]
    InvalidTimestamp { index: usize, value: i64 },
    /// Slice bounds exceed the series
    #[error("Range {start}..{end} is out of bounds for {len} rows")]
    OutOfRange { start: usize, end: usize, len: usize },
    /// Malformed CSV input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One aligned observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesRow {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub window_vol: f64,
    pub exit_vol: f64,
}

/// Price, window volatility and exit volatility sharing one gap-free time index
#[derive(Debug, Clone)]
pub struct AlignedSeries {
    timestamps: Vec<DateTime<Utc>>,
    prices: Vec<f64>,
    window_vol: Vec<f64>,
    exit_vol: Vec<f64>,
}

impl AlignedSeries {
    /// Validate and build an aligned series
    pub fn new(
        timestamps: Vec<DateTime<Utc>>,
        prices: Vec<f64>,
        window_vol: Vec<f64>,
        exit_vol: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        let len = timestamps.len();
        if prices.len() != len || window_vol.len() != len || exit_vol.len() != len {
            return Err(SeriesError::LengthMismatch {
                timestamps: len,
                prices: prices.len(),
                window_vol: window_vol.len(),
                exit_vol: exit_vol.len(),
            });
        }
        if len == 0 {
            return Err(SeriesError::Empty);
        }

        if len > 1 {
            let expected = timestamps[1] - timestamps[0];
            for (i, pair) in timestamps.windows(2).enumerate() {
                let found = pair[1] - pair[0];
                if found <= Duration::zero() {
                    return Err(SeriesError::NonIncreasing { index: i + 1 });
                }
                if found != expected {
                    return Err(SeriesError::Gap {
                        index: i + 1,
                        expected,
                        found,
                    });
                }
            }
        }

        if let Some(index) = prices.iter().position(|p| !(*p > 0.0) || !p.is_finite()) {
            return Err(SeriesError::NonPositivePrice {
                index,
                price: prices[index],
            });
        }
        for vols in [&window_vol, &exit_vol] {
            if let Some(index) = vols.iter().position(|v| !(*v >= 0.0) || !v.is_finite()) {
                return Err(SeriesError::InvalidVolatility {
                    index,
                    value: vols[index],
                });
            }
        }

        Ok(Self {
            timestamps,
            prices,
            window_vol,
            exit_vol,
        })
    }

    /// Number of rows, never zero
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Always false for a validated series
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Row timestamps
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Observed prices
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Volatility over the rebalance window
    pub fn window_vol(&self) -> &[f64] {
        &self.window_vol
    }

    /// Volatility over the exit window
    pub fn exit_vol(&self) -> &[f64] {
        &self.exit_vol
    }

    /// Row at `index`
    pub fn row(&self, index: usize) -> Option<SeriesRow> {
        Some(SeriesRow {
            timestamp: *self.timestamps.get(index)?,
            price: *self.prices.get(index)?,
            window_vol: *self.window_vol.get(index)?,
            exit_vol: *self.exit_vol.get(index)?,
        })
    }

    /// First row
    pub fn first(&self) -> SeriesRow {
        SeriesRow {
            timestamp: self.timestamps[0],
            price: self.prices[0],
            window_vol: self.window_vol[0],
            exit_vol: self.exit_vol[0],
        }
    }

    /// Spacing between rows, `None` for a single row
    pub fn step(&self) -> Option<Duration> {
        match self.timestamps.as_slice() {
            [a, b, ..] => Some(*b - *a),
            _ => None,
        }
    }

    /// Contiguous, non-empty sub-series
    pub fn slice(&self, range: Range<usize>) -> Result<Self, SeriesError> {
        if range.start >= range.end {
            return Err(SeriesError::Empty);
        }
        if range.end > self.len() {
            return Err(SeriesError::OutOfRange {
                start: range.start,
                end: range.end,
                len: self.len(),
            });
        }
        Ok(Self {
            timestamps: self.timestamps[range.clone()].to_vec(),
            prices: self.prices[range.clone()].to_vec(),
            window_vol: self.window_vol[range.clone()].to_vec(),
            exit_vol: self.exit_vol[range].to_vec(),
        })
    }
}

#[cfg(test)]
pub(crate) fn hourly(prices: &[f64], window_vol: f64, exit_vol: f64) -> AlignedSeries {
    let start = DateTime::from_timestamp(1_672_531_200, 0).unwrap();
    let timestamps = (0..prices.len())
        .map(|i| start + Duration::hours(i as i64))
        .collect();
    AlignedSeries::new(
        timestamps,
        prices.to_vec(),
        vec![window_vol; prices.len()],
        vec![exit_vol; prices.len()],
    )
    .unwrap()
}
