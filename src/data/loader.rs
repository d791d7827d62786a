//! CSV price history loader

use super::SeriesError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct PriceRecord {
    /// Unix seconds
    timestamp: i64,
    price: f64,
}

/// Raw price history, one row per observation
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    pub timestamps: Vec<DateTime<Utc>>,
    pub prices: Vec<f64>,
}

impl PriceHistory {
    /// Parse `timestamp,price` CSV with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SeriesError> {
        let mut csv = csv::Reader::from_reader(reader);
        let mut history = PriceHistory::default();

        for (index, record) in csv.deserialize::<PriceRecord>().enumerate() {
            let record = record?;
            let timestamp = DateTime::from_timestamp(record.timestamp, 0).ok_or(
                SeriesError::InvalidTimestamp {
                    index,
                    value: record.timestamp,
                },
            )?;
            if !(record.price > 0.0) || !record.price.is_finite() {
                return Err(SeriesError::NonPositivePrice {
                    index,
                    price: record.price,
                });
            }
            history.timestamps.push(timestamp);
            history.prices.push(record.price);
        }

        Ok(history)
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// True if no observations were loaded
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Load price history from a CSV file
pub fn load_prices(path: impl AsRef<Path>) -> Result<PriceHistory, SeriesError> {
    let file = std::fs::File::open(path)?;
    let history = PriceHistory::from_reader(std::io::BufReader::new(file))?;
    tracing::info!(rows = history.len(), "Loaded price history");
    Ok(history)
}
