//! Series preparation and sample windowing

use super::{AlignedSeries, PriceHistory, SeriesError};
use crate::model::rolling_volatility;
use chrono::{NaiveDate, NaiveTime};

/// Derive the volatility columns and cut the backtest series.
///
/// Drops the first `window + exit_vol_window` rows, whose volatility is not
/// yet defined, then keeps rows between `start` and `end` (both whole days, inclusive).
pub fn prepare_series(
    history: &PriceHistory,
    window: usize,
    exit_vol_window: usize,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<AlignedSeries, SeriesError> {
    let window_vol = rolling_volatility(&history.prices, window);
    let exit_vol = rolling_volatility(&history.prices, exit_vol_window);

    let lower = start.map(|d| d.and_time(NaiveTime::MIN).and_utc());
    let upper = end
        .and_then(|d| d.succ_opt())
        .map(|d| d.and_time(NaiveTime::MIN).and_utc());

    let keep: Vec<usize> = (window + exit_vol_window..history.len())
        .filter(|&i| {
            let ts = history.timestamps[i];
            lower.map_or(true, |l| ts >= l) && upper.map_or(true, |u| ts < u)
        })
        .collect();

    AlignedSeries::new(
        keep.iter().map(|&i| history.timestamps[i]).collect(),
        keep.iter().map(|&i| history.prices[i]).collect(),
        keep.iter().map(|&i| window_vol[i]).collect(),
        keep.iter().map(|&i| exit_vol[i]).collect(),
    )
}

/// Cut complete, non-overlapping samples of `length` rows.
///
/// Each phase `k` in `0..max(length / stride, 1)` starts its run of samples at
/// row `k * stride`; samples from different phases may overlap.
pub fn split_samples(
    series: &AlignedSeries,
    length: usize,
    stride: usize,
) -> Result<Vec<AlignedSeries>, SeriesError> {
    if length == 0 || stride == 0 {
        return Err(SeriesError::Empty);
    }

    let phases = (length / stride).max(1);
    let mut samples = Vec::new();
    for phase in 0..phases {
        let mut start = phase * stride;
        while start + length <= series.len() {
            samples.push(series.slice(start..start + length)?);
            start += length;
        }
    }

    Ok(samples)
}
