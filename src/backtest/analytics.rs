//! Performance analytics

use super::BacktestRun;
use crate::data::AlignedSeries;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Headline numbers of one sample run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSummary {
    pub start: DateTime<Utc>,
    pub start_price: f64,
    pub end_price: f64,
    /// Last minus first price
    pub price_diff: f64,
    /// Change of mark-to-market value in quote
    pub quote_returns: f64,
    /// Change of mark-to-market value in base
    pub base_returns: f64,
    /// Return of holding the initial 50/50 split untouched, in quote
    pub hold_returns: f64,
    pub total_fees: f64,
    pub fills: usize,
    pub exits: usize,
}

impl SampleSummary {
    /// Summarize `run` over `series`, `None` for an empty run
    pub fn from_run(series: &AlignedSeries, run: &BacktestRun) -> Option<Self> {
        let first = run.rows.first()?;
        let last = run.rows.last()?;
        let start_price = *series.prices().first()?;
        let end_price = *series.prices().last()?;

        Some(Self {
            start: first.timestamp,
            start_price,
            end_price,
            price_diff: end_price - start_price,
            quote_returns: last.mtm_quote() / first.mtm_quote() - 1.0,
            base_returns: last.mtm_base() / first.mtm_base() - 1.0,
            hold_returns: 0.5 * end_price / start_price - 0.5,
            total_fees: run.total_fees(),
            fills: run.fill_count(),
            exits: run.exit_count(),
        })
    }

    /// True when the strategy did better than the 50/50 hold
    pub fn beats_hold(&self) -> bool {
        self.quote_returns > self.hold_returns
    }
}

/// One reporting row per step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRow {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub window_vol: f64,
    pub exit_vol: f64,
    pub quote: f64,
    pub base: f64,
    pub mtm_quote: f64,
    pub mtm_base: f64,
    /// Versus the initial capital in quote
    pub returns_quote: f64,
    /// Versus the initial capital converted to base at the first price
    pub returns_base: f64,
    /// Versus the untouched 50/50 split
    pub returns_even: f64,
    pub generated_fees: f64,
    pub cum_generated_fees: f64,
}

/// Reporting rows for every step of `run`
pub fn performance_rows(
    series: &AlignedSeries,
    run: &BacktestRun,
    initial_capital: f64,
) -> Vec<PerformanceRow> {
    let Some(&p0) = series.prices().first() else {
        return Vec::new();
    };
    let half = initial_capital / 2.0;

    let mut cum_fees = 0.0;
    run.rows
        .iter()
        .filter_map(|record| {
            let row = series.row(record.index)?;
            cum_fees += record.generated_fee;
            let mtm_quote = record.mtm_quote();
            let mtm_base = record.mtm_base();
            Some(PerformanceRow {
                timestamp: record.timestamp,
                price: record.price,
                window_vol: row.window_vol,
                exit_vol: row.exit_vol,
                quote: record.quote,
                base: record.base,
                mtm_quote,
                mtm_base,
                returns_quote: mtm_quote / initial_capital - 1.0,
                returns_base: mtm_base / (initial_capital / p0) - 1.0,
                returns_even: mtm_quote / (half + half / p0 * record.price) - 1.0,
                generated_fees: record.generated_fee,
                cum_generated_fees: cum_fees,
            })
        })
        .collect()
}

/// Keep the last row of each consecutive bucket of `every` rows.
///
/// `every == 0` keeps all rows.
pub fn resample(rows: &[PerformanceRow], every: usize) -> Vec<PerformanceRow> {
    if every == 0 {
        return rows.to_vec();
    }
    rows.chunks(every)
        .filter_map(|bucket| bucket.last().cloned())
        .collect()
}

/// Single-run report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub steps: usize,
    pub initial_capital: f64,
    pub final_mtm_quote: f64,
    pub returns_quote: f64,
    pub returns_base: f64,
    pub returns_even: f64,
    pub total_fees: f64,
    pub fills: usize,
    pub rebalances: usize,
    pub exits: usize,
    pub active_ratio: f64,
}

impl RunReport {
    /// Build from the full (not resampled) reporting rows
    pub fn new(rows: &[PerformanceRow], run: &BacktestRun, initial_capital: f64) -> Option<Self> {
        let last = rows.last()?;
        Some(Self {
            steps: run.len(),
            initial_capital,
            final_mtm_quote: last.mtm_quote,
            returns_quote: last.returns_quote,
            returns_base: last.returns_base,
            returns_even: last.returns_even,
            total_fees: run.total_fees(),
            fills: run.fill_count(),
            rebalances: run.rebalance_count(),
            exits: run.exit_count(),
            active_ratio: run.active_ratio(),
        })
    }

    /// Format as a table string
    pub fn format_table(&self) -> String {
        format!(
            r#"
══════════════════════════════════════════════════════
               KANDEL BACKTEST RESULTS
══════════════════════════════════════════════════════

PERFORMANCE
───────────────────────────────────────────────────────
Initial Capital:  {:.2}
Final Value:      {:.2}
Return (quote):   {:+.2}%
Return (base):    {:+.2}%
Return (50/50):   {:+.2}%
Fees Generated:   {:.2}

ACTIVITY
───────────────────────────────────────────────────────
Steps:            {}
Fills:            {}
Rebalances:       {}
Exits:            {}
Time Active:      {:.1}%
══════════════════════════════════════════════════════
"#,
            self.initial_capital,
            self.final_mtm_quote,
            self.returns_quote * 100.0,
            self.returns_base * 100.0,
            self.returns_even * 100.0,
            self.total_fees,
            self.steps,
            self.fills,
            self.rebalances,
            self.exits,
            self.active_ratio * 100.0,
        )
    }
}

/// Mean, median and range of a set of values
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl Distribution {
    /// `None` for an empty slice
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        Some(Self {
            mean: sorted.iter().sum::<f64>() / n as f64,
            median,
            min: sorted[0],
            max: sorted[n - 1],
        })
    }
}

/// Aggregate over the samples of a sweep
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSummary {
    pub samples: usize,
    pub failures: usize,
    pub quote_returns: Option<Distribution>,
    pub base_returns: Option<Distribution>,
    /// Share of samples that beat the 50/50 hold
    pub beat_hold_ratio: f64,
}

impl SweepSummary {
    /// Aggregate completed samples, counting `failures` alongside
    pub fn new(summaries: &[SampleSummary], failures: usize) -> Self {
        let quote: Vec<f64> = summaries.iter().map(|s| s.quote_returns).collect();
        let base: Vec<f64> = summaries.iter().map(|s| s.base_returns).collect();
        let beat_hold_ratio = if summaries.is_empty() {
            0.0
        } else {
            summaries.iter().filter(|s| s.beats_hold()).count() as f64 / summaries.len() as f64
        };

        Self {
            samples: summaries.len(),
            failures,
            quote_returns: Distribution::from_values(&quote),
            base_returns: Distribution::from_values(&base),
            beat_hold_ratio,
        }
    }

    /// Format as a table string
    pub fn format_table(&self) -> String {
        let line = |label: &str, dist: Option<Distribution>| match dist {
            Some(d) => format!(
                "{label:<16}mean {:+.2}%  median {:+.2}%  min {:+.2}%  max {:+.2}%",
                d.mean * 100.0,
                d.median * 100.0,
                d.min * 100.0,
                d.max * 100.0,
            ),
            None => format!("{label:<16}n/a"),
        };

        format!(
            r#"
══════════════════════════════════════════════════════
               KANDEL SWEEP RESULTS
══════════════════════════════════════════════════════

RETURNS
───────────────────────────────────────────────────────
{}
{}
Beat 50/50 Hold:  {:.1}%

SAMPLES
───────────────────────────────────────────────────────
Completed:        {}
Failed:           {}
══════════════════════════════════════════════════════
"#,
            line("Quote:", self.quote_returns),
            line("Base:", self.base_returns),
            self.beat_hold_ratio * 100.0,
            self.samples,
            self.failures,
        )
    }
}
