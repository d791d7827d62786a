//! Backtest driver
//!
//! Replays an aligned series through a single Kandel instance, one row per
//! step, with a scheduled rebalance every `window` rows.

use super::{BacktestConfig, BacktestError, BacktestRun, StepRecord};
use crate::data::{AlignedSeries, SeriesError};
use crate::strategy::{Kandel, KandelConfig, StrategyError};
use crate::telemetry::{increment_counter, set_gauge, CounterMetric, GaugeMetric};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Steps a Kandel strategy through a series.
///
/// Yields one [`StepRecord`] per row. A structural error ends the run; the
/// iterator is fused after it.
pub struct KandelBacktester<'a> {
    series: &'a AlignedSeries,
    kandel: Kandel,
    config: BacktestConfig,
    window: usize,
    cursor: usize,
    cum_fees: f64,
    failed: bool,
}

impl<'a> KandelBacktester<'a> {
    /// Deploy the strategy at the first row of `series`
    pub fn new(
        series: &'a AlignedSeries,
        kandel_config: KandelConfig,
        config: BacktestConfig,
    ) -> Result<Self, BacktestError> {
        if series.is_empty() {
            return Err(SeriesError::Empty.into());
        }
        let first = series.first();
        let window = kandel_config.window;
        let kandel = Kandel::new(kandel_config, first.price, first.window_vol, first.exit_vol)?;

        Ok(Self {
            series,
            kandel,
            config,
            window,
            cursor: 0,
            cum_fees: 0.0,
            failed: false,
        })
    }

    /// Strategy state after the last yielded step
    pub fn kandel(&self) -> &Kandel {
        &self.kandel
    }

    /// Index of the next row to process
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Drive every remaining row
    pub fn run(self) -> Result<BacktestRun, BacktestError> {
        let rows = self.collect::<Result<Vec<_>, _>>()?;
        debug!(steps = rows.len(), "Backtest finished");
        Ok(BacktestRun { rows })
    }

    /// Drive every remaining row, checking `cancel` before each one
    pub fn run_until_cancelled(
        mut self,
        cancel: &AtomicBool,
    ) -> Result<BacktestRun, BacktestError> {
        let mut rows = Vec::with_capacity(self.series.len() - self.cursor);
        while self.cursor < self.series.len() {
            if cancel.load(Ordering::Relaxed) {
                return Err(BacktestError::Cancelled { step: self.cursor });
            }
            match self.next() {
                Some(record) => rows.push(record?),
                None => break,
            }
        }
        debug!(steps = rows.len(), "Backtest finished");
        Ok(BacktestRun { rows })
    }

    fn step(&mut self, index: usize) -> Result<StepRecord, BacktestError> {
        let row = self.series.row(index).ok_or(SeriesError::OutOfRange {
            start: index,
            end: index + 1,
            len: self.series.len(),
        })?;

        let at_row = |source: StrategyError| BacktestError::Step {
            index,
            timestamp: row.timestamp,
            price: row.price,
            window_vol: row.window_vol,
            exit_vol: row.exit_vol,
            source,
        };

        let outcome = self
            .kandel
            .update_kandel_state(row.price, row.window_vol, row.exit_vol)
            .map_err(at_row)?;

        let mut generated_fee = 0.0;
        let mut rebalanced = false;
        if index % self.window == 0 && !self.kandel.should_exit(row.exit_vol) {
            generated_fee = self.kandel.rebalance().map_err(at_row)?;
            rebalanced = true;
        }

        self.cum_fees += generated_fee;
        record_metrics(
            &self.kandel,
            outcome.fills.len(),
            rebalanced,
            outcome.exited,
            self.cum_fees,
        );

        Ok(StepRecord {
            index,
            timestamp: row.timestamp,
            price: row.price,
            quote: self.kandel.quote(),
            base: self.kandel.base(),
            generated_fee,
            rebalanced,
            exited: outcome.exited,
            active: self.kandel.is_active(),
            fills: outcome.fills,
            snapshot: self
                .config
                .record_history
                .then(|| self.kandel.order_book().snapshot()),
        })
    }
}

impl Iterator for KandelBacktester<'_> {
    type Item = Result<StepRecord, BacktestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor >= self.series.len() {
            return None;
        }
        let index = self.cursor;
        self.cursor += 1;

        let record = self.step(index);
        if record.is_err() {
            self.failed = true;
        }
        Some(record)
    }
}

fn record_metrics(kandel: &Kandel, fills: usize, rebalanced: bool, exited: bool, cum_fees: f64) {
    if fills > 0 {
        increment_counter(CounterMetric::Fills, fills as u64);
    }
    if rebalanced {
        increment_counter(CounterMetric::Rebalances, 1);
        set_gauge(GaugeMetric::PerformanceFees, cum_fees);
    }
    if exited {
        increment_counter(CounterMetric::Exits, 1);
    }
    set_gauge(GaugeMetric::Capital, kandel.capital());
}
