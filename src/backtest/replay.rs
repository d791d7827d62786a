//! Per-step backtest records

use crate::book::{LadderSnapshot, Order};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// State of the strategy after one series step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    /// Row index in the series
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    /// Quote balance after the step
    pub quote: f64,
    /// Base balance after the step
    pub base: f64,
    /// Performance fee realized by a rebalance on this step
    pub generated_fee: f64,
    /// A scheduled rebalance ran on this step
    pub rebalanced: bool,
    /// The exit gate fired on this step
    pub exited: bool,
    /// The ladder is live after the step
    pub active: bool,
    /// Orders filled on this step
    pub fills: Vec<Order>,
    /// Resting prices after the step, when history recording is on
    pub snapshot: Option<LadderSnapshot>,
}

impl StepRecord {
    /// Mark-to-market value in quote
    pub fn mtm_quote(&self) -> f64 {
        self.quote + self.base * self.price
    }

    /// Mark-to-market value in base
    pub fn mtm_base(&self) -> f64 {
        self.base + self.quote / self.price
    }
}

/// All step records of one backtest, in step order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BacktestRun {
    pub rows: Vec<StepRecord>,
}

impl BacktestRun {
    /// Number of steps
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if no step ran
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of performance fees
    pub fn total_fees(&self) -> f64 {
        self.rows.iter().map(|r| r.generated_fee).sum()
    }

    /// Number of filled orders
    pub fn fill_count(&self) -> usize {
        self.rows.iter().map(|r| r.fills.len()).sum()
    }

    /// Number of scheduled rebalances that ran
    pub fn rebalance_count(&self) -> usize {
        self.rows.iter().filter(|r| r.rebalanced).count()
    }

    /// Number of volatility exits
    pub fn exit_count(&self) -> usize {
        self.rows.iter().filter(|r| r.exited).count()
    }

    /// Share of steps that ended with a live ladder
    pub fn active_ratio(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.rows.iter().filter(|r| r.active).count() as f64 / self.rows.len() as f64
    }

    /// Ladder snapshots, one per step, when history was recorded
    pub fn snapshots(&self) -> impl Iterator<Item = Option<&LadderSnapshot>> + '_ {
        self.rows.iter().map(|r| r.snapshot.as_ref())
    }

    /// Every fill with the step it happened on
    pub fn fills(&self) -> impl Iterator<Item = (&StepRecord, &Order)> + '_ {
        self.rows
            .iter()
            .flat_map(|r| r.fills.iter().map(move |fill| (r, fill)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Side;

    fn record(index: usize, fee: f64, fills: usize, active: bool) -> StepRecord {
        StepRecord {
            index,
            timestamp: DateTime::from_timestamp(index as i64, 0).unwrap(),
            price: 2.0,
            quote: 100.0,
            base: 50.0,
            generated_fee: fee,
            rebalanced: fee > 0.0,
            exited: !active,
            active,
            fills: (0..fills).map(|_| Order::new(Side::Bid, 0, 1.0, 0)).collect(),
            snapshot: None,
        }
    }

    #[test]
    fn test_mark_to_market() {
        let r = record(0, 0.0, 0, true);
        assert_eq!(r.mtm_quote(), 200.0);
        assert_eq!(r.mtm_base(), 100.0);
    }

    #[test]
    fn test_run_aggregates() {
        let run = BacktestRun {
            rows: vec![
                record(0, 0.0, 2, true),
                record(1, 1.5, 1, true),
                record(2, 0.0, 0, false),
                record(3, 0.5, 0, true),
            ],
        };
        assert_eq!(run.total_fees(), 2.0);
        assert_eq!(run.fill_count(), 3);
        assert_eq!(run.rebalance_count(), 2);
        assert_eq!(run.exit_count(), 1);
        assert_eq!(run.active_ratio(), 0.75);
        assert_eq!(run.fills().count(), 3);
        assert!(run.snapshots().all(|s| s.is_none()));
    }

    #[test]
    fn test_empty_run() {
        let run = BacktestRun::default();
        assert!(run.is_empty());
        assert_eq!(run.active_ratio(), 0.0);
    }
}
