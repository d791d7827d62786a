//! Multi-sample sweeps over a prepared series

use crate::{kandel_config, synthetic_prices, write_prices};
use kandel_backtest::backtest::{run_sweep, BacktestConfig, SweepSummary};
use kandel_backtest::data::{load_prices, prepare_series, split_samples};
use std::sync::atomic::AtomicBool;

#[test]
fn test_sweep_over_split_samples() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_prices(dir.path(), &synthetic_prices(400, 0..0));
    let history = load_prices(&path).unwrap();
    let series = prepare_series(&history, 24, 48, None, None).unwrap();
    let samples = split_samples(&series, 100, 50).unwrap();
    assert_eq!(samples.len(), 5);

    let cancel = AtomicBool::new(false);
    let config = BacktestConfig {
        workers: 3,
        ..BacktestConfig::default()
    };
    let outcome = run_sweep(&samples, &kandel_config(), &config, &cancel).unwrap();
    assert_eq!(outcome.failures, 0);
    assert_eq!(outcome.summaries.len(), 5);

    let starts: Vec<_> = samples.iter().map(|s| s.first().timestamp).collect();
    let summary_starts: Vec<_> = outcome.summaries.iter().map(|s| s.start).collect();
    assert_eq!(starts, summary_starts);

    let summary = SweepSummary::new(&outcome.summaries, outcome.failures);
    assert_eq!(summary.samples, 5);
    let quote = summary.quote_returns.unwrap();
    assert!(quote.min <= quote.median && quote.median <= quote.max);
}
