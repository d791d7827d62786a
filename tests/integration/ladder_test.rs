//! Strategy behaviour over a full prepared series

use crate::{kandel_config, synthetic_prices};
use chrono::DateTime;
use kandel_backtest::backtest::{BacktestConfig, KandelBacktester};
use kandel_backtest::book::Side;
use kandel_backtest::data::{prepare_series, AlignedSeries, PriceHistory};

fn series(len: usize, violent: std::ops::Range<usize>) -> AlignedSeries {
    let prices = synthetic_prices(len, violent);
    let history = PriceHistory {
        timestamps: prices
            .iter()
            .map(|(ts, _)| DateTime::from_timestamp(*ts, 0).unwrap())
            .collect(),
        prices: prices.iter().map(|(_, p)| *p).collect(),
    };
    prepare_series(&history, 24, 48, None, None).unwrap()
}

#[test]
fn test_ladder_never_crosses() {
    let series = series(400, 0..0);
    let mut backtester =
        KandelBacktester::new(&series, kandel_config(), BacktestConfig::default()).unwrap();

    let mut fills = 0;
    while let Some(record) = backtester.next() {
        fills += record.unwrap().fills.len();
        let book = backtester.kandel().order_book();
        assert!(!book.is_crossed(), "crossed ladder at step {}", backtester.position() - 1);
    }
    assert!(fills > 0);
}

#[test]
fn test_fills_move_inventory_by_notional() {
    let series = series(400, 0..0);
    let run = KandelBacktester::new(&series, kandel_config(), BacktestConfig::default())
        .unwrap()
        .run()
        .unwrap();

    for pair in run.rows.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.rebalanced || cur.exited || cur.fills.is_empty() {
            continue;
        }
        let expected_quote: f64 = cur
            .fills
            .iter()
            .map(|f| match f.side {
                Side::Bid => -f.notional(),
                Side::Ask => f.notional(),
            })
            .sum();
        let expected_base: f64 = cur
            .fills
            .iter()
            .map(|f| match f.side {
                Side::Bid => f.qty,
                Side::Ask => -f.qty,
            })
            .sum();
        assert!((cur.quote - prev.quote - expected_quote).abs() < 1e-6);
        assert!((cur.base - prev.base - expected_base).abs() < 1e-9);
    }
}

#[test]
fn test_fees_only_on_rebalance() {
    let series = series(400, 0..0);
    let run = KandelBacktester::new(&series, kandel_config(), BacktestConfig::default())
        .unwrap()
        .run()
        .unwrap();

    assert!(run.rows.iter().all(|r| r.generated_fee >= 0.0));
    assert!(run
        .rows
        .iter()
        .filter(|r| !r.rebalanced)
        .all(|r| r.generated_fee == 0.0));
    assert!(run.rows.iter().filter(|r| r.rebalanced).all(|r| r.index % 24 == 0));
}

#[test]
fn test_exit_and_reentry() {
    // Jumps at t = 200..210 are rows 128..138 after the warmup is dropped
    let series = series(400, 200..210);
    let run = KandelBacktester::new(&series, kandel_config(), BacktestConfig::default())
        .unwrap()
        .run()
        .unwrap();

    let exit = run
        .rows
        .iter()
        .find(|r| r.exited)
        .expect("volatile segment should trigger an exit");
    assert!((128..140).contains(&exit.index));
    assert_eq!(run.exit_count(), 1);

    // Flat while exited
    let exited: Vec<_> = run
        .rows
        .iter()
        .skip_while(|r| !r.exited)
        .take_while(|r| !r.active)
        .collect();
    assert!(exited.len() > 1);
    // The exit row itself may fill before the gate fires
    assert!(exited.iter().skip(1).all(|r| r.fills.is_empty()));
    assert!(exited
        .iter()
        .all(|r| r.quote == exit.quote && r.base == exit.base));

    // Back in once the exit window is calm again
    let reentry = run
        .rows
        .iter()
        .find(|r| r.index > exit.index && r.rebalanced)
        .expect("strategy should re-enter");
    assert_eq!(reentry.index % 24, 0);
    assert!(reentry.active);
    assert!(run.rows.last().unwrap().active);
}
