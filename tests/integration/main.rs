//! Integration tests

mod e2e_test;
mod ladder_test;
mod sweep_test;

use kandel_backtest::strategy::KandelConfig;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 2023-01-01T00:00:00Z
const START: i64 = 1_672_531_200;

/// Hourly prices oscillating 1.5% around 1500, with ±5% jumps on `violent` steps
pub fn synthetic_prices(len: usize, violent: std::ops::Range<usize>) -> Vec<(i64, f64)> {
    (0..len)
        .map(|t| {
            let mut price = 1500.0 * (1.0 + 0.015 * (t as f64 / 6.0).sin());
            if violent.contains(&t) {
                price *= if t % 2 == 0 { 1.05 } else { 0.95 };
            }
            (START + t as i64 * 3600, price)
        })
        .collect()
}

pub fn write_prices(dir: &Path, prices: &[(i64, f64)]) -> PathBuf {
    let path = dir.join("prices.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "timestamp,price").unwrap();
    for (ts, price) in prices {
        writeln!(file, "{ts},{price}").unwrap();
    }
    path
}

pub fn kandel_config() -> KandelConfig {
    KandelConfig {
        initial_capital: 100_000.0,
        decimals_diff: 12,
        performance_fees: 0.1,
        vol_mult: 1.6,
        range_mult: 1.05,
        n_points: 5,
        step_size: 1,
        window: 24,
        exit_vol_threshold: 0.03,
        asymmetric_exit_threshold: 0.05,
    }
}
