//! End-to-end integration tests

use crate::{synthetic_prices, write_prices};
use kandel_backtest::cli::{BacktestArgs, OutputArgs, OutputFormat, SweepArgs};
use kandel_backtest::config::{Config, SampleMode};
use std::path::Path;

fn config_toml(prices: &Path, mode: &str) -> String {
    format!(
        r#"
        [data]
        path = "{}"
        exit_vol_window = 48
        mode = "{mode}"
        sample_length = 100
        sample_stride = 50

        [kandel]
        initial_capital = 100000.0
        decimals_diff = 12
        vol_mult = 1.6
        n_points = 5
        window = 24
        exit_vol_threshold = 0.03
        asymmetric_exit_threshold = 0.05

        [backtest]
        resample_every = 24
        "#,
        prices.display()
    )
}

fn load_config(dir: &Path, mode: &str) -> Config {
    let prices = write_prices(dir, &synthetic_prices(400, 0..0));
    let path = dir.join("config.toml");
    std::fs::write(&path, config_toml(&prices, mode)).unwrap();
    Config::load(&path).unwrap()
}

fn csv_rows(path: &Path) -> usize {
    csv::Reader::from_path(path).unwrap().records().count()
}

#[test]
fn test_config_example_parses() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.data.mode, SampleMode::Single);
}

#[test]
fn test_backtest_command_writes_results() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(dir.path(), "single");
    let output = dir.path().join("out");

    BacktestArgs {
        output: OutputArgs {
            output: output.clone(),
            format: OutputFormat::Json,
        },
        history: true,
    }
    .execute(&config)
    .unwrap();

    // 400 rows less a 72-row warmup, one row per 24 steps
    assert_eq!(csv_rows(&output.join("results.csv")), 14);
    assert!(csv_rows(&output.join("fills.csv")) > 0);

    let ladder: Vec<serde_json::Value> =
        serde_json::from_reader(std::fs::File::open(output.join("ladder.json")).unwrap()).unwrap();
    assert_eq!(ladder.len(), 328);
    assert!(ladder[0]["bids"].as_array().is_some());
}

#[test]
fn test_sweep_command_writes_samples() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(dir.path(), "multi");
    let output = dir.path().join("out");

    SweepArgs {
        output: OutputArgs {
            output: output.clone(),
            format: OutputFormat::Table,
        },
        workers: Some(2),
    }
    .execute(&config)
    .unwrap();

    // Phase 0 starts at rows 0, 100, 200; phase 1 at 50, 150
    assert_eq!(csv_rows(&output.join("samples.csv")), 5);
}

#[test]
fn test_missing_price_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = load_config(dir.path(), "single");
    config.data.path = dir.path().join("missing.csv");

    let err = BacktestArgs {
        output: OutputArgs {
            output: dir.path().join("out"),
            format: OutputFormat::Table,
        },
        history: false,
    }
    .execute(&config)
    .unwrap_err();
    assert!(err.to_string().contains("Failed to load prices"));
}
