//! Backtest command implementation

use super::{load_series, print_json, write_csv, OutputArgs, OutputFormat};
use crate::backtest::{performance_rows, resample, KandelBacktester, RunReport};
use crate::book::Side;
use crate::config::Config;
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;

#[derive(Args, Debug, Clone)]
pub struct BacktestArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    /// Record ladder snapshots regardless of configuration
    #[arg(long)]
    pub history: bool,
}

/// One filled order
#[derive(Debug, Serialize)]
struct FillRow {
    timestamp: DateTime<Utc>,
    step: usize,
    side: Side,
    tick: i32,
    price: f64,
    qty: f64,
}

/// Resting prices after one step
#[derive(Debug, Serialize)]
struct LadderRow<'a> {
    timestamp: DateTime<Utc>,
    bids: &'a [f64],
    asks: &'a [f64],
}

impl BacktestArgs {
    /// Execute the backtest command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let series = load_series(config)?;
        let mut backtest_config = config.backtest.clone();
        backtest_config.record_history |= self.history;

        let run = KandelBacktester::new(&series, config.kandel.clone(), backtest_config.clone())?
            .run()?;

        let capital = config.kandel.initial_capital;
        let rows = performance_rows(&series, &run, capital);
        let report = RunReport::new(&rows, &run, capital).context("Backtest produced no rows")?;

        let dir = &self.output.output;
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

        write_csv(
            &dir.join("results.csv"),
            &resample(&rows, backtest_config.resample_every),
        )?;

        let fills: Vec<FillRow> = run
            .fills()
            .map(|(record, fill)| FillRow {
                timestamp: record.timestamp,
                step: record.index,
                side: fill.side,
                tick: fill.tick,
                price: fill.price,
                qty: fill.qty,
            })
            .collect();
        write_csv(&dir.join("fills.csv"), &fills)?;

        if backtest_config.record_history {
            let ladder: Vec<LadderRow> = run
                .rows
                .iter()
                .filter_map(|record| {
                    let snapshot = record.snapshot.as_ref()?;
                    Some(LadderRow {
                        timestamp: record.timestamp,
                        bids: &snapshot.bids,
                        asks: &snapshot.asks,
                    })
                })
                .collect();
            let path = dir.join("ladder.json");
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            serde_json::to_writer(BufWriter::new(file), &ladder)?;
            tracing::info!(path = %path.display(), rows = ladder.len(), "Wrote ladder history");
        }

        match self.output.format {
            OutputFormat::Table => println!("{}", report.format_table()),
            OutputFormat::Json => print_json(&report)?,
        }
        Ok(())
    }
}
