//! CLI interface for kandel-backtest
//!
//! Provides subcommands for:
//! - `run`: Backtest according to `data.mode`
//! - `backtest`: Single run over the whole prepared series
//! - `sweep`: Parallel run over fixed-length samples
//! - `config`: Show the effective configuration

mod backtest;
mod run;
mod sweep;

pub use backtest::BacktestArgs;
pub use run::RunArgs;
pub use sweep::SweepArgs;

use crate::config::Config;
use crate::data::{load_prices, prepare_series, AlignedSeries};
use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "kandel-backtest")]
#[command(about = "Backtest the Kandel ladder market-making strategy on historical prices")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Backtest according to the configured sample mode
    Run(RunArgs),
    /// Single backtest over the whole series
    Backtest(BacktestArgs),
    /// Backtest many samples in parallel
    Sweep(SweepArgs),
    /// Show configuration
    Config,
}

/// How results are printed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Output options shared by the backtest commands
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output directory for results
    #[arg(long, default_value = "./output")]
    pub output: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Load the configured price file and derive the aligned series
fn load_series(config: &Config) -> anyhow::Result<AlignedSeries> {
    let history = load_prices(&config.data.path)
        .with_context(|| format!("Failed to load prices from {}", config.data.path.display()))?;
    let series = prepare_series(
        &history,
        config.kandel.window,
        config.data.exit_vol_window,
        config.data.start,
        config.data.end,
    )?;
    tracing::info!(
        rows = series.len(),
        first = %series.first().timestamp,
        "Prepared series"
    );
    Ok(series)
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = rows.len(), "Wrote results");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
