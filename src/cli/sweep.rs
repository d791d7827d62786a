//! Sweep command implementation

use super::{load_series, print_json, write_csv, OutputArgs, OutputFormat};
use crate::backtest::{run_sweep, SweepSummary};
use crate::config::Config;
use crate::data::split_samples;
use anyhow::Context;
use clap::Args;
use std::fs;
use std::sync::atomic::AtomicBool;

#[derive(Args, Debug, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    /// Worker threads, overrides backtest.workers
    #[arg(long)]
    pub workers: Option<usize>,
}

impl SweepArgs {
    /// Execute the sweep command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let series = load_series(config)?;
        let samples = split_samples(&series, config.data.sample_length, config.data.sample_stride)?;
        tracing::info!(
            samples = samples.len(),
            length = config.data.sample_length,
            stride = config.data.sample_stride,
            "Split series into samples"
        );

        let mut backtest_config = config.backtest.clone();
        if let Some(workers) = self.workers {
            backtest_config.workers = workers;
        }

        let cancel = AtomicBool::new(false);
        let outcome = run_sweep(&samples, &config.kandel, &backtest_config, &cancel)?;

        let dir = &self.output.output;
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        write_csv(&dir.join("samples.csv"), &outcome.summaries)?;

        let summary = SweepSummary::new(&outcome.summaries, outcome.failures);
        match self.output.format {
            OutputFormat::Table => println!("{}", summary.format_table()),
            OutputFormat::Json => print_json(&summary)?,
        }
        Ok(())
    }
}
