//! Run command implementation

use super::{BacktestArgs, OutputArgs, SweepArgs};
use crate::config::{Config, SampleMode};
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub output: OutputArgs,
}

impl RunArgs {
    /// Execute the run command
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        match config.data.mode {
            SampleMode::Single => BacktestArgs {
                output: self.output.clone(),
                history: false,
            }
            .execute(config),
            SampleMode::Multi => SweepArgs {
                output: self.output.clone(),
                workers: None,
            }
            .execute(config),
        }
    }
}
