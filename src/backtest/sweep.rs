//! Parallel multi-sample sweep

use super::{BacktestConfig, BacktestError, KandelBacktester, SampleSummary};
use crate::data::{AlignedSeries, SeriesError};
use crate::strategy::KandelConfig;
use crate::telemetry::{increment_counter, CounterMetric};
use rayon::prelude::*;
use std::sync::atomic::AtomicBool;
use tracing::{info, warn};

/// Result of a sweep
#[derive(Debug, Clone, Default)]
pub struct SweepOutcome {
    /// Completed samples, in sample order
    pub summaries: Vec<SampleSummary>,
    /// Samples that failed or were cancelled
    pub failures: usize,
}

/// Backtest every sample independently on the rayon pool.
///
/// Uses a dedicated pool of `config.workers` threads when non-zero. A failed
/// sample is logged and counted without stopping the others. Once `cancel` is
/// set, samples not yet finished fail with [`BacktestError::Cancelled`].
pub fn run_sweep(
    samples: &[AlignedSeries],
    kandel_config: &KandelConfig,
    config: &BacktestConfig,
    cancel: &AtomicBool,
) -> Result<SweepOutcome, BacktestError> {
    // Summaries only need scalars
    let sample_config = BacktestConfig {
        record_history: false,
        ..config.clone()
    };

    let evaluate = || -> Vec<Result<SampleSummary, BacktestError>> {
        samples
            .par_iter()
            .map(|sample| run_sample(sample, kandel_config, &sample_config, cancel))
            .collect()
    };

    let results = if config.workers > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .build()?;
        pool.install(evaluate)
    } else {
        evaluate()
    };

    let mut outcome = SweepOutcome::default();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(summary) => {
                increment_counter(CounterMetric::SamplesCompleted, 1);
                outcome.summaries.push(summary);
            }
            Err(e) => {
                increment_counter(CounterMetric::SamplesFailed, 1);
                warn!(sample = index, error = %e, "Sample failed");
                outcome.failures += 1;
            }
        }
    }

    info!(
        samples = samples.len(),
        completed = outcome.summaries.len(),
        failures = outcome.failures,
        "Sweep finished"
    );
    Ok(outcome)
}

fn run_sample(
    sample: &AlignedSeries,
    kandel_config: &KandelConfig,
    config: &BacktestConfig,
    cancel: &AtomicBool,
) -> Result<SampleSummary, BacktestError> {
    let run = KandelBacktester::new(sample, kandel_config.clone(), config.clone())?
        .run_until_cancelled(cancel)?;
    SampleSummary::from_run(sample, &run).ok_or(BacktestError::Series(SeriesError::Empty))
}
