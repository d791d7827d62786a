//! Backtest metrics
//!
//! Recorded through the `metrics` facade; no-ops until a recorder is installed.

/// Counter metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMetric {
    /// Orders filled by the ladder
    Fills,
    /// Scheduled rebalances executed
    Rebalances,
    /// Volatility-gated exits
    Exits,
    /// Sweep samples that ran to completion
    SamplesCompleted,
    /// Sweep samples that failed or were cancelled
    SamplesFailed,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeMetric {
    /// Mark-to-market capital in quote
    Capital,
    /// Cumulative performance fees
    PerformanceFees,
}

impl CounterMetric {
    /// Metric name
    pub fn name(self) -> &'static str {
        match self {
            CounterMetric::Fills => "kandel_fills_total",
            CounterMetric::Rebalances => "kandel_rebalances_total",
            CounterMetric::Exits => "kandel_exits_total",
            CounterMetric::SamplesCompleted => "kandel_samples_completed_total",
            CounterMetric::SamplesFailed => "kandel_samples_failed_total",
        }
    }
}

impl GaugeMetric {
    /// Metric name
    pub fn name(self) -> &'static str {
        match self {
            GaugeMetric::Capital => "kandel_capital_quote",
            GaugeMetric::PerformanceFees => "kandel_performance_fees_quote",
        }
    }
}

/// Increment a counter
pub fn increment_counter(metric: CounterMetric, value: u64) {
    ::metrics::counter!(metric.name()).increment(value);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    ::metrics::gauge!(metric.name()).set(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed() {
        for metric in [
            CounterMetric::Fills,
            CounterMetric::Rebalances,
            CounterMetric::Exits,
            CounterMetric::SamplesCompleted,
            CounterMetric::SamplesFailed,
        ] {
            assert!(metric.name().starts_with("kandel_"));
        }
        assert_eq!(GaugeMetric::Capital.name(), "kandel_capital_quote");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        increment_counter(CounterMetric::Fills, 3);
        set_gauge(GaugeMetric::Capital, 1000.0);
    }
}
