//! Volatility estimation module
//!
//! Rolling realized volatility from log returns, over a fixed number of steps

use std::collections::VecDeque;

/// Rolling volatility estimator over the last `window` log returns.
///
/// The estimate is the sample standard deviation of the returns scaled by
/// `sqrt(window)`, i.e. the volatility over one window.
pub struct VolatilityEstimator {
    /// Number of returns in the window
    window: usize,
    /// Returns currently in the window
    returns: VecDeque<f64>,
    /// Running sum of returns in the window
    sum: f64,
    /// Running sum of squared returns in the window
    sum_sq: f64,
    /// Previous price
    last_price: Option<f64>,
}

impl VolatilityEstimator {
    /// Create a new volatility estimator with given window
    pub fn new(window: usize) -> Self {
        Self {
            window,
            returns: VecDeque::with_capacity(window + 1),
            sum: 0.0,
            sum_sq: 0.0,
            last_price: None,
        }
    }

    /// Add a new price observation
    pub fn update(&mut self, price: f64) {
        if let Some(prev) = self.last_price {
            let ret = (price / prev).ln();
            self.returns.push_back(ret);
            self.sum += ret;
            self.sum_sq += ret * ret;

            if self.returns.len() > self.window {
                if let Some(old) = self.returns.pop_front() {
                    self.sum -= old;
                    self.sum_sq -= old * old;
                }
            }
        }
        self.last_price = Some(price);
    }

    /// Window volatility, `None` until the window is full
    pub fn estimate(&self) -> Option<f64> {
        if self.window < 2 || self.returns.len() < self.window {
            return None;
        }

        let n = self.returns.len() as f64;
        let variance = ((self.sum_sq - self.sum * self.sum / n) / (n - 1.0)).max(0.0);
        Some(variance.sqrt() * n.sqrt())
    }
}

/// Volatility at every position of `prices`; positions without a full window are 0.
pub fn rolling_volatility(prices: &[f64], window: usize) -> Vec<f64> {
    let mut estimator = VolatilityEstimator::new(window);
    prices
        .iter()
        .map(|&price| {
            estimator.update(price);
            estimator.estimate().unwrap_or(0.0)
        })
        .collect()
}
