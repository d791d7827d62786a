//! Tick grid construction

use super::KandelConfig;
use crate::book::{price_to_tick, LadderError};

/// Total price range factor for the current volatility
pub fn range_multiplier(config: &KandelConfig, vol: f64) -> f64 {
    if config.vol_mult != 0.0 {
        (config.vol_mult * vol).exp()
    } else {
        config.range_mult
    }
}

/// Build an odd-length, strictly increasing tick grid centered on `spot_price`.
///
/// `n_points * 2 + 1` ticks are spread evenly by value between the ticks of
/// `spot / range` and `spot * range`, floored and deduplicated. An even count
/// left by deduplication loses its last tick.
pub fn build_ticks_grid(
    spot_price: f64,
    range_multiplier: f64,
    n_points: usize,
    decimals_diff: i32,
) -> Result<Vec<i32>, LadderError> {
    let n = n_points as f64;
    let grid_step = range_multiplier.powf(1.0 / n);
    let min_tick = price_to_tick(spot_price / grid_step.powf(n), decimals_diff)?;
    let max_tick = price_to_tick(spot_price * grid_step.powf(n), decimals_diff)?;

    let count = n_points * 2 + 1;
    let span = f64::from(max_tick) - f64::from(min_tick);
    let step = span / (count - 1) as f64;

    let mut grid: Vec<i32> = (0..count)
        .map(|i| {
            if i == count - 1 {
                max_tick
            } else {
                (f64::from(min_tick) + i as f64 * step).floor() as i32
            }
        })
        .collect();
    grid.dedup();
    if grid.len() % 2 == 0 {
        grid.pop();
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::types::test_config;

    #[test]
    fn test_grid_eth_usdc() {
        let grid = build_ticks_grid(3500.0, (1.6f64 * 0.01).exp(), 2, 12).unwrap();
        assert_eq!(grid, vec![-194875, -194795, -194715, -194635, -194555]);
    }

    #[test]
    fn test_grid_unit_price() {
        let grid = build_ticks_grid(1.0, (1.6f64 * 0.01).exp(), 2, 0).unwrap();
        assert_eq!(grid, vec![-161, -81, -1, 79, 160]);
    }

    #[test]
    fn test_grid_is_odd_and_increasing() {
        for n_points in 1..12 {
            for vol in [0.0005, 0.004, 0.02, 0.3] {
                let range = (1.6f64 * vol).exp();
                let grid = build_ticks_grid(1850.0, range, n_points, 12).unwrap();
                assert_eq!(grid.len() % 2, 1, "n_points {n_points} vol {vol}");
                assert!(grid.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn test_grid_dedup_restores_odd_length() {
        // Range of a handful of ticks cannot hold 9 distinct points
        let grid = build_ticks_grid(1.0, 1.0004, 4, 0).unwrap();
        assert_eq!(grid.len() % 2, 1);
        assert!(grid.len() < 9);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_grid_collapses_for_zero_range() {
        let grid = build_ticks_grid(1.0, 1.0, 3, 0).unwrap();
        assert_eq!(grid, vec![0]);
    }

    #[test]
    fn test_grid_rejects_non_positive_spot() {
        assert!(build_ticks_grid(0.0, 1.1, 2, 0).is_err());
    }

    #[test]
    fn test_range_multiplier_volatility_scaled() {
        let config = test_config();
        assert!((range_multiplier(&config, 0.01) - 0.016f64.exp()).abs() < 1e-15);
    }

    #[test]
    fn test_range_multiplier_static() {
        let config = KandelConfig {
            vol_mult: 0.0,
            range_mult: 1.2,
            ..test_config()
        };
        assert_eq!(range_multiplier(&config, 0.5), 1.2);
    }
}
