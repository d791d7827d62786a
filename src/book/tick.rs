//! Tick math
//!
//! Prices live on a logarithmic grid: `price = 1.0001^tick * 10^decimals_diff`.
//! `decimals_diff` compensates for the decimal mismatch between base and quote.

use super::LadderError;

/// Relative price step between two adjacent ticks
pub const TICK_BASE: f64 = 1.0001;

/// Convert a price to the tick at or below it.
pub fn price_to_tick(price: f64, decimals_diff: i32) -> Result<i32, LadderError> {
    if !(price > 0.0) || !price.is_finite() {
        return Err(LadderError::NonPositivePrice(price));
    }
    let scaled = price / 10f64.powi(decimals_diff);
    Ok((scaled.ln() / TICK_BASE.ln()).floor() as i32)
}

/// Convert a tick back to its price.
pub fn tick_to_price(tick: i32, decimals_diff: i32) -> f64 {
    TICK_BASE.powf(f64::from(tick)) * 10f64.powi(decimals_diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_to_tick_unit_price() {
        assert_eq!(price_to_tick(1.0, 0).unwrap(), 0);
    }

    #[test]
    fn test_price_to_tick_with_decimals() {
        // ETH/USDC style pair: 3500 quote per base with 12 decimals of difference
        assert_eq!(price_to_tick(3500.0, 12).unwrap(), -194715);
    }

    #[test]
    fn test_price_to_tick_below_one() {
        // Floors towards negative infinity
        assert_eq!(price_to_tick(0.9999, 0).unwrap(), -2);
    }

    #[test]
    fn test_price_to_tick_rejects_non_positive() {
        assert_eq!(
            price_to_tick(0.0, 0),
            Err(LadderError::NonPositivePrice(0.0))
        );
        assert!(price_to_tick(-5.0, 3).is_err());
        assert!(price_to_tick(f64::NAN, 0).is_err());
    }

    #[test]
    fn test_tick_to_price_zero() {
        assert_eq!(tick_to_price(0, 0), 1.0);
        assert!((tick_to_price(0, 12) - 1e12).abs() < 1e-3);
    }

    #[test]
    fn test_round_trip_within_one_tick() {
        for decimals in [-6, 0, 6, 12] {
            for price in [0.0001, 0.37, 1.0, 42.5, 1850.0, 3500.0, 65000.0] {
                let tick = price_to_tick(price, decimals).unwrap();
                let back = tick_to_price(tick, decimals);
                let ratio = price / back;
                assert!(
                    (1.0 - 1e-9..TICK_BASE + 1e-9).contains(&ratio),
                    "price {price} decimals {decimals} came back as {back}"
                );
            }
        }
    }

    #[test]
    fn test_adjacent_ticks_are_one_step_apart() {
        let a = tick_to_price(100, 0);
        let b = tick_to_price(101, 0);
        assert!((b / a - TICK_BASE).abs() < 1e-12);
    }
}
