//! Resting order types

use super::tick_to_price;
use serde::{Deserialize, Serialize};

/// Side of a resting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buys base with quote
    Bid,
    /// Sells base for quote
    Ask,
}

impl Side {
    /// The side a fill on this side is replenished on
    pub fn opposite(self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

/// A resting order on the ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order side
    pub side: Side,
    /// Grid tick the order rests on
    pub tick: i32,
    /// Size in base units
    pub qty: f64,
    /// Price derived from the tick
    pub price: f64,
}

impl Order {
    /// Create an order at `tick`, caching its price
    pub fn new(side: Side, tick: i32, qty: f64, decimals_diff: i32) -> Self {
        Self {
            side,
            tick,
            qty,
            price: tick_to_price(tick, decimals_diff),
        }
    }

    /// Quote value of the order at its own price
    pub fn notional(&self) -> f64 {
        self.qty * self.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Bid.opposite(), Side::Ask);
        assert_eq!(Side::Ask.opposite(), Side::Bid);
    }

    #[test]
    fn test_side_ordering_puts_bids_first() {
        assert!(Side::Bid < Side::Ask);
    }

    #[test]
    fn test_order_caches_price() {
        let order = Order::new(Side::Bid, 0, 2.0, 3);
        assert_eq!(order.price, 1000.0);
        assert_eq!(order.notional(), 2000.0);
    }

    #[test]
    fn test_side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Side::Ask).unwrap(), "\"ask\"");
    }
}
