//! Order ladder state and matching
//!
//! The ladder holds at most one order per tick and side, keyed by
//! `(tick, side)` so iteration is always in ascending tick order.

use super::{price_to_tick, LadderError, Order, Side};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Net inventory change implied by a batch of fills
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InventoryDelta {
    /// Quote balance change
    pub quote: f64,
    /// Base balance change
    pub base: f64,
}

/// Resting prices on each side, lowest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LadderSnapshot {
    pub bids: Vec<f64>,
    pub asks: Vec<f64>,
}

/// Simulated order ladder around a moving reference price
#[derive(Debug, Clone)]
pub struct OrderBook {
    /// Last observed price
    current_price: f64,
    /// Decimal offset used by tick math
    decimals_diff: i32,
    /// Grid the current orders were built on
    ticks_grid: Vec<i32>,
    /// Resting orders by (tick, side)
    orders: BTreeMap<(i32, Side), Order>,
}

impl OrderBook {
    /// Create an empty ladder referenced at `initial_price`
    pub fn new(initial_price: f64, decimals_diff: i32) -> Result<Self, LadderError> {
        check_price(initial_price)?;
        Ok(Self {
            current_price: initial_price,
            decimals_diff,
            ticks_grid: Vec::new(),
            orders: BTreeMap::new(),
        })
    }

    /// Current reference price
    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    /// Decimal offset used by tick math
    pub fn decimals_diff(&self) -> i32 {
        self.decimals_diff
    }

    /// Active tick grid
    pub fn ticks_grid(&self) -> &[i32] {
        &self.ticks_grid
    }

    /// Number of resting orders
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// True when nothing rests on the ladder
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// All resting orders in ascending tick order
    pub fn orders(&self) -> impl Iterator<Item = &Order> + '_ {
        self.orders.values()
    }

    /// Resting bids, lowest first
    pub fn bids(&self) -> impl Iterator<Item = &Order> + '_ {
        self.orders.values().filter(|o| o.side == Side::Bid)
    }

    /// Resting asks, lowest first
    pub fn asks(&self) -> impl Iterator<Item = &Order> + '_ {
        self.orders.values().filter(|o| o.side == Side::Ask)
    }

    /// Highest resting bid price
    pub fn best_bid(&self) -> Option<f64> {
        self.bids().last().map(|o| o.price)
    }

    /// Lowest resting ask price
    pub fn best_ask(&self) -> Option<f64> {
        self.asks().next().map(|o| o.price)
    }

    /// True if some bid rests at or above some ask
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    /// Move the reference price without matching anything
    pub fn reset_reference_price(&mut self, price: f64) -> Result<(), LadderError> {
        check_price(price)?;
        self.current_price = price;
        Ok(())
    }

    /// Drop every resting order
    pub fn clear(&mut self) {
        self.orders.clear();
    }

    /// Index of the first grid tick strictly above the reference price tick
    pub fn first_ask_index(&self) -> Result<usize, LadderError> {
        let mid_tick = price_to_tick(self.current_price, self.decimals_diff)?;
        Ok(self.ticks_grid.partition_point(|&tick| tick <= mid_tick))
    }

    /// Replace the ladder with `len(ticks_grid) - 1` orders spread over the grid.
    ///
    /// Bids take the grid points below the first ask index, except the point
    /// right below it, which stays empty. Each bid is worth `capital / n` in
    /// quote; each ask holds `capital / current_price / n` base.
    pub fn build_book(&mut self, capital: f64, ticks_grid: Vec<i32>) -> Result<(), LadderError> {
        if !(capital > 0.0) || !capital.is_finite() {
            return Err(LadderError::NonPositiveCapital(capital));
        }
        if ticks_grid.len() < 2 {
            return Err(LadderError::GridTooSmall(ticks_grid.len()));
        }
        if let Some(i) = ticks_grid.windows(2).position(|w| w[0] >= w[1]) {
            return Err(LadderError::GridNotIncreasing(i + 1));
        }
        check_price(self.current_price)?;

        self.ticks_grid = ticks_grid;
        let n_orders = (self.ticks_grid.len() - 1) as f64;
        let gap = self.first_ask_index()?.max(1) - 1;
        let ask_qty = capital / self.current_price / n_orders;

        let mut orders = BTreeMap::new();
        for (index, &tick) in self.ticks_grid.iter().enumerate() {
            let order = match index.cmp(&gap) {
                std::cmp::Ordering::Equal => continue,
                std::cmp::Ordering::Less => {
                    let mut bid = Order::new(Side::Bid, tick, 0.0, self.decimals_diff);
                    bid.qty = capital / bid.price / n_orders;
                    bid
                }
                std::cmp::Ordering::Greater => {
                    Order::new(Side::Ask, tick, ask_qty, self.decimals_diff)
                }
            };
            orders.insert((tick, order.side), order);
        }
        self.orders = orders;

        Ok(())
    }

    /// Insert an order, merging quantity into an existing order on the same tick and side
    pub fn add_order(&mut self, order: Order) {
        match self.orders.entry((order.tick, order.side)) {
            Entry::Occupied(mut resting) => resting.get_mut().qty += order.qty,
            Entry::Vacant(slot) => {
                slot.insert(order);
            }
        }
    }

    /// Fill every order the move to `spot_price` traded through.
    ///
    /// A falling price fills bids priced at or above it, a rising price fills
    /// asks priced at or below it. The reference price becomes `spot_price`.
    pub fn arbitrate(&mut self, spot_price: f64) -> Vec<Order> {
        let mut transactions = Vec::new();

        if spot_price < self.current_price {
            self.orders.retain(|_, order| {
                let filled = order.side == Side::Bid && spot_price <= order.price;
                if filled {
                    transactions.push(order.clone());
                }
                !filled
            });
        } else if spot_price > self.current_price {
            self.orders.retain(|_, order| {
                let filled = order.side == Side::Ask && spot_price >= order.price;
                if filled {
                    transactions.push(order.clone());
                }
                !filled
            });
        }

        self.current_price = spot_price;
        transactions
    }

    /// Re-quote each fill one grid tick over on the opposite side.
    ///
    /// A filled bid becomes an ask one tick up with the same base quantity; a
    /// filled ask becomes a bid one tick down worth the ask's proceeds.
    pub fn place_dual_offers(
        &mut self,
        transactions: &[Order],
    ) -> Result<InventoryDelta, LadderError> {
        let mut delta = InventoryDelta::default();

        for fill in transactions {
            let index = self
                .ticks_grid
                .binary_search(&fill.tick)
                .map_err(|_| LadderError::TickOffGrid(fill.tick))?;
            let dual_index = match fill.side {
                Side::Bid => index.checked_add(1),
                Side::Ask => index.checked_sub(1),
            };
            let dual_tick = dual_index
                .and_then(|i| self.ticks_grid.get(i).copied())
                .ok_or(LadderError::ReplenishOutOfGrid {
                    tick: fill.tick,
                    side: fill.side,
                })?;

            let dual = match fill.side {
                Side::Bid => {
                    delta.quote -= fill.notional();
                    delta.base += fill.qty;
                    Order::new(Side::Ask, dual_tick, fill.qty, self.decimals_diff)
                }
                Side::Ask => {
                    delta.quote += fill.notional();
                    delta.base -= fill.qty;
                    let mut bid = Order::new(Side::Bid, dual_tick, 0.0, self.decimals_diff);
                    bid.qty = fill.notional() / bid.price;
                    bid
                }
            };
            self.add_order(dual);
        }

        Ok(delta)
    }

    /// Resting prices per side
    pub fn snapshot(&self) -> LadderSnapshot {
        LadderSnapshot {
            bids: self.bids().map(|o| o.price).collect(),
            asks: self.asks().map(|o| o.price).collect(),
        }
    }
}

fn check_price(price: f64) -> Result<(), LadderError> {
    if price > 0.0 && price.is_finite() {
        Ok(())
    } else {
        Err(LadderError::NonPositivePrice(price))
    }
}
