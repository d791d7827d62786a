//! Order ladder module
//!
//! Simulated limit order book for the Kandel strategy: tick discretization,
//! resting orders and idealized matching against an observed price.

mod ladder;
mod order;
mod tick;
mod types;

pub use ladder::{InventoryDelta, LadderSnapshot, OrderBook};
pub use order::{Order, Side};
pub use tick::{price_to_tick, tick_to_price, TICK_BASE};
pub use types::LadderError;
