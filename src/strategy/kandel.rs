//! Kandel strategy controller

use super::{build_ticks_grid, range_multiplier, KandelConfig, KandelState, StrategyError};
use crate::book::{Order, OrderBook};
use tracing::debug;

/// What a single price update did to the strategy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    /// Orders filled by this update
    pub fills: Vec<Order>,
    /// True if this update triggered an exit
    pub exited: bool,
}

/// Kandel market-making strategy state
#[derive(Debug, Clone)]
pub struct Kandel {
    config: KandelConfig,
    /// Latest observed price
    spot_price: f64,
    /// Quote inventory
    quote: f64,
    /// Base inventory
    base: f64,
    /// Spot at the last rebalance
    open_price: f64,
    /// Capital after fees at the last rebalance, the fee baseline for the next one
    open_capital: f64,
    /// Latest window volatility
    vol: f64,
    ticks_grid: Vec<i32>,
    order_book: OrderBook,
    state: KandelState,
}

impl Kandel {
    /// Deploy `initial_capital` as a 50/50 ladder around `spot_price`.
    ///
    /// Starts exited when `exit_vol` is already above the threshold.
    pub fn new(
        config: KandelConfig,
        spot_price: f64,
        vol: f64,
        exit_vol: f64,
    ) -> Result<Self, StrategyError> {
        config.validate()?;
        check_spot(spot_price)?;

        let capital = config.initial_capital;
        let order_book = OrderBook::new(spot_price, config.decimals_diff)?;
        let mut kandel = Self {
            config,
            spot_price,
            quote: capital / 2.0,
            base: capital / 2.0 / spot_price,
            open_price: spot_price,
            open_capital: capital,
            vol,
            ticks_grid: Vec::new(),
            order_book,
            state: KandelState::Active,
        };
        kandel.update_ticks_grid()?;
        kandel
            .order_book
            .build_book(capital, kandel.ticks_grid.clone())?;

        if kandel.should_exit(exit_vol) {
            kandel.exit();
        }

        Ok(kandel)
    }

    fn update_ticks_grid(&mut self) -> Result<(), StrategyError> {
        let range = range_multiplier(&self.config, self.vol);
        self.ticks_grid = build_ticks_grid(
            self.spot_price,
            range,
            self.config.n_points,
            self.config.decimals_diff,
        )?;
        Ok(())
    }

    /// Mark-to-market value in quote
    pub fn capital(&self) -> f64 {
        self.quote + self.base * self.spot_price
    }

    /// Re-center the ladder on the current price and realize the performance fee.
    ///
    /// The fee is charged on the gain over the capital recorded at the previous
    /// rebalance only. Returns the fee taken.
    pub fn rebalance(&mut self) -> Result<f64, StrategyError> {
        self.update_ticks_grid()?;

        let mut capital = self.capital();
        let generated_fees = if capital > self.open_capital {
            (capital - self.open_capital) * self.config.performance_fees
        } else {
            0.0
        };
        capital -= generated_fees;

        self.order_book.reset_reference_price(self.spot_price)?;
        self.order_book
            .build_book(capital, self.ticks_grid.clone())?;
        self.quote = capital / 2.0;
        self.base = self.quote / self.spot_price;
        self.open_price = self.spot_price;
        self.open_capital = capital;
        self.state = KandelState::Active;

        debug!(
            spot = self.spot_price,
            capital,
            fee = generated_fees,
            grid_len = self.ticks_grid.len(),
            "Rebalanced ladder"
        );

        Ok(generated_fees)
    }

    /// Pull every order and hold an inventory skewed by the trend since the
    /// last rebalance.
    pub fn exit(&mut self) {
        let ratio = self.spot_price / self.open_price - 1.0;
        let value = self.capital();
        let quote_share = if ratio > self.config.asymmetric_exit_threshold {
            0.25
        } else if ratio < -self.config.asymmetric_exit_threshold {
            0.75
        } else {
            0.5
        };

        self.quote = value * quote_share;
        self.base = value * (1.0 - quote_share) / self.spot_price;
        self.order_book.clear();
        self.state = KandelState::Exited;

        debug!(spot = self.spot_price, ratio, quote_share, "Exited ladder");
    }

    /// True when exit volatility is above the configured threshold
    pub fn should_exit(&self, exit_vol: f64) -> bool {
        exit_vol > self.config.exit_vol_threshold
    }

    /// Feed one observation: match the ladder, replenish fills, then check the exit gate.
    ///
    /// Does nothing but record the price while exited.
    pub fn update_kandel_state(
        &mut self,
        spot_price: f64,
        window_vol: f64,
        exit_vol: f64,
    ) -> Result<StepOutcome, StrategyError> {
        check_spot(spot_price)?;
        self.spot_price = spot_price;
        self.vol = window_vol;

        let mut outcome = StepOutcome::default();
        if self.state != KandelState::Active {
            return Ok(outcome);
        }

        outcome.fills = self.order_book.arbitrate(spot_price);
        if !outcome.fills.is_empty() {
            let delta = self.order_book.place_dual_offers(&outcome.fills)?;
            self.quote += delta.quote;
            self.base += delta.base;
            tracing::trace!(
                fills = outcome.fills.len(),
                quote = self.quote,
                base = self.base,
                "Replenished fills"
            );
        }

        if self.should_exit(exit_vol) {
            self.exit();
            outcome.exited = true;
        }

        Ok(outcome)
    }

    /// Strategy parameters
    pub fn config(&self) -> &KandelConfig {
        &self.config
    }

    /// Latest observed price
    pub fn spot_price(&self) -> f64 {
        self.spot_price
    }

    /// Quote inventory
    pub fn quote(&self) -> f64 {
        self.quote
    }

    /// Base inventory
    pub fn base(&self) -> f64 {
        self.base
    }

    /// Spot at the last rebalance
    pub fn open_price(&self) -> f64 {
        self.open_price
    }

    /// Post-fee capital at the last rebalance
    pub fn open_capital(&self) -> f64 {
        self.open_capital
    }

    /// Latest window volatility
    pub fn vol(&self) -> f64 {
        self.vol
    }

    /// Current tick grid
    pub fn ticks_grid(&self) -> &[i32] {
        &self.ticks_grid
    }

    /// The owned ladder
    pub fn order_book(&self) -> &OrderBook {
        &self.order_book
    }

    /// Current quoting state
    pub fn state(&self) -> KandelState {
        self.state
    }

    /// True while the ladder is live
    pub fn is_active(&self) -> bool {
        self.state == KandelState::Active
    }
}

fn check_spot(spot_price: f64) -> Result<(), StrategyError> {
    if spot_price > 0.0 && spot_price.is_finite() {
        Ok(())
    } else {
        Err(StrategyError::NonPositiveSpot(spot_price))
    }
}
