//! kandel-backtest: Backtester for the Kandel ladder market-making strategy
//!
//! This library provides the core components for:
//! - Tick math and the geometric order ladder
//! - The Kandel controller with volatility-sized grids and exits
//! - Price loading, volatility estimation and sample splitting
//! - Single and parallel multi-sample backtests with analytics
//! - Logging and metrics

pub mod backtest;
pub mod book;
pub mod cli;
pub mod config;
pub mod data;
pub mod model;
pub mod strategy;
pub mod telemetry;
