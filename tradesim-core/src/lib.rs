//! tradesim core: trial generator and risk-statistics engine.
//!
//! This crate contains the algorithmic part of the simulator:
//! - Simulation parameters and validation
//! - Equity curve domain type and per-trade accounting (fixed payoff or fractional risk)
//! - Deterministic RNG hierarchy (one independent stream per run index)
//! - Trial generator with an injected random source
//! - Drawdown trace, streaks, and the statistics aggregator
//! - Cross-run mean/median equity bands
//!
//! Nothing here performs I/O or reads global randomness.

pub mod bands;
pub mod config;
pub mod curve;
pub mod drawdown;
pub mod error;
pub mod generator;
pub mod rng;
pub mod stats;
pub mod streaks;

pub use bands::{compute_bands, EquityBands};
pub use config::{PositionSizing, SimulationConfig};
pub use curve::{EquityCurve, Performance, TradeOutcome};
pub use drawdown::{max_drawdown, Drawdown, DrawdownTrace};
pub use error::SimError;
pub use generator::{generate_runs, TrialGenerator};
pub use rng::RngHierarchy;
pub use stats::{
    compute_report, expectancy, expectancy_r, kelly_fraction, return_on_max_drawdown, RatioValue,
    RunSummary, StatisticsReport, WorstDrawdown,
};
