//! Equity curve domain type and single-trade accounting.

use serde::{Deserialize, Serialize};

use crate::config::{PositionSizing, SimulationConfig};

/// Result of one binary trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeOutcome {
    Win,
    Loss,
}

impl TradeOutcome {
    pub fn is_win(self) -> bool {
        matches!(self, TradeOutcome::Win)
    }
}

/// Net return of a run, both as a fraction of starting equity and in currency.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Performance {
    pub fraction: f64,
    pub absolute: f64,
}

/// Ordered account balances: the starting equity followed by one value per trade.
///
/// The curve is the only persisted product of a run. [`EquityCurve::outcomes`]
/// recovers trade results from the sign of each step, which is exact only
/// while every trade actually moves equity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquityCurve(Vec<f64>);

impl EquityCurve {
    /// Wrap raw points. Index 0 is the starting equity.
    pub fn from_points(points: Vec<f64>) -> Self {
        Self(points)
    }

    /// Replay an explicit outcome sequence under `config`'s sizing rules.
    ///
    /// Does not validate `config`; scripted scenarios may use degenerate
    /// probabilities that the generator itself rejects.
    pub fn from_outcomes(config: &SimulationConfig, outcomes: &[TradeOutcome]) -> Self {
        let mut points = Vec::with_capacity(outcomes.len() + 1);
        let mut equity = config.starting_equity;
        points.push(equity);
        for &outcome in outcomes {
            equity = apply_trade(config, equity, outcome);
            points.push(equity);
        }
        Self(points)
    }

    pub fn points(&self) -> &[f64] {
        &self.0
    }

    pub fn into_points(self) -> Vec<f64> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of trades represented (one less than the point count).
    pub fn trade_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn starting_equity(&self) -> Option<f64> {
        self.0.first().copied()
    }

    pub fn final_equity(&self) -> Option<f64> {
        self.0.last().copied()
    }

    /// Per-trade equity changes.
    pub fn deltas(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.windows(2).map(|w| w[1] - w[0])
    }

    /// Outcomes recovered from the curve: a step is a win iff equity rose.
    /// A flat step reads as a loss.
    pub fn outcomes(&self) -> impl Iterator<Item = TradeOutcome> + '_ {
        self.deltas().map(|d| {
            if d > 0.0 {
                TradeOutcome::Win
            } else {
                TradeOutcome::Loss
            }
        })
    }

    /// Net return relative to the first point. Zero for curves shorter than two points.
    ///
    /// A curve starting at zero equity has no relative return: `fraction` is NaN.
    pub fn performance(&self) -> Performance {
        match (self.starting_equity(), self.final_equity()) {
            (Some(start), Some(end)) if self.0.len() >= 2 => {
                let absolute = end - start;
                let fraction = if start != 0.0 { absolute / start } else { f64::NAN };
                Performance { fraction, absolute }
            }
            _ => Performance::default(),
        }
    }

    /// Smallest and largest point on the curve.
    pub fn extrema(&self) -> Option<(f64, f64)> {
        let first = *self.0.first()?;
        Some(
            self.0
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }
}

impl AsRef<[f64]> for EquityCurve {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Equity after one trade under the config's sizing rule.
pub fn apply_trade(config: &SimulationConfig, equity: f64, outcome: TradeOutcome) -> f64 {
    match config.sizing {
        PositionSizing::FixedPayoff => match outcome {
            TradeOutcome::Win => equity + config.win_payoff,
            TradeOutcome::Loss => equity - config.loss_payoff,
        },
        PositionSizing::FractionalRisk { risk_fraction } => {
            let risk = equity * risk_fraction;
            match outcome {
                TradeOutcome::Win => equity + risk * config.payoff_ratio(),
                TradeOutcome::Loss => equity - risk,
            }
        }
    }
}
