//! Simulation parameters and their validation.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// How a trade's profit or loss is sized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionSizing {
    /// A win adds `win_payoff`, a loss subtracts `loss_payoff`.
    #[default]
    FixedPayoff,

    /// Each trade risks `equity * risk_fraction`. A win adds the risk times
    /// the payoff ratio, a loss subtracts the risk. Compounds.
    /// `risk_fraction` lies in (0, 1).
    FractionalRisk { risk_fraction: f64 },
}

/// Caller-supplied parameters for one simulation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Trades per run.
    pub trade_count: usize,
    /// Probability that a single trade wins, in (0, 1).
    pub win_probability: f64,
    /// Amount gained on a win.
    pub win_payoff: f64,
    /// Amount lost on a loss, as a positive magnitude.
    pub loss_payoff: f64,
    pub starting_equity: f64,
    /// Independent Monte Carlo runs.
    pub run_count: usize,
    #[serde(default)]
    pub sizing: PositionSizing,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trade_count: 100,
            win_probability: 0.75,
            win_payoff: 3.0,
            loss_payoff: 1.0,
            starting_equity: 100.0,
            run_count: 100,
            sizing: PositionSizing::FixedPayoff,
        }
    }
}

impl SimulationConfig {
    /// Reject any parameter set the generator cannot simulate.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.trade_count == 0 {
            return Err(SimError::invalid("trade_count", "must be > 0"));
        }
        if self.run_count == 0 {
            return Err(SimError::invalid("run_count", "must be > 0"));
        }
        let p = self.win_probability;
        if !(p > 0.0 && p < 1.0) {
            return Err(SimError::invalid(
                "win_probability",
                format!("must lie in (0, 1), got {p}"),
            ));
        }
        check_positive("win_payoff", self.win_payoff)?;
        check_positive("loss_payoff", self.loss_payoff)?;
        check_positive("starting_equity", self.starting_equity)?;
        match self.sizing {
            PositionSizing::FixedPayoff => self.check_payoff_precision()?,
            PositionSizing::FractionalRisk { risk_fraction } => {
                // A full-equity loss ruins the account and later wins can no
                // longer move it.
                if !(risk_fraction > 0.0 && risk_fraction < 1.0) {
                    return Err(SimError::invalid(
                        "risk_fraction",
                        format!("must lie in (0, 1), got {risk_fraction}"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Fixed payoffs must still change equity at the largest balance a run
    /// can reach, otherwise f64 rounding swallows whole trades.
    fn check_payoff_precision(&self) -> Result<(), SimError> {
        let n = self.trade_count as f64;
        let highest = self.starting_equity + n * self.win_payoff;
        let lowest = self.starting_equity - n * self.loss_payoff;
        let magnitude = highest.abs().max(lowest.abs());
        if magnitude + self.win_payoff == magnitude {
            return Err(SimError::invalid(
                "win_payoff",
                format!("vanishes against equity of magnitude {magnitude}"),
            ));
        }
        if magnitude - self.loss_payoff == magnitude {
            return Err(SimError::invalid(
                "loss_payoff",
                format!("vanishes against equity of magnitude {magnitude}"),
            ));
        }
        Ok(())
    }

    /// Win payoff per unit of loss payoff.
    pub fn payoff_ratio(&self) -> f64 {
        self.win_payoff / self.loss_payoff
    }

    /// Deterministic content hash of this config (BLAKE3 over canonical JSON).
    ///
    /// Two configs with identical parameters hash identically, so artifacts
    /// from the same parameters and seed land in the same place.
    pub fn config_hash(&self) -> String {
        let canonical = serde_json::json!({
            "trade_count": self.trade_count,
            "win_probability": self.win_probability,
            "win_payoff": self.win_payoff,
            "loss_payoff": self.loss_payoff,
            "starting_equity": self.starting_equity,
            "run_count": self.run_count,
            "sizing": self.sizing,
        });
        blake3::hash(canonical.to_string().as_bytes())
            .to_hex()
            .to_string()
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), SimError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SimError::invalid(
            field,
            format!("must be finite and > 0, got {value}"),
        ));
    }
    Ok(())
}
