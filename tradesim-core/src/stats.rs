//! Statistics aggregator: reduces simulated curves into one report.
//!
//! Each curve is first reduced to a [`RunSummary`]; the report is an ordered
//! fold over summaries in generation-index order. Config-only metrics (Kelly,
//! expectancy) never look at a curve. Everything here is pure: no randomness,
//! no I/O.

use serde::de::{self, Deserializer, Unexpected};
use serde::{Deserialize, Serialize, Serializer};

use crate::config::SimulationConfig;
use crate::curve::{EquityCurve, Performance, TradeOutcome};
use crate::drawdown::{max_drawdown, Drawdown};
use crate::error::SimError;
use crate::streaks::longest_streak;

const RETURN_ON_MAX_DRAWDOWN: &str = "returnOnMaxDrawdown";

// ─── Config-only metrics ─────────────────────────────────────────────

/// Kelly fraction for a binary bet: `p - (1 - p) / (win / loss)`.
///
/// Fails when either payoff is zero, since the payoff ratio is then 0 or ∞.
pub fn kelly_fraction(
    win_probability: f64,
    win_payoff: f64,
    loss_payoff: f64,
) -> Result<f64, SimError> {
    if loss_payoff == 0.0 {
        return Err(SimError::DegenerateInput(
            "Kelly fraction undefined: loss payoff is zero".into(),
        ));
    }
    let ratio = win_payoff / loss_payoff;
    if ratio == 0.0 || !ratio.is_finite() {
        return Err(SimError::DegenerateInput(format!(
            "Kelly fraction undefined: payoff ratio is {ratio}"
        )));
    }
    Ok(win_probability - (1.0 - win_probability) / ratio)
}

/// Expected profit or loss per trade, in currency.
pub fn expectancy(win_probability: f64, win_payoff: f64, loss_payoff: f64) -> f64 {
    win_probability * win_payoff - (1.0 - win_probability) * loss_payoff
}

/// Expected profit per unit of loss risked: `p * (win / loss) - (1 - p)`.
pub fn expectancy_r(
    win_probability: f64,
    win_payoff: f64,
    loss_payoff: f64,
) -> Result<f64, SimError> {
    if loss_payoff == 0.0 {
        return Err(SimError::DegenerateInput(
            "expectancy per unit risk undefined: loss payoff is zero".into(),
        ));
    }
    Ok(win_probability * (win_payoff / loss_payoff) - (1.0 - win_probability))
}

/// Average return divided by average max drawdown.
pub fn return_on_max_drawdown(avg_return: f64, avg_max_drawdown: f64) -> Result<f64, SimError> {
    if avg_max_drawdown == 0.0 {
        return Err(SimError::UndefinedRatio {
            metric: RETURN_ON_MAX_DRAWDOWN,
        });
    }
    Ok(avg_return / avg_max_drawdown)
}

// ─── Report types ────────────────────────────────────────────────────

/// A ratio that may have no value because its denominator is zero.
///
/// Serializes as a bare number or the string `"undefined"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatioValue {
    Finite(f64),
    Undefined,
}

const UNDEFINED: &str = "undefined";

impl RatioValue {
    pub fn value(&self) -> Option<f64> {
        match *self {
            RatioValue::Finite(v) => Some(v),
            RatioValue::Undefined => None,
        }
    }
}

impl Serialize for RatioValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            RatioValue::Finite(v) => serializer.serialize_f64(v),
            RatioValue::Undefined => serializer.serialize_str(UNDEFINED),
        }
    }
}

impl<'de> Deserialize<'de> for RatioValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Marker(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(RatioValue::Finite(v)),
            Repr::Marker(m) if m == UNDEFINED => Ok(RatioValue::Undefined),
            Repr::Marker(m) => Err(de::Error::invalid_value(
                Unexpected::Str(&m),
                &"a number or \"undefined\"",
            )),
        }
    }
}

impl From<Result<f64, SimError>> for RatioValue {
    fn from(result: Result<f64, SimError>) -> Self {
        result.map_or(RatioValue::Undefined, RatioValue::Finite)
    }
}

/// The deepest drawdown across all runs and which run produced it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorstDrawdown {
    pub fraction: f64,
    pub absolute: f64,
    pub run: usize,
}

/// Per-run reduction of one equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub final_equity: f64,
    pub performance: Performance,
    pub max_drawdown: Drawdown,
    pub longest_win_streak: usize,
    pub longest_loss_streak: usize,
    pub min_equity: f64,
    pub max_equity: f64,
}

impl RunSummary {
    /// Summarize a curve alone, recovering outcomes from the sign of each step.
    ///
    /// Prefer [`from_trial`](Self::from_trial) when the drawn outcomes are at
    /// hand: a step that rounding or ruin flattened to zero reads as a loss.
    pub fn from_curve(curve: &EquityCurve) -> Result<Self, SimError> {
        let outcomes: Vec<TradeOutcome> = curve.outcomes().collect();
        Self::from_trial(curve, &outcomes)
    }

    /// Summarize a curve together with the outcomes that produced it.
    pub fn from_trial(curve: &EquityCurve, outcomes: &[TradeOutcome]) -> Result<Self, SimError> {
        let (min_equity, max_equity) = curve
            .extrema()
            .ok_or_else(|| SimError::DegenerateInput("equity curve has no points".into()))?;
        if outcomes.len() != curve.trade_count() {
            return Err(SimError::DegenerateInput(format!(
                "{} outcomes for a curve of {} trades",
                outcomes.len(),
                curve.trade_count()
            )));
        }
        let final_equity = curve.final_equity().unwrap_or(min_equity);
        Ok(Self {
            final_equity,
            performance: curve.performance(),
            max_drawdown: max_drawdown(curve.points()),
            longest_win_streak: longest_streak(outcomes.iter().copied(), TradeOutcome::Win),
            longest_loss_streak: longest_streak(outcomes.iter().copied(), TradeOutcome::Loss),
            min_equity,
            max_equity,
        })
    }
}

/// Risk and performance metrics for one simulation request.
///
/// - `max_drawdown` belongs to run 0, the representative run.
/// - `min_equity`/`max_equity` span every point of every run;
///   `min_final_equity`/`max_final_equity` span final values only.
/// - Streaks are the maximum over all runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub run_count: usize,
    pub trade_count: usize,
    pub kelly_fraction: f64,
    pub expectancy: f64,
    pub expectancy_r: f64,
    pub max_drawdown: Drawdown,
    pub worst_max_drawdown: WorstDrawdown,
    pub avg_max_drawdown: f64,
    pub min_equity: f64,
    pub max_equity: f64,
    pub min_final_equity: f64,
    pub max_final_equity: f64,
    pub avg_performance: Performance,
    pub median_performance: Performance,
    pub return_on_max_drawdown: RatioValue,
    pub max_consecutive_winner: usize,
    pub max_consecutive_loser: usize,
}

impl StatisticsReport {
    /// Fold per-run summaries, in generation order, into a report.
    pub fn from_summaries(
        summaries: &[RunSummary],
        config: &SimulationConfig,
    ) -> Result<Self, SimError> {
        let first = summaries
            .first()
            .ok_or_else(|| SimError::DegenerateInput("no runs to aggregate".into()))?;

        let p = config.win_probability;
        let kelly = kelly_fraction(p, config.win_payoff, config.loss_payoff)?;
        let exp_r = expectancy_r(p, config.win_payoff, config.loss_payoff)?;

        let mut worst = WorstDrawdown::default();
        let mut min_equity = f64::INFINITY;
        let mut max_equity = f64::NEG_INFINITY;
        let mut min_final = f64::INFINITY;
        let mut max_final = f64::NEG_INFINITY;
        let mut max_winner = 0;
        let mut max_loser = 0;
        let mut dd_fractions = Vec::with_capacity(summaries.len());
        let mut ret_fractions = Vec::with_capacity(summaries.len());
        let mut ret_absolutes = Vec::with_capacity(summaries.len());

        for (run, s) in summaries.iter().enumerate() {
            if s.max_drawdown.fraction > worst.fraction {
                worst = WorstDrawdown {
                    fraction: s.max_drawdown.fraction,
                    absolute: s.max_drawdown.absolute,
                    run,
                };
            }
            min_equity = min_equity.min(s.min_equity);
            max_equity = max_equity.max(s.max_equity);
            min_final = min_final.min(s.final_equity);
            max_final = max_final.max(s.final_equity);
            max_winner = max_winner.max(s.longest_win_streak);
            max_loser = max_loser.max(s.longest_loss_streak);
            dd_fractions.push(s.max_drawdown.fraction);
            ret_fractions.push(s.performance.fraction);
            ret_absolutes.push(s.performance.absolute);
        }

        let avg_max_drawdown = mean(&dd_fractions);
        let avg_performance = Performance {
            fraction: mean(&ret_fractions),
            absolute: mean(&ret_absolutes),
        };
        let median_performance = Performance {
            fraction: median(&ret_fractions),
            absolute: median(&ret_absolutes),
        };

        Ok(Self {
            run_count: summaries.len(),
            trade_count: config.trade_count,
            kelly_fraction: kelly,
            expectancy: expectancy(p, config.win_payoff, config.loss_payoff),
            expectancy_r: exp_r,
            max_drawdown: first.max_drawdown,
            worst_max_drawdown: worst,
            avg_max_drawdown,
            min_equity,
            max_equity,
            min_final_equity: min_final,
            max_final_equity: max_final,
            avg_performance,
            median_performance,
            return_on_max_drawdown: return_on_max_drawdown(
                avg_performance.fraction,
                avg_max_drawdown,
            )
            .into(),
            max_consecutive_winner: max_winner,
            max_consecutive_loser: max_loser,
        })
    }

    /// Return on max drawdown, or `UndefinedRatio` when no run ever drew down.
    pub fn return_on_max_drawdown_checked(&self) -> Result<f64, SimError> {
        self.return_on_max_drawdown
            .value()
            .ok_or(SimError::UndefinedRatio {
                metric: RETURN_ON_MAX_DRAWDOWN,
            })
    }
}

/// Reduce every curve and aggregate. Curves are taken in generation order.
pub fn compute_report(
    curves: &[EquityCurve],
    config: &SimulationConfig,
) -> Result<StatisticsReport, SimError> {
    let summaries = curves
        .iter()
        .map(RunSummary::from_curve)
        .collect::<Result<Vec<_>, _>>()?;
    StatisticsReport::from_summaries(&summaries, config)
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median; the mean of the two middle values for even counts.
pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
