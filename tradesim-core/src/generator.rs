//! Trial generator: Bernoulli trade sequences folded into equity curves.
//!
//! The random source is always injected. `TrialGenerator::runs` draws every
//! run from one caller-owned RNG; `TrialGenerator::runs_seeded` gives each run
//! index its own stream from an [`RngHierarchy`], which is what parallel
//! callers use to get output independent of scheduling.

use rand::Rng;

use crate::config::SimulationConfig;
use crate::curve::{apply_trade, EquityCurve, TradeOutcome};
use crate::error::SimError;
use crate::rng::RngHierarchy;

/// A validated config ready to produce curves.
#[derive(Debug, Clone)]
pub struct TrialGenerator {
    config: SimulationConfig,
}

impl TrialGenerator {
    /// Validate `config` once up front. No curve is produced on failure.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self { config: *config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Draw one trade outcome.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> TradeOutcome {
        if rng.gen::<f64>() < self.config.win_probability {
            TradeOutcome::Win
        } else {
            TradeOutcome::Loss
        }
    }

    /// Generate one run, keeping the drawn outcomes beside the curve.
    ///
    /// The outcomes are authoritative for streaks: a step's sign cannot tell
    /// a win from a loss once rounding or ruin stops equity from moving.
    pub fn trial<R: Rng + ?Sized>(&self, rng: &mut R) -> (EquityCurve, Vec<TradeOutcome>) {
        let cfg = &self.config;
        let mut points = Vec::with_capacity(cfg.trade_count + 1);
        let mut outcomes = Vec::with_capacity(cfg.trade_count);
        let mut equity = cfg.starting_equity;
        points.push(equity);
        for _ in 0..cfg.trade_count {
            let outcome = self.draw(rng);
            equity = apply_trade(cfg, equity, outcome);
            points.push(equity);
            outcomes.push(outcome);
        }
        (EquityCurve::from_points(points), outcomes)
    }

    /// Generate a single curve of `trade_count + 1` points.
    pub fn curve<R: Rng + ?Sized>(&self, rng: &mut R) -> EquityCurve {
        self.trial(rng).0
    }

    /// Generate `run_count` curves sequentially from one RNG.
    pub fn runs<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<EquityCurve> {
        (0..self.config.run_count).map(|_| self.curve(rng)).collect()
    }

    /// Generate the curve for one run index from its own hierarchy stream.
    pub fn run_seeded(&self, hierarchy: &RngHierarchy, run_index: usize) -> EquityCurve {
        self.trial_seeded(hierarchy, run_index).0
    }

    /// [`trial`](Self::trial) for one run index from its own hierarchy stream.
    pub fn trial_seeded(
        &self,
        hierarchy: &RngHierarchy,
        run_index: usize,
    ) -> (EquityCurve, Vec<TradeOutcome>) {
        let mut rng = hierarchy.rng_for_run(run_index as u64);
        self.trial(&mut rng)
    }

    /// Generate `run_count` curves, each from its own hierarchy stream.
    pub fn runs_seeded(&self, hierarchy: &RngHierarchy) -> Vec<EquityCurve> {
        (0..self.config.run_count)
            .map(|i| self.run_seeded(hierarchy, i))
            .collect()
    }
}

/// Validate `config` and generate `run_count` curves from `rng`.
pub fn generate_runs<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<Vec<EquityCurve>, SimError> {
    Ok(TrialGenerator::new(config)?.runs(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small() -> SimulationConfig {
        SimulationConfig {
            trade_count: 20,
            run_count: 8,
            ..Default::default()
        }
    }

    #[test]
    fn shape_matches_config() {
        let mut rng = StdRng::seed_from_u64(1);
        let runs = generate_runs(&small(), &mut rng).unwrap();
        assert_eq!(runs.len(), 8);
        for curve in &runs {
            assert_eq!(curve.len(), 21);
            assert_eq!(curve.starting_equity(), Some(100.0));
        }
    }

    #[test]
    fn steps_are_exact_payoffs() {
        let mut rng = StdRng::seed_from_u64(2);
        let runs = generate_runs(&small(), &mut rng).unwrap();
        for curve in &runs {
            for w in curve.points().windows(2) {
                assert!(w[1] == w[0] + 3.0 || w[1] == w[0] - 1.0);
            }
        }
    }

    #[test]
    fn same_seed_same_curves() {
        let a = generate_runs(&small(), &mut StdRng::seed_from_u64(9)).unwrap();
        let b = generate_runs(&small(), &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_config_produces_nothing() {
        let cfg = SimulationConfig {
            win_probability: 1.0,
            ..small()
        };
        let err = generate_runs(&cfg, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig { .. }));
    }

    #[test]
    fn seeded_runs_are_index_addressable() {
        let generator = TrialGenerator::new(&small()).unwrap();
        let hierarchy = RngHierarchy::new(42);
        let all = generator.runs_seeded(&hierarchy);
        assert_eq!(all[5], generator.run_seeded(&hierarchy, 5));
        assert_ne!(all[0], all[1]);
    }

    #[test]
    fn win_rate_tracks_probability() {
        let cfg = SimulationConfig {
            trade_count: 10_000,
            run_count: 1,
            win_probability: 0.3,
            ..Default::default()
        };
        let generator = TrialGenerator::new(&cfg).unwrap();
        let curve = generator.curve(&mut StdRng::seed_from_u64(11));
        let wins = curve.outcomes().filter(|o| o.is_win()).count();
        let rate = wins as f64 / 10_000.0;
        assert!((rate - 0.3).abs() < 0.03, "win rate {rate}");
    }

    #[test]
    fn trial_outcomes_replay_to_the_same_curve() {
        let generator = TrialGenerator::new(&small()).unwrap();
        let (curve, outcomes) = generator.trial_seeded(&RngHierarchy::new(3), 2);
        assert_eq!(outcomes.len(), 20);
        assert_eq!(curve, EquityCurve::from_outcomes(&small(), &outcomes));
        assert_eq!(curve, generator.run_seeded(&RngHierarchy::new(3), 2));
    }
}
