//! Simulation runner: parallel trial generation wired into the aggregator.
//!
//! Runs are generated and summarized on rayon's pool. Each run index draws
//! from its own stream of the [`RngHierarchy`], and the indexed collect keeps
//! generation order, so the result is identical to a sequential pass over
//! the same seed.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use tradesim_core::{
    compute_bands, EquityBands, EquityCurve, RngHierarchy, RunSummary, SimError,
    SimulationConfig, StatisticsReport, TrialGenerator,
};

use crate::config::{ConfigError, RunnerConfig};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("simulation error: {0}")]
    Simulation(#[from] SimError),
    #[error("simulation cancelled")]
    Cancelled,
}

/// Current schema version for persisted results.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete output of one simulation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config_hash: String,
    pub seed: u64,
    pub config: SimulationConfig,
    pub generated_at: DateTime<Utc>,
    pub report: StatisticsReport,
    pub bands: EquityBands,
    pub summaries: Vec<RunSummary>,
    pub curves: Vec<EquityCurve>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl SimulationResult {
    /// The curve handed to single-series displays: run 0, whose drawdown the report carries.
    ///
    /// `None` only for a result that was not produced by [`run_simulation`].
    pub fn representative_curve(&self) -> Option<&EquityCurve> {
        self.curves.first()
    }

    /// Check that the per-run vectors agree with the config.
    pub fn check_shape(&self) -> Result<(), SimError> {
        let runs = self.config.run_count;
        if self.curves.is_empty() {
            return Err(SimError::DegenerateInput("result has no curves".into()));
        }
        if self.curves.len() != runs || self.summaries.len() != runs {
            return Err(SimError::DegenerateInput(format!(
                "result has {} curves and {} summaries for {runs} runs",
                self.curves.len(),
                self.summaries.len()
            )));
        }
        let points = self.config.trade_count + 1;
        if let Some(run) = self.curves.iter().position(|c| c.len() != points) {
            return Err(SimError::DegenerateInput(format!(
                "run {run} has {} points, expected {points}",
                self.curves[run].len()
            )));
        }
        Ok(())
    }
}

/// Run a full simulation: generate every run, summarize, aggregate.
///
/// `cancel` is polled before each run starts. Once set, the remaining runs are
/// skipped and `RunError::Cancelled` is returned; no partial result escapes.
pub fn run_simulation(
    config: &RunnerConfig,
    cancel: Option<&AtomicBool>,
) -> Result<SimulationResult, RunError> {
    let started = Instant::now();
    let sim = &config.simulation;
    let generator = TrialGenerator::new(sim)?;
    let hierarchy = RngHierarchy::new(config.seed);

    info!(
        runs = sim.run_count,
        trades = sim.trade_count,
        seed = config.seed,
        "starting simulation"
    );

    let runs: Result<Vec<(EquityCurve, RunSummary)>, RunError> = (0..sim.run_count)
        .into_par_iter()
        .map(|i| {
            if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
                return Err(RunError::Cancelled);
            }
            let (curve, outcomes) = generator.trial_seeded(&hierarchy, i);
            let summary = RunSummary::from_trial(&curve, &outcomes)?;
            Ok((curve, summary))
        })
        .collect();
    if let Err(RunError::Cancelled) = &runs {
        warn!(seed = config.seed, "simulation cancelled");
    }
    let runs = runs?;

    let (curves, summaries): (Vec<_>, Vec<_>) = runs.into_iter().unzip();
    let report = StatisticsReport::from_summaries(&summaries, sim)?;
    let bands = compute_bands(&curves)?;

    info!(
        runs = summaries.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        avg_max_drawdown = report.avg_max_drawdown,
        "simulation complete"
    );

    Ok(SimulationResult {
        schema_version: SCHEMA_VERSION,
        config_hash: sim.config_hash(),
        seed: config.seed,
        config: *sim,
        generated_at: Utc::now(),
        report,
        bands,
        summaries,
        curves,
    })
}

/// Load a TOML config file and run it.
pub fn run_from_file(
    path: &Path,
    cancel: Option<&AtomicBool>,
) -> Result<SimulationResult, RunError> {
    let config = RunnerConfig::from_file(path)?;
    run_simulation(&config, cancel)
}
