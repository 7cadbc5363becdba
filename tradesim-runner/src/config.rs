//! Runner configuration: a TOML file holding the seed and simulation parameters.
//!
//! ```toml
//! seed = 42
//!
//! [simulation]
//! trade_count = 100
//! win_probability = 0.75
//! win_payoff = 3.0
//! loss_payoff = 1.0
//! starting_equity = 100.0
//! run_count = 100
//!
//! [simulation.sizing]
//! type = "FRACTIONAL_RISK"
//! risk_fraction = 0.01
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tradesim_core::{SimError, SimulationConfig};

/// Seed used when a config file does not specify one.
pub const DEFAULT_SEED: u64 = 42;

/// Errors from loading or validating a runner config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Invalid(#[from] SimError),
}

/// Everything needed to reproduce one simulation: parameters plus master seed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            simulation: SimulationConfig::default(),
        }
    }
}

impl RunnerConfig {
    pub fn new(simulation: SimulationConfig, seed: u64) -> Self {
        Self { seed, simulation }
    }

    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RunnerConfig = toml::from_str(content)?;
        config.simulation.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
