//! tradesim runner: orchestration, config files, export, display sinks.
//!
//! This crate builds on `tradesim-core` to provide:
//! - TOML config loading with validation
//! - Parallel Monte Carlo runner with cooperative cancellation
//! - Result bundle with schema versioning
//! - JSON, CSV and Markdown export plus artifact directories
//! - `ReportSink` display boundary

pub mod config;
pub mod export;
pub mod runner;
pub mod sink;

pub use config::{ConfigError, RunnerConfig, DEFAULT_SEED};
pub use export::{
    export_bands_csv, export_curves_csv, export_json, generate_report, import_json,
    load_artifacts, save_artifacts,
};
pub use runner::{run_from_file, run_simulation, RunError, SimulationResult, SCHEMA_VERSION};
pub use sink::{OutputFormat, ReportSink, WriterSink};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn runner_config_is_send_sync() {
        assert_send::<RunnerConfig>();
        assert_sync::<RunnerConfig>();
    }

    #[test]
    fn simulation_result_is_send_sync() {
        assert_send::<SimulationResult>();
        assert_sync::<SimulationResult>();
    }

    #[test]
    fn run_error_is_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
