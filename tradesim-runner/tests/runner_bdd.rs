//! BDD tests for the runner: config files, artifacts, sinks, cancellation.

use std::sync::atomic::AtomicBool;

use tradesim_core::{PositionSizing, RatioValue, SimulationConfig};
use tradesim_runner::{
    export_json, import_json, load_artifacts, run_from_file, run_simulation, save_artifacts,
    ReportSink, RunError, RunnerConfig, SimulationResult, SCHEMA_VERSION,
};

fn small_config(seed: u64) -> RunnerConfig {
    RunnerConfig::new(
        SimulationConfig {
            trade_count: 40,
            run_count: 12,
            ..Default::default()
        },
        seed,
    )
}

/// Keeps every published result for inspection.
#[derive(Default)]
struct RecordingSink {
    received: Vec<SimulationResult>,
}

impl ReportSink for RecordingSink {
    fn publish(&mut self, result: &SimulationResult) -> anyhow::Result<()> {
        self.received.push(result.clone());
        Ok(())
    }
}

#[test]
fn bdd_scenario_same_seed_reproduces_everything() {
    // GIVEN one config run twice with the same seed
    let config = small_config(2024);

    // WHEN both runs complete
    let first = run_simulation(&config, None).expect("first run should succeed");
    let second = run_simulation(&config, None).expect("second run should succeed");

    // THEN curves, summaries and report are identical
    assert_eq!(first.curves, second.curves);
    assert_eq!(first.summaries, second.summaries);
    assert_eq!(first.report, second.report);
    assert_eq!(first.config_hash, second.config_hash);
}

#[test]
fn bdd_scenario_different_seeds_diverge() {
    let a = run_simulation(&small_config(1), None).unwrap();
    let b = run_simulation(&small_config(2), None).unwrap();

    // Same parameters hash the same regardless of seed
    assert_eq!(a.config_hash, b.config_hash);
    assert_ne!(a.curves, b.curves);
}

#[test]
fn bdd_scenario_run_from_toml_file() {
    // GIVEN a TOML file with fractional sizing
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sim.toml");
    std::fs::write(
        &path,
        r#"
seed = 11

[simulation]
trade_count = 25
win_probability = 0.55
win_payoff = 2.0
loss_payoff = 1.0
starting_equity = 1000.0
run_count = 8

[simulation.sizing]
type = "FRACTIONAL_RISK"
risk_fraction = 0.05
"#,
    )
    .unwrap();

    // WHEN it is run
    let result = run_from_file(&path, None).expect("file run should succeed");

    // THEN the parameters flow through
    assert_eq!(result.seed, 11);
    assert_eq!(
        result.config.sizing,
        PositionSizing::FractionalRisk {
            risk_fraction: 0.05
        }
    );
    assert_eq!(result.curves.len(), 8);
    assert!(result.curves.iter().all(|c| c.len() == 26));

    // AND risking 5% per trade never takes equity to zero within 25 trades
    assert!(result.report.min_equity > 0.0);
}

#[test]
fn bdd_scenario_save_and_load_artifacts() {
    // GIVEN a completed simulation
    let result = run_simulation(&small_config(3), None).unwrap();
    let out = tempfile::tempdir().unwrap();

    // WHEN artifacts are saved
    let dir = save_artifacts(&result, out.path()).expect("save should succeed");

    // THEN the directory is named by hash prefix and seed
    let name = dir.file_name().unwrap().to_string_lossy().to_string();
    assert_eq!(name, format!("{}_3", &result.config_hash[..12]));

    // AND every artifact is present
    for file in ["manifest.json", "curves.csv", "bands.csv", "report.md"] {
        assert!(dir.join(file).exists(), "missing {file}");
    }

    // AND the curves CSV has one row per trade index plus a header
    let curves_csv = std::fs::read_to_string(dir.join("curves.csv")).unwrap();
    assert_eq!(curves_csv.lines().count(), 42);
    assert!(curves_csv.starts_with("trade_index,run_0,run_1"));

    // AND the manifest loads back to the same result
    let loaded = load_artifacts(&dir).expect("load should succeed");
    assert_eq!(loaded.curves, result.curves);
    assert_eq!(loaded.report, result.report);
    assert_eq!(loaded.schema_version, SCHEMA_VERSION);
}

#[test]
fn bdd_scenario_undefined_ratio_survives_json() {
    // GIVEN a report whose return on max drawdown is undefined
    let mut result = run_simulation(&small_config(4), None).unwrap();
    result.report.return_on_max_drawdown = RatioValue::Undefined;

    // WHEN exported and imported
    let json = export_json(&result).unwrap();
    let back = import_json(&json).unwrap();

    // THEN the undefined marker is preserved
    assert!(json.contains("\"undefined\""));
    assert_eq!(back.report.return_on_max_drawdown, RatioValue::Undefined);
}

#[test]
fn bdd_scenario_fractional_payoffs_reload_bit_for_bit() {
    // GIVEN payoffs that are not exact in binary
    let config = RunnerConfig::new(
        SimulationConfig {
            trade_count: 60,
            run_count: 20,
            win_payoff: 1.7,
            loss_payoff: 0.9,
            win_probability: 0.55,
            ..Default::default()
        },
        77,
    );
    let result = run_simulation(&config, None).unwrap();
    let out = tempfile::tempdir().unwrap();

    // WHEN the artifacts are saved and loaded back
    let dir = save_artifacts(&result, out.path()).unwrap();
    let loaded = load_artifacts(&dir).unwrap();

    // THEN every curve point and statistic is unchanged
    assert_eq!(loaded.curves, result.curves);
    assert_eq!(loaded.summaries, result.summaries);
    assert_eq!(loaded.bands, result.bands);
    assert_eq!(loaded.report, result.report);
    assert_eq!(loaded.config, result.config);
}

#[test]
fn bdd_scenario_manifest_without_curves_rejected() {
    // GIVEN an exported result whose curves were stripped
    let result = run_simulation(&small_config(9), None).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&export_json(&result).unwrap()).unwrap();
    value["curves"] = serde_json::json!([]);

    // WHEN it is imported
    let err = import_json(&value.to_string()).unwrap_err();

    // THEN import fails instead of handing sinks an empty result
    assert!(err.to_string().contains("inconsistent"));
}

#[test]
fn bdd_scenario_manifest_with_missing_run_rejected() {
    let result = run_simulation(&small_config(10), None).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&export_json(&result).unwrap()).unwrap();
    value["curves"].as_array_mut().unwrap().pop();

    assert!(import_json(&value.to_string()).is_err());
}

#[test]
fn bdd_scenario_newer_schema_rejected() {
    let result = run_simulation(&small_config(5), None).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&export_json(&result).unwrap()).unwrap();
    value["schema_version"] = serde_json::json!(SCHEMA_VERSION + 1);

    let err = import_json(&value.to_string()).unwrap_err();
    assert!(err.to_string().contains("unsupported schema version"));
}

#[test]
fn bdd_scenario_sink_receives_representative_curve() {
    // GIVEN a recording sink
    let mut sink = RecordingSink::default();
    let result = run_simulation(&small_config(6), None).unwrap();

    // WHEN the result is published
    sink.publish(&result).unwrap();

    // THEN the sink sees run 0 and the report
    assert_eq!(sink.received.len(), 1);
    let got = &sink.received[0];
    assert_eq!(got.representative_curve(), Some(&result.curves[0]));
    assert_eq!(got.report.run_count, 12);
}

#[test]
fn bdd_scenario_cancelled_run_yields_no_result() {
    // GIVEN a cancel flag already raised
    let cancel = AtomicBool::new(true);

    // WHEN a simulation is started
    let outcome = run_simulation(&small_config(7), Some(&cancel));

    // THEN it is cancelled with no partial output
    assert!(matches!(outcome, Err(RunError::Cancelled)));
}
