//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for simulation results:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: every run's equity curve, plus the mean/median bands, for plotting tools
//! - **Markdown**: human-readable statistics table
//!
//! JSON keeps fractions as fractions. Percentages appear only in Markdown.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;
use tradesim_core::{EquityBands, EquityCurve, PositionSizing, RatioValue};

use crate::runner::{SimulationResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `SimulationResult` to pretty JSON.
pub fn export_json(result: &SimulationResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize SimulationResult to JSON")
}

/// Deserialize a `SimulationResult` from JSON.
///
/// Rejects unknown schema versions and results whose curves or summaries do
/// not match the recorded config.
pub fn import_json(json: &str) -> Result<SimulationResult> {
    let result: SimulationResult =
        serde_json::from_str(json).context("failed to deserialize SimulationResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    result
        .check_shape()
        .context("imported SimulationResult is inconsistent")?;
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export all curves as one wide CSV: `trade_index, run_0, run_1, ...`.
pub fn export_curves_csv(curves: &[EquityCurve]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = Vec::with_capacity(curves.len() + 1);
    header.push("trade_index".to_string());
    header.extend((0..curves.len()).map(|i| format!("run_{i}")));
    wtr.write_record(&header)?;

    let len = curves.iter().map(EquityCurve::len).max().unwrap_or(0);
    for i in 0..len {
        let mut row = Vec::with_capacity(curves.len() + 1);
        row.push(i.to_string());
        for curve in curves {
            row.push(
                curve
                    .points()
                    .get(i)
                    .map(|v| format!("{v:.4}"))
                    .unwrap_or_default(),
            );
        }
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the mean/median bands as CSV with trade_index, mean, median columns.
pub fn export_bands_csv(bands: &EquityBands) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["trade_index", "mean", "median"])?;
    for (i, (mean, median)) in bands.mean.iter().zip(&bands.median).enumerate() {
        wtr.write_record([
            &i.to_string(),
            &format!("{mean:.4}"),
            &format!("{median:.4}"),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a simulation.
///
/// Creates a directory named `{config_hash[..12]}_{seed}/` under `output_dir`
/// containing:
/// - `manifest.json`: the full `SimulationResult`
/// - `curves.csv`: every run's equity curve
/// - `bands.csv`: mean/median equity per trade index
/// - `report.md`: the statistics table
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &SimulationResult, output_dir: &Path) -> Result<PathBuf> {
    let short_hash: String = result.config_hash.chars().take(12).collect();
    let run_dir = output_dir.join(format!("{short_hash}_{}", result.seed));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write_artifact(&run_dir.join("manifest.json"), &export_json(result)?)?;
    write_artifact(&run_dir.join("curves.csv"), &export_curves_csv(&result.curves)?)?;
    write_artifact(&run_dir.join("bands.csv"), &export_bands_csv(&result.bands)?)?;
    write_artifact(&run_dir.join("report.md"), &generate_report(result))?;

    Ok(run_dir)
}

/// Load a `SimulationResult` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<SimulationResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote artifact");
    Ok(())
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report: parameters, then the statistics table.
pub fn generate_report(result: &SimulationResult) -> String {
    let cfg = &result.config;
    let r = &result.report;
    let mut md = String::with_capacity(2048);

    md.push_str("# Trade Simulation Report\n\n");

    md.push_str("## Parameters\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Starting equity | {:.2} |\n", cfg.starting_equity));
    md.push_str(&format!("| Win probability | {} |\n", pct(cfg.win_probability)));
    md.push_str(&format!(
        "| Payoff (win / loss) | {:.2} / {:.2} |\n",
        cfg.win_payoff, cfg.loss_payoff
    ));
    md.push_str(&format!("| Sizing | {} |\n", sizing_label(&cfg.sizing)));
    md.push_str(&format!("| Trades per run | {} |\n", cfg.trade_count));
    md.push_str(&format!("| Runs | {} |\n", cfg.run_count));
    md.push_str(&format!("| Seed | {} |\n", result.seed));
    md.push_str(&format!("| Config hash | {} |\n", result.config_hash));
    md.push('\n');

    md.push_str("## Statistics\n\n");
    md.push_str("| Statistic | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Kelly | {} |\n", pct(r.kelly_fraction)));
    md.push_str(&format!(
        "| Expectancy | {:.2} per trade ({:.2} R) |\n",
        r.expectancy, r.expectancy_r
    ));
    md.push_str(&format!(
        "| Max drawdown (run 0) | {} ({:.2}) |\n",
        pct(r.max_drawdown.fraction),
        r.max_drawdown.absolute
    ));
    md.push_str(&format!(
        "| Biggest max drawdown | {} ({:.2}, run {}) |\n",
        pct(r.worst_max_drawdown.fraction),
        r.worst_max_drawdown.absolute,
        r.worst_max_drawdown.run
    ));
    md.push_str(&format!("| Avg. max drawdown | {} |\n", pct(r.avg_max_drawdown)));
    md.push_str(&format!(
        "| Min / Max equity | {:.2} / {:.2} |\n",
        r.min_equity, r.max_equity
    ));
    md.push_str(&format!(
        "| Min / Max final equity | {:.2} / {:.2} |\n",
        r.min_final_equity, r.max_final_equity
    ));
    md.push_str(&format!(
        "| Avg. performance | {} ({:.2}) |\n",
        pct(r.avg_performance.fraction),
        r.avg_performance.absolute
    ));
    md.push_str(&format!(
        "| Median performance | {} ({:.2}) |\n",
        pct(r.median_performance.fraction),
        r.median_performance.absolute
    ));
    md.push_str(&format!(
        "| Return on max drawdown | {} |\n",
        ratio_label(&r.return_on_max_drawdown)
    ));
    md.push_str(&format!(
        "| Max consecutive winner | {} |\n",
        r.max_consecutive_winner
    ));
    md.push_str(&format!(
        "| Max consecutive loser | {} |\n",
        r.max_consecutive_loser
    ));

    md
}

fn pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

fn ratio_label(ratio: &RatioValue) -> String {
    match ratio {
        RatioValue::Finite(v) => format!("{v:.2}"),
        RatioValue::Undefined => "undefined".to_string(),
    }
}

fn sizing_label(sizing: &PositionSizing) -> String {
    match sizing {
        PositionSizing::FixedPayoff => "fixed payoff".to_string(),
        PositionSizing::FractionalRisk { risk_fraction } => {
            format!("{} of equity at risk", pct(*risk_fraction))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pct_formats_fraction() {
        assert_eq!(pct(0.6667), "66.67%");
        assert_eq!(pct(-0.05), "-5.00%");
    }

    #[test]
    fn ratio_label_undefined() {
        assert_eq!(ratio_label(&RatioValue::Undefined), "undefined");
        assert_eq!(ratio_label(&RatioValue::Finite(2.346)), "2.35");
    }

    #[test]
    fn curves_csv_layout() {
        let curves = vec![
            EquityCurve::from_points(vec![100.0, 103.0, 102.0]),
            EquityCurve::from_points(vec![100.0, 99.0, 102.0]),
        ];
        let csv = export_curves_csv(&curves).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "trade_index,run_0,run_1");
        assert_eq!(lines[1], "0,100.0000,100.0000");
        assert_eq!(lines[2], "1,103.0000,99.0000");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn bands_csv_layout() {
        let bands = EquityBands {
            mean: vec![100.0, 101.0],
            median: vec![100.0, 103.0],
        };
        let csv = export_bands_csv(&bands).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "trade_index,mean,median");
        assert_eq!(lines[2], "1,101.0000,103.0000");
    }
}
