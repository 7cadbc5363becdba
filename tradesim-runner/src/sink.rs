//! Display collaborators: where finished results are handed off.
//!
//! The runner never renders anything itself. A [`ReportSink`] receives the
//! representative curve and the report once a simulation completes.

use std::io::Write;

use anyhow::{Context, Result};

use crate::export::{export_json, generate_report};
use crate::runner::SimulationResult;

/// Receives a completed simulation for display.
pub trait ReportSink {
    fn publish(&mut self, result: &SimulationResult) -> Result<()>;
}

/// How [`WriterSink`] renders a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Markdown statistics table.
    #[default]
    Text,
    /// The report and representative curve as pretty JSON.
    Json,
    /// The full `SimulationResult` as pretty JSON.
    FullJson,
}

/// Writes each result to any `io::Write` (stdout in the CLI).
pub struct WriterSink<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<std::io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(std::io::stdout(), format)
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn publish(&mut self, result: &SimulationResult) -> Result<()> {
        let rendered = match self.format {
            OutputFormat::Text => generate_report(result),
            OutputFormat::Json => {
                let curve = result
                    .representative_curve()
                    .context("result has no representative curve")?;
                let payload = serde_json::json!({
                    "report": &result.report,
                    "curve": curve,
                });
                serde_json::to_string_pretty(&payload).context("failed to serialize report")?
            }
            OutputFormat::FullJson => export_json(result)?,
        };
        writeln!(self.writer, "{rendered}").context("failed to write report")?;
        self.writer.flush().context("failed to flush report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerConfig;
    use crate::runner::run_simulation;
    use tradesim_core::SimulationConfig;

    fn result() -> SimulationResult {
        let cfg = RunnerConfig::new(
            SimulationConfig {
                trade_count: 10,
                run_count: 3,
                ..Default::default()
            },
            42,
        );
        run_simulation(&cfg, None).unwrap()
    }

    #[test]
    fn text_sink_writes_markdown() {
        let mut sink = WriterSink::new(Vec::new(), OutputFormat::Text);
        sink.publish(&result()).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.starts_with("# Trade Simulation Report"));
        assert!(out.contains("| Kelly | 66.67% |"));
    }

    #[test]
    fn json_sink_writes_report_and_curve() {
        let res = result();
        let mut sink = WriterSink::new(Vec::new(), OutputFormat::Json);
        sink.publish(&res).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["curve"].as_array().unwrap().len(), 11);
        assert!(value["report"]["kellyFraction"].is_number());
    }

    #[test]
    fn json_sink_errors_without_curves() {
        let mut res = result();
        res.curves.clear();
        let mut sink = WriterSink::new(Vec::new(), OutputFormat::Json);
        let err = sink.publish(&res).unwrap_err();
        assert!(err.to_string().contains("no representative curve"));
        assert!(sink.into_inner().is_empty());
    }
}
