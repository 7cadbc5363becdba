//! tradesim CLI: Monte Carlo trade simulation and position sizing.
//!
//! Commands:
//! - `run`: simulate many trade sequences and print the risk report
//! - `kelly`: print Kelly fraction and expectancy for a payoff profile

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tradesim_core::{expectancy, expectancy_r, kelly_fraction, PositionSizing};
use tradesim_runner::{
    run_simulation, save_artifacts, OutputFormat, ReportSink, RunnerConfig, WriterSink,
};

#[derive(Parser)]
#[command(
    name = "tradesim",
    version,
    about = "tradesim: Monte Carlo simulator for fixed-odds trade sequences"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate many trade sequences and report risk statistics.
    Run {
        /// Path to a TOML config file. Flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Trades per run.
        #[arg(long)]
        trades: Option<usize>,

        /// Probability that a trade wins, strictly between 0 and 1.
        #[arg(long)]
        win_prob: Option<f64>,

        /// Amount gained on a win.
        #[arg(long)]
        win_payoff: Option<f64>,

        /// Amount lost on a loss.
        #[arg(long)]
        loss_payoff: Option<f64>,

        /// Equity before the first trade.
        #[arg(long)]
        start_equity: Option<f64>,

        /// Number of independent runs.
        #[arg(long)]
        runs: Option<usize>,

        /// Risk this fraction of current equity per trade instead of fixed payoffs.
        #[arg(long)]
        risk_fraction: Option<f64>,

        /// Master seed. Defaults to the config file's seed, or 42.
        #[arg(long)]
        seed: Option<u64>,

        /// Print the report and representative curve as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Save manifest, CSVs and report under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Kelly fraction and expectancy for a payoff profile.
    Kelly {
        #[arg(long)]
        win_prob: f64,

        #[arg(long)]
        win_payoff: f64,

        #[arg(long, default_value_t = 1.0)]
        loss_payoff: f64,

        /// Print as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Overrides applied on top of a loaded or default config.
struct RunOverrides {
    trades: Option<usize>,
    win_prob: Option<f64>,
    win_payoff: Option<f64>,
    loss_payoff: Option<f64>,
    start_equity: Option<f64>,
    runs: Option<usize>,
    risk_fraction: Option<f64>,
    seed: Option<u64>,
}

impl RunOverrides {
    fn apply(self, mut config: RunnerConfig) -> RunnerConfig {
        let sim = &mut config.simulation;
        if let Some(v) = self.trades {
            sim.trade_count = v;
        }
        if let Some(v) = self.win_prob {
            sim.win_probability = v;
        }
        if let Some(v) = self.win_payoff {
            sim.win_payoff = v;
        }
        if let Some(v) = self.loss_payoff {
            sim.loss_payoff = v;
        }
        if let Some(v) = self.start_equity {
            sim.starting_equity = v;
        }
        if let Some(v) = self.runs {
            sim.run_count = v;
        }
        if let Some(risk_fraction) = self.risk_fraction {
            sim.sizing = PositionSizing::FractionalRisk { risk_fraction };
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            trades,
            win_prob,
            win_payoff,
            loss_payoff,
            start_equity,
            runs,
            risk_fraction,
            seed,
            json,
            output_dir,
        } => {
            let overrides = RunOverrides {
                trades,
                win_prob,
                win_payoff,
                loss_payoff,
                start_equity,
                runs,
                risk_fraction,
                seed,
            };
            run_cmd(config, overrides, json, output_dir)
        }
        Commands::Kelly {
            win_prob,
            win_payoff,
            loss_payoff,
            json,
        } => kelly_cmd(win_prob, win_payoff, loss_payoff, json),
    }
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tradesim=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_cmd(
    config_path: Option<PathBuf>,
    overrides: RunOverrides,
    json: bool,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let base = match &config_path {
        Some(path) => RunnerConfig::from_file(path)?,
        None => RunnerConfig::default(),
    };
    let config = overrides.apply(base);

    let result = run_simulation(&config, None)?;

    let format = if json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    WriterSink::stdout(format).publish(&result)?;

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&result, &dir)?;
        info!(path = %run_dir.display(), "artifacts saved");
    }

    Ok(())
}

fn kelly_cmd(win_prob: f64, win_payoff: f64, loss_payoff: f64, json: bool) -> Result<()> {
    let kelly = kelly_fraction(win_prob, win_payoff, loss_payoff)?;
    let per_trade = expectancy(win_prob, win_payoff, loss_payoff);
    let per_r = expectancy_r(win_prob, win_payoff, loss_payoff)?;

    if json {
        let payload = serde_json::json!({
            "kellyFraction": kelly,
            "expectancy": per_trade,
            "expectancyR": per_r,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("Kelly fraction: {:.2}%", kelly * 100.0);
        println!("Expectancy:     {per_trade:.4} per trade");
        println!("Expectancy (R): {per_r:.4}");
    }
    Ok(())
}
