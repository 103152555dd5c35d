//! gwf-audit: run the candidate audit pipelines and print the reports.
//!
//! ```text
//! gwf-audit                               # both pipelines, reference targets, demo data
//! gwf-audit --pipeline symmetry --json    # symmetry rows as JSON
//! gwf-audit --config audit.yaml --scenario data.yaml
//! gwf-audit --print-config > gwf.yaml
//! ```
//!
//! Only configuration problems exit non-zero. Missing or broken detector data
//! degrades the affected rows and is reported on stderr.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum, ValueHint};
use std::path::PathBuf;

use gwf_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use gwf_core::prelude::*;
use gwf_sim::{ScenarioConfig, SyntheticArchive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Pipeline {
    /// Single-detector event classification
    Events,
    /// Multi-detector asymmetry verdicts
    Symmetry,
    All,
}

#[derive(Debug, Parser)]
#[command(
    name = "gwf-audit",
    author,
    version,
    about = "Audit gravitational-wave candidates against magnetic and space-weather evidence"
)]
struct Cli {
    /// Audit configuration (defaults to the search path, then built-in values)
    #[arg(long, short, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Synthetic data scenario (defaults to the built-in demo)
    #[arg(long, short, value_hint = ValueHint::FilePath)]
    scenario: Option<PathBuf>,

    /// Which pipeline to run
    #[arg(long, short, value_enum, default_value_t = Pipeline::All)]
    pipeline: Pipeline,

    /// Emit JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Errors only on stderr
    #[arg(long, short, conflicts_with = "verbose")]
    quiet: bool,

    /// Debug logging with source locations
    #[arg(long, short)]
    verbose: bool,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Override the configured log format
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Print the reference configuration as YAML and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Configured logging with the command-line presets and overrides applied.
    fn log_config(&self, configured: &LogConfig) -> LogConfig {
        let mut logging = if self.quiet {
            LogConfig::quiet()
        } else if self.verbose {
            LogConfig::development()
        } else {
            configured.clone()
        };
        if let Some(level) = self.log_level {
            logging.level = level;
        }
        if let Some(format) = self.log_format {
            logging.format = format;
        }
        logging
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AuditConfig::example_yaml());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => AuditConfig::load_from(path)
            .with_context(|| format!("loading audit config {}", path.display()))?,
        None => AuditConfig::load().context("loading audit config")?,
    };

    init_logging(&cli.log_config(&config.logging));

    let scenario = match &cli.scenario {
        Some(path) => ScenarioConfig::load_from(path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => ScenarioConfig::demo(),
    };
    let archive = SyntheticArchive::new(scenario).context("building synthetic archive")?;

    tracing::info!(
        targets = config.targets.len(),
        pipeline = ?cli.pipeline,
        "audit run"
    );

    if matches!(cli.pipeline, Pipeline::Events | Pipeline::All) {
        let mut auditor = EventAuditor::new(&config).context("event pipeline")?;
        let rows = auditor.run(&archive, &archive.config().magnetic, &config.targets);
        let report = EventReport::new(rows);
        if cli.json {
            println!("{}", report.to_json()?);
        } else {
            print!("{}", report.render_table());
        }
    }

    if matches!(cli.pipeline, Pipeline::Symmetry | Pipeline::All) {
        let auditor = SymmetryAuditor::new(&config).context("symmetry pipeline")?;
        let rows = auditor.run(&archive, &config.targets);
        let report = SymmetryReport::new(auditor.detectors().to_vec(), rows);
        if cli.json {
            println!("{}", report.to_json()?);
        } else {
            print!("{}", report.render_table());
        }
    }

    Ok(())
}
