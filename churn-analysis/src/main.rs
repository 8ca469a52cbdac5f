use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use churn_analysis::{pipeline, AnalysisConfig};

#[derive(Parser)]
#[command(name = "churn-analysis")]
#[command(about = "Predict customer churn with decision trees and random forests")]
#[command(version)]
struct Cli {
    /// Path to the prepared churn CSV file
    #[arg(long, default_value = "prepped_churn_data.csv")]
    data: PathBuf,

    /// Optional TOML file overriding the analysis constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed of the split and the forests, overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all log output except errors
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.validate()?;
    info!(seed = config.seed, "starting churn analysis");

    let report = pipeline::run(&cli.data, &config)?;
    print!("{}", report);

    Ok(())
}
