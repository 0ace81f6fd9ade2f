//! Iris EDA CLI
//!
//! Prints a descriptive report of the iris dataset and writes four charts.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use iris_eda::{run_pipeline, ChartFormat, Config};

#[derive(Parser)]
#[command(name = "iris-eda")]
#[command(about = "Exploratory data analysis of the iris dataset", long_about = None)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the chart files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Chart file format (svg or png)
    #[arg(long)]
    format: Option<ChartFormat>,

    /// Histogram bin count (1-1000)
    #[arg(long)]
    bins: Option<usize>,

    /// Open each chart with the system viewer
    #[arg(long)]
    open: bool,

    /// Analyze this CSV instead of the bundled dataset
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Also write the summary statistics as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the report
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    // Apply overrides
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(format) = cli.format {
        config.charts.format = format;
    }
    if let Some(bins) = cli.bins {
        config.charts.histogram_bins = bins;
    }
    if cli.open {
        config.open_charts = true;
    }
    if let Some(dataset) = cli.dataset {
        config.dataset = Some(dataset);
    }
    if let Some(path) = cli.summary_json {
        config.summary_json = Some(path);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = run_pipeline(&config, &mut out).context("analysis failed")?;

    tracing::info!(
        rows = report.rows_clean,
        charts = report.charts.len(),
        failed = report.failures.len(),
        output_dir = %config.output_dir.display(),
        "analysis complete"
    );

    Ok(())
}
