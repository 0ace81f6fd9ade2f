//! Pipeline driver: load → clean → summarize → render.
//!
//! The record table is passed explicitly from stage to stage. A load
//! failure stops the run; chart failures are logged and collected.

use crate::charts::{ChartArtifact, ChartKind, ChartRenderer, RenderError};
use crate::config::{Config, ConfigError};
use crate::data::{DataLoader, DataProcessor, Feature, LoaderError, ProcessorError};
use crate::report;
use crate::stats::{StatsCalculator, StatsError, Summary};
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error("Cleaning failed: {0}")]
    Clean(#[from] ProcessorError),
    #[error("Summarizing failed: {0}")]
    Stats(#[from] StatsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write summary JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A chart that could not be produced.
#[derive(Debug)]
pub struct ChartFailure {
    pub kind: ChartKind,
    pub error: RenderError,
}

/// What a completed run produced.
#[derive(Debug)]
pub struct PipelineReport {
    pub rows_loaded: usize,
    pub rows_clean: usize,
    pub summary: Summary,
    pub charts: Vec<ChartArtifact>,
    pub failures: Vec<ChartFailure>,
}

/// Run the whole analysis, writing the text report to `out`.
pub fn run_pipeline<W: Write>(config: &Config, out: &mut W) -> Result<PipelineReport, PipelineError> {
    config.validate()?;

    // Load
    let loader = DataLoader::from_path(config.dataset.as_deref());
    tracing::info!(source = %loader.source(), "loading dataset");
    let table = loader.load()?;
    let rows_loaded = table.height();
    writeln!(out, "Dataset successfully loaded!\n")?;

    writeln!(out, "First {} Rows of the Dataset:", config.preview_rows)?;
    writeln!(out, "{}", report::preview(&table, config.preview_rows))?;

    writeln!(out, "\nDataset Information:")?;
    write!(out, "{}", report::schema_block(&DataProcessor::schema(&table), rows_loaded))?;

    writeln!(out, "\nMissing Values:")?;
    write!(out, "{}", report::missing_block(&DataProcessor::missing_counts(&table)?))?;

    // Clean
    let table = DataProcessor::drop_missing(&table)?;
    let rows_clean = table.height();
    writeln!(out, "\nDataset cleaned (if any missing values existed).")?;
    tracing::info!(rows_loaded, rows_clean, "dataset cleaned");

    // Summarize
    let summary = StatsCalculator::summarize(&table)?;

    writeln!(out, "\nBasic Statistics:")?;
    write!(out, "{}", report::describe_block(&summary.descriptive))?;

    writeln!(out, "\nAverage values per species:")?;
    write!(out, "{}", report::category_means_block(&summary.category_means))?;

    writeln!(out, "\nObservations:")?;
    write!(out, "{}", report::observations_block())?;

    // Render
    let renderer = ChartRenderer::new(&config.output_dir, config.render_options());
    let mut charts = Vec::with_capacity(ChartKind::ALL.len());
    let mut failures = Vec::new();

    for (kind, result) in ChartKind::ALL
        .into_iter()
        .zip(renderer.render_all(&table, &summary.category_means))
    {
        match result {
            Ok(artifact) => {
                if config.open_charts {
                    if let Err(e) = open::that(&artifact.path) {
                        tracing::warn!(path = %artifact.path.display(), error = %e, "could not open chart");
                    }
                }
                charts.push(artifact);
            }
            Err(error) => {
                tracing::error!(chart = %kind, %error, "chart rendering failed");
                failures.push(ChartFailure { kind, error });
            }
        }
    }

    if let Some(path) = &config.summary_json {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, &summary)?;
        tracing::info!(path = %path.display(), "summary written");
    }

    // Findings
    let correlation = StatsCalculator::pearson(
        &table.feature_values(Feature::SepalLength).map_err(StatsError::from)?,
        &table.feature_values(Feature::PetalLength).map_err(StatsError::from)?,
    );
    writeln!(out, "\nFindings Summary:")?;
    write!(out, "{}", report::findings(correlation))?;

    Ok(PipelineReport {
        rows_loaded,
        rows_clean,
        summary,
        charts,
        failures,
    })
}
