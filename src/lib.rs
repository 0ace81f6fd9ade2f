//! Iris EDA - exploratory data analysis of the iris dataset
//!
//! Loads the bundled iris measurements, computes descriptive statistics
//! grouped by species and renders four standard charts.
//!
//! # Architecture
//!
//! - **Data**: record table, loader and cleaner (Polars)
//! - **Stats**: descriptive statistics, per-species means, histogram bins
//! - **Charts**: line, bar, histogram and scatter charts (plotters)
//! - **Report**: text formatting of the results
//! - **Pipeline**: runs the stages in order
//!
//! # Usage
//!
//! ```no_run
//! use iris_eda::{run_pipeline, Config};
//!
//! fn main() -> anyhow::Result<()> {
//!     let report = run_pipeline(&Config::default(), &mut std::io::stdout())?;
//!     println!("{} charts written", report.charts.len());
//!     Ok(())
//! }
//! ```

pub mod charts;
pub mod config;
pub mod data;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use charts::{ChartArtifact, ChartFormat, ChartKind, ChartRenderer, RenderError};
pub use config::Config;
pub use data::{DataLoader, DataProcessor, Feature, RecordTable, Species};
pub use pipeline::{run_pipeline, PipelineError, PipelineReport};
pub use stats::{StatsCalculator, Summary};
