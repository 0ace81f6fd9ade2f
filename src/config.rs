//! Configuration for the analysis run.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! reproduces the standard run: bundled dataset, SVG charts in `charts/`.

use crate::charts::{ChartFormat, RenderOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// CSV to analyze instead of the bundled dataset
    #[serde(default)]
    pub dataset: Option<PathBuf>,

    /// Directory the chart files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Chart settings
    #[serde(default)]
    pub charts: ChartConfig,

    /// Rows shown in the dataset preview
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    /// Open each chart with the system viewer after writing it
    #[serde(default)]
    pub open_charts: bool,

    /// Write the computed summary as JSON to this path
    #[serde(default)]
    pub summary_json: Option<PathBuf>,
}

/// Chart output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default)]
    pub format: ChartFormat,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Fixed bin count for the histogram
    #[serde(default = "default_bins")]
    pub histogram_bins: usize,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("charts")
}

fn default_preview_rows() -> usize {
    5
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    500
}

fn default_bins() -> usize {
    15
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            format: ChartFormat::default(),
            width: default_width(),
            height: default_height(),
            histogram_bins: default_bins(),
        }
    }
}

/// Upper bound on the histogram bin count.
pub const MAX_HISTOGRAM_BINS: usize = 1000;

/// Upper bound on either chart dimension, in pixels.
pub const MAX_CHART_SIDE: u32 = 10_000;

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: None,
            output_dir: default_output_dir(),
            charts: ChartConfig::default(),
            preview_rows: default_preview_rows(),
            open_charts: false,
            summary_json: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_HISTOGRAM_BINS).contains(&self.charts.histogram_bins) {
            return Err(ConfigError::Invalid(format!(
                "histogram_bins must be between 1 and {MAX_HISTOGRAM_BINS}, got {}",
                self.charts.histogram_bins
            )));
        }
        if self.charts.width < 200 || self.charts.height < 150 {
            return Err(ConfigError::Invalid(format!(
                "chart size {}x{} is too small (minimum 200x150)",
                self.charts.width, self.charts.height
            )));
        }
        if self.charts.width > MAX_CHART_SIDE || self.charts.height > MAX_CHART_SIDE {
            return Err(ConfigError::Invalid(format!(
                "chart size {}x{} is too large (maximum {MAX_CHART_SIDE} per side)",
                self.charts.width, self.charts.height
            )));
        }
        Ok(())
    }

    /// Renderer settings derived from the chart section.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            format: self.charts.format,
            width: self.charts.width,
            height: self.charts.height,
            histogram_bins: self.charts.histogram_bins,
        }
    }
}
