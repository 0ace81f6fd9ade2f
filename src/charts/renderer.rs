//! Static Chart Renderer
//! Writes the four exploratory charts to files using plotters.
//!
//! Charts:
//! 1. Line: one feature against row index
//! 2. Bar: one feature's mean per species
//! 3. Histogram: one feature's distribution with a fixed bin count
//! 4. Scatter: two features, colored by species
//!
//! Every chart is drawn by a backend-generic function so the same code
//! produces SVG or PNG output.

use crate::data::{Feature, RecordTable, Species, TableError};
use crate::stats::{CategoryMeans, StatsCalculator};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

// Colors (matplotlib / seaborn equivalents)
const LINE_GREEN: RGBColor = RGBColor(0, 128, 0);
const HIST_PURPLE: RGBColor = RGBColor(128, 0, 128);
const BAR_COLORS: [RGBColor; 3] = [
    RGBColor(135, 206, 235), // skyblue
    RGBColor(255, 165, 0),   // orange
    RGBColor(0, 128, 0),     // green
];
const SET2: [RGBColor; 3] = [
    RGBColor(102, 194, 165),
    RGBColor(252, 141, 98),
    RGBColor(141, 160, 203),
];
const GRID: RGBColor = RGBColor(230, 230, 230);

const FONT: &str = "sans-serif";
static FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const TITLE_SIZE: i32 = 24;
const DESC_SIZE: i32 = 16;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Insufficient data to render the {chart} chart")]
    InsufficientData { chart: ChartKind },
    #[error("Drawing error: {0}")]
    Drawing(String),
    #[error("Font error: {0}")]
    Font(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(err.to_string())
    }
}

/// The four chart types the renderer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Histogram,
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Histogram,
        ChartKind::Scatter,
    ];
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Histogram => "histogram",
            ChartKind::Scatter => "scatter",
        };
        f.write_str(name)
    }
}

/// Output file format for charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    #[default]
    Svg,
    Png,
}

impl ChartFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Svg => "svg",
            ChartFormat::Png => "png",
        }
    }
}

impl FromStr for ChartFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(ChartFormat::Svg),
            "png" => Ok(ChartFormat::Png),
            other => Err(format!("unsupported chart format '{other}' (expected svg or png)")),
        }
    }
}

impl fmt::Display for ChartFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A chart written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub path: PathBuf,
}

/// Rendering settings shared by all four charts.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub format: ChartFormat,
    pub width: u32,
    pub height: u32,
    pub histogram_bins: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: ChartFormat::Svg,
            width: 800,
            height: 500,
            histogram_bins: 15,
        }
    }
}

/// Draw a chart with whichever backend the format selects.
macro_rules! draw_with_backend {
    ($format:expr, $path:expr, $size:expr, $draw:ident($($arg:expr),* $(,)?)) => {
        match $format {
            ChartFormat::Svg => $draw(SVGBackend::new($path, $size).into_drawing_area(), $($arg),*),
            ChartFormat::Png => $draw(BitMapBackend::new($path, $size).into_drawing_area(), $($arg),*),
        }
    };
}

/// Renders the exploratory charts into an output directory.
pub struct ChartRenderer {
    output_dir: PathBuf,
    options: RenderOptions,
}

impl ChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, options: RenderOptions) -> Self {
        Self {
            output_dir: output_dir.into(),
            options,
        }
    }

    /// Render the standard set of four charts.
    ///
    /// Each result is independent: a failed chart does not stop the rest.
    pub fn render_all(
        &self,
        table: &RecordTable,
        means: &[CategoryMeans],
    ) -> Vec<Result<ChartArtifact, RenderError>> {
        vec![
            self.render_line(table, Feature::PetalLength),
            self.render_bar(means, Feature::PetalLength),
            self.render_histogram(table, Feature::SepalLength),
            self.render_scatter(table, Feature::SepalLength, Feature::PetalLength),
        ]
    }

    /// Line chart of a feature against row index.
    pub fn render_line(
        &self,
        table: &RecordTable,
        feature: Feature,
    ) -> Result<ChartArtifact, RenderError> {
        let values = table.feature_values(feature)?;
        if values.is_empty() {
            return Err(RenderError::InsufficientData {
                chart: ChartKind::Line,
            });
        }

        let path = self.prepare_path(&format!("line_{}", file_token(feature)))?;
        draw_with_backend!(
            self.options.format,
            &path,
            self.size(),
            draw_line_chart(&values, feature)
        )?;

        Ok(self.artifact(ChartKind::Line, path))
    }

    /// Bar chart of a feature's mean per species.
    pub fn render_bar(
        &self,
        means: &[CategoryMeans],
        feature: Feature,
    ) -> Result<ChartArtifact, RenderError> {
        let bars: Vec<(Species, f64)> = means
            .iter()
            .map(|m| (m.species, m.mean(feature)))
            .filter(|(_, v)| v.is_finite())
            .collect();
        if bars.is_empty() {
            return Err(RenderError::InsufficientData {
                chart: ChartKind::Bar,
            });
        }

        let path = self.prepare_path(&format!("bar_mean_{}", file_token(feature)))?;
        draw_with_backend!(
            self.options.format,
            &path,
            self.size(),
            draw_bar_chart(&bars, feature)
        )?;

        Ok(self.artifact(ChartKind::Bar, path))
    }

    /// Histogram of a feature with the configured bin count.
    pub fn render_histogram(
        &self,
        table: &RecordTable,
        feature: Feature,
    ) -> Result<ChartArtifact, RenderError> {
        let values = table.feature_values(feature)?;
        let bins = StatsCalculator::histogram(&values, self.options.histogram_bins);
        if bins.is_empty() {
            return Err(RenderError::InsufficientData {
                chart: ChartKind::Histogram,
            });
        }

        let path = self.prepare_path(&format!("hist_{}", file_token(feature)))?;
        draw_with_backend!(
            self.options.format,
            &path,
            self.size(),
            draw_histogram(&bins, feature)
        )?;

        Ok(self.artifact(ChartKind::Histogram, path))
    }

    /// Scatter plot of two features, one series per species.
    pub fn render_scatter(
        &self,
        table: &RecordTable,
        x: Feature,
        y: Feature,
    ) -> Result<ChartArtifact, RenderError> {
        let points = table.labeled_points(x, y)?;
        if points.is_empty() {
            return Err(RenderError::InsufficientData {
                chart: ChartKind::Scatter,
            });
        }

        let stem = format!("scatter_{}_vs_{}", short_token(x), short_token(y));
        let path = self.prepare_path(&stem)?;
        draw_with_backend!(
            self.options.format,
            &path,
            self.size(),
            draw_scatter(&points, x, y)
        )?;

        Ok(self.artifact(ChartKind::Scatter, path))
    }

    fn size(&self) -> (u32, u32) {
        (self.options.width, self.options.height)
    }

    fn prepare_path(&self, stem: &str) -> Result<PathBuf, RenderError> {
        ensure_font()?;
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(self
            .output_dir
            .join(format!("{stem}.{}", self.options.format.extension())))
    }

    fn artifact(&self, kind: ChartKind, path: PathBuf) -> ChartArtifact {
        tracing::info!(chart = %kind, path = %path.display(), "chart written");
        ChartArtifact { kind, path }
    }
}

/// Register the embedded font under [`FONT`] once per process.
///
/// Both backends lay text out with it and the bitmap backend rasterizes it.
fn ensure_font() -> Result<(), RenderError> {
    static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            register_font(FONT, FontStyle::Normal, FONT_DATA)
                .map_err(|_| "embedded font is not a valid OpenType font".to_string())
        })
        .clone()
        .map_err(RenderError::Font)
}

/// `petal_length` style token for file names.
fn file_token(feature: Feature) -> String {
    feature.name().to_ascii_lowercase().replace(' ', "_")
}

/// `petal` / `sepal` when the pair shares a measurement, else the full token.
fn short_token(feature: Feature) -> String {
    match feature {
        Feature::SepalLength | Feature::PetalLength => feature
            .name()
            .split(' ')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase(),
        _ => file_token(feature),
    }
}

/// Axis range covering `values` with 5% padding on each side.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(0.1);
    (min - pad, max + pad)
}

fn draw_line_chart<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    values: &[f64],
    feature: Feature,
) -> Result<(), RenderError> {
    root.fill(&WHITE)?;

    let (y_min, y_max) = padded_range(values.iter().copied());
    let x_max = (values.len().saturating_sub(1)).max(1) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Line Chart: {} Trend", feature.name()),
            (FONT, TITLE_SIZE),
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .light_line_style(&GRID)
        .x_desc("Index")
        .y_desc(feature.label())
        .axis_desc_style((FONT, DESC_SIZE))
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            values.iter().enumerate().map(|(i, &v)| (i as f64, v)),
            LINE_GREEN.stroke_width(2),
        ))?
        .label(feature.name())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], LINE_GREEN.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_bar_chart<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    bars: &[(Species, f64)],
    feature: Feature,
) -> Result<(), RenderError> {
    root.fill(&WHITE)?;

    let top = bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let y_max = if top > 0.0 { top * 1.1 } else { 1.0 };
    let names: Vec<&str> = bars.iter().map(|(s, _)| s.label()).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Bar Chart: Average {} per Species", feature.name()),
            (FONT, TITLE_SIZE),
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d((0..bars.len()).into_segmented(), 0f64..y_max)?;

    let x_formatter = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => names.get(*i).map(|s| s.to_string()).unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(&GRID)
        .x_desc("Species")
        .y_desc(format!("Average {}", feature.label()))
        .axis_desc_style((FONT, DESC_SIZE))
        .x_label_formatter(&x_formatter)
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, (species, mean))| {
        let color = BAR_COLORS[species.index() % BAR_COLORS.len()];
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *mean)],
            color.filled(),
        );
        bar.set_margin(0, 0, 20, 20);
        bar
    }))?;

    root.present()?;
    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    bins: &[crate::stats::HistogramBin],
    feature: Feature,
) -> Result<(), RenderError> {
    root.fill(&WHITE)?;

    let x_min = bins.first().map(|b| b.lower).unwrap_or(0.0);
    let x_max = bins.last().map(|b| b.upper).unwrap_or(1.0);
    let peak = bins.iter().map(|b| b.count).max().unwrap_or(0);
    let y_max = (peak.max(1) as f64) * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Histogram: {} Distribution", feature.name()),
            (FONT, TITLE_SIZE),
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .light_line_style(&GRID)
        .x_desc(feature.label())
        .y_desc("Frequency")
        .axis_desc_style((FONT, DESC_SIZE))
        .draw()?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], HIST_PURPLE.filled())
    }))?;
    chart.draw_series(
        bins.iter()
            .map(|b| Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], BLACK.stroke_width(1))),
    )?;

    root.present()?;
    Ok(())
}

fn draw_scatter<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    points: &[(f64, f64, Species)],
    x: Feature,
    y: Feature,
) -> Result<(), RenderError> {
    root.fill(&WHITE)?;

    let (x_min, x_max) = padded_range(points.iter().map(|p| p.0));
    let (y_min, y_max) = padded_range(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Scatter Plot: {} vs {}", short_title(x), short_title(y)),
            (FONT, TITLE_SIZE),
        )
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .light_line_style(&GRID)
        .x_desc(x.label())
        .y_desc(y.label())
        .axis_desc_style((FONT, DESC_SIZE))
        .draw()?;

    // Text-only entry acting as the legend title
    chart
        .draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())?
        .label("Species");

    for species in Species::ALL {
        let color = SET2[species.index() % SET2.len()];
        let series: Vec<(f64, f64)> = points
            .iter()
            .filter(|p| p.2 == species)
            .map(|p| (p.0, p.1))
            .collect();
        if series.is_empty() {
            continue;
        }

        chart
            .draw_series(
                series
                    .into_iter()
                    .map(move |(px, py)| Circle::new((px, py), 4, color.filled())),
            )?
            .label(species.label())
            .legend(move |(lx, ly)| Circle::new((lx + 10, ly), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// `Sepal` for sepal length, the full name otherwise.
fn short_title(feature: Feature) -> &'static str {
    match feature {
        Feature::SepalLength => "Sepal",
        Feature::PetalLength => "Petal Length",
        other => other.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;
    use crate::stats::StatsCalculator;
    use std::path::Path;

    fn renderer(dir: &Path, format: ChartFormat) -> ChartRenderer {
        ChartRenderer::new(
            dir,
            RenderOptions {
                format,
                ..RenderOptions::default()
            },
        )
    }

    #[test]
    fn test_render_all_nominal_dataset_svg() {
        let dir = tempfile::tempdir().unwrap();
        let table = DataLoader::default().load().unwrap();
        let means = StatsCalculator::category_means(&table).unwrap();

        let results = renderer(dir.path(), ChartFormat::Svg).render_all(&table, &means);
        assert_eq!(results.len(), 4);

        let artifacts: Vec<ChartArtifact> = results.into_iter().map(|r| r.unwrap()).collect();
        let kinds: Vec<ChartKind> = artifacts.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, ChartKind::ALL.to_vec());

        for artifact in &artifacts {
            let content = std::fs::read_to_string(&artifact.path).unwrap();
            assert!(content.contains("<svg"), "{} is not svg", artifact.path.display());
        }
        assert!(dir.path().join("line_petal_length.svg").exists());
        assert!(dir.path().join("bar_mean_petal_length.svg").exists());
        assert!(dir.path().join("hist_sepal_length.svg").exists());
        assert!(dir.path().join("scatter_sepal_vs_petal.svg").exists());
    }

    #[test]
    fn test_svg_contains_titles_and_labels() {
        let dir = tempfile::tempdir().unwrap();
        let table = DataLoader::default().load().unwrap();
        let r = renderer(dir.path(), ChartFormat::Svg);

        let line = r.render_line(&table, Feature::PetalLength).unwrap();
        let svg = std::fs::read_to_string(line.path).unwrap();
        assert!(svg.contains("Line Chart: Petal Length Trend"));
        assert!(svg.contains("Index"));

        let scatter = r
            .render_scatter(&table, Feature::SepalLength, Feature::PetalLength)
            .unwrap();
        let svg = std::fs::read_to_string(scatter.path).unwrap();
        assert!(svg.contains("setosa"));
        assert!(svg.contains("virginica"));
    }

    #[test]
    fn test_render_png() {
        let dir = tempfile::tempdir().unwrap();
        let table = DataLoader::default().load().unwrap();
        let artifact = renderer(dir.path(), ChartFormat::Png)
            .render_histogram(&table, Feature::SepalLength)
            .unwrap();
        assert_eq!(artifact.path.extension().unwrap(), "png");
        let bytes = std::fs::read(&artifact.path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_render_all_png_draws_text() {
        let dir = tempfile::tempdir().unwrap();
        let table = DataLoader::default().load().unwrap();
        let means = StatsCalculator::category_means(&table).unwrap();

        // Captions, rotated axis descriptions and legends all go through the font
        for result in renderer(dir.path(), ChartFormat::Png).render_all(&table, &means) {
            let artifact = result.unwrap();
            let bytes = std::fs::read(&artifact.path).unwrap();
            assert_eq!(&bytes[1..4], b"PNG");
        }
    }

    #[test]
    fn test_embedded_font_registers() {
        assert!(ensure_font().is_ok());
        // Idempotent
        assert!(ensure_font().is_ok());
    }

    #[test]
    fn test_empty_table_is_insufficient_data() {
        let dir = tempfile::tempdir().unwrap();
        let table = RecordTable::empty();
        let means = StatsCalculator::category_means(&table).unwrap();

        let results = renderer(dir.path(), ChartFormat::Svg).render_all(&table, &means);
        assert_eq!(results.len(), 4);
        for (result, kind) in results.into_iter().zip(ChartKind::ALL) {
            match result {
                Err(RenderError::InsufficientData { chart }) => assert_eq!(chart, kind),
                other => panic!("expected InsufficientData for {kind}, got {other:?}"),
            }
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_chart_format_parsing() {
        assert_eq!("SVG".parse::<ChartFormat>().unwrap(), ChartFormat::Svg);
        assert_eq!("png".parse::<ChartFormat>().unwrap(), ChartFormat::Png);
        assert!("gif".parse::<ChartFormat>().is_err());
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(std::iter::empty()), (0.0, 1.0));
        let (lo, hi) = padded_range([1.0, 3.0].into_iter());
        assert!(lo < 1.0 && hi > 3.0);
    }
}
