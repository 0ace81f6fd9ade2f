//! Dataset Loader Module
//! Loads the bundled iris measurements (or a CSV with the same schema) using Polars
//! and tags each record with its species label.

use super::table::{RecordTable, Species, TableError, SPECIES_COLUMN};
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Integer class column in the raw CSV.
pub const TARGET_COLUMN: &str = "target";

/// Iris measurements compiled into the binary.
static BUNDLED_CSV: &[u8] = include_bytes!("../../data/iris.csv");

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found. Please check the dataset path: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("An error occurred while loading the dataset: {0}")]
    Csv(#[from] PolarsError),
    #[error("An error occurred while loading the dataset: unknown class index {0}")]
    UnknownClass(i64),
    #[error("An error occurred while loading the dataset: class index {0} is not an integer")]
    NonIntegerClass(f64),
    #[error("An error occurred while loading the dataset: {0}")]
    Table(#[from] TableError),
    #[error("An error occurred while loading the dataset: neither 'target' nor 'species' column present")]
    MissingLabels,
}

/// Where the record table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// The iris CSV embedded at compile time.
    Bundled,
    /// A CSV file on disk with the same schema.
    Csv(PathBuf),
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Bundled => f.write_str("bundled iris dataset"),
            DataSource::Csv(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Produces the record table from a [`DataSource`].
pub struct DataLoader {
    source: DataSource,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(DataSource::Bundled)
    }
}

impl DataLoader {
    pub fn new(source: DataSource) -> Self {
        Self { source }
    }

    /// Loader for an optional override path, falling back to the bundled data.
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::new(DataSource::Csv(p.to_path_buf())),
            None => Self::default(),
        }
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Load and validate the record table from this loader's source.
    pub fn load(&self) -> Result<RecordTable, LoaderError> {
        match &self.source {
            DataSource::Bundled => Self::load_bundled(),
            DataSource::Csv(path) => Self::load_csv(path),
        }
    }

    /// Load the iris CSV embedded at compile time.
    pub fn load_bundled() -> Result<RecordTable, LoaderError> {
        Self::finish(Self::read_bundled()?, &DataSource::Bundled)
    }

    /// Load a CSV file with the iris schema.
    pub fn load_csv(path: &Path) -> Result<RecordTable, LoaderError> {
        Self::finish(Self::read_csv(path)?, &DataSource::Csv(path.to_path_buf()))
    }

    fn finish(raw: DataFrame, source: &DataSource) -> Result<RecordTable, LoaderError> {
        tracing::debug!(
            source = %source,
            rows = raw.height(),
            columns = raw.width(),
            "raw dataset read"
        );

        let labeled = Self::attach_species(raw)?;
        Ok(RecordTable::new(labeled)?)
    }

    fn read_bundled() -> Result<DataFrame, LoaderError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .into_reader_with_file_handle(Cursor::new(BUNDLED_CSV))
            .finish()?;
        Ok(df)
    }

    fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::SourceNotFound(path.to_path_buf()));
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;
        Ok(df)
    }

    /// Replace the integer class column with the species label column.
    ///
    /// A frame that already carries string labels is passed through.
    fn attach_species(mut df: DataFrame) -> Result<DataFrame, LoaderError> {
        if df.column(TARGET_COLUMN).is_err() {
            return if df.column(SPECIES_COLUMN).is_ok() {
                Ok(df)
            } else {
                Err(LoaderError::MissingLabels)
            };
        }
        // Strict: a non-numeric class is a parse failure, not a null
        let target = df.column(TARGET_COLUMN)?.strict_cast(&DataType::Float64)?;

        let labels = target
            .f64()?
            .into_iter()
            .map(|idx| match idx {
                Some(v) if !v.is_finite() || v.fract() != 0.0 => {
                    Err(LoaderError::NonIntegerClass(v))
                }
                Some(v) => {
                    let i = v as i64;
                    Species::from_index(i)
                        .map(|s| Some(s.label()))
                        .ok_or(LoaderError::UnknownClass(i))
                }
                None => Ok(None),
            })
            .collect::<Result<Vec<Option<&str>>, LoaderError>>()?;

        df = df.drop(TARGET_COLUMN)?;
        df.with_column(Column::new(SPECIES_COLUMN.into(), labels))?;
        Ok(df)
    }
}
