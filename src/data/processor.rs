//! Data Processor Module
//! Handles data cleaning (drop rows with missing values) and schema inspection.

use super::table::{Feature, RecordTable, TableError, SPECIES_COLUMN};
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

/// One line of the "dataset information" block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub non_null: usize,
}

/// Handles data cleaning and inspection operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Remove rows with a null in any column or a NaN measurement.
    ///
    /// Same schema, possibly fewer rows. Applying it twice is the same as once.
    pub fn drop_missing(table: &RecordTable) -> Result<RecordTable, ProcessorError> {
        let df = table.dataframe();
        let mut keep = vec![true; df.height()];

        for feature in Feature::ALL {
            let values = df.column(feature.column())?.f64()?;
            for (i, v) in values.into_iter().enumerate() {
                if !matches!(v, Some(x) if !x.is_nan()) {
                    keep[i] = false;
                }
            }
        }

        let labels = df.column(SPECIES_COLUMN)?.str()?;
        for (i, v) in labels.into_iter().enumerate() {
            if v.is_none() {
                keep[i] = false;
            }
        }

        let mask = BooleanChunked::new("keep".into(), keep.as_slice());
        let filtered = df.filter(&mask)?;

        let dropped = df.height() - filtered.height();
        if dropped > 0 {
            tracing::info!(dropped, remaining = filtered.height(), "dropped rows with missing values");
        }

        Ok(RecordTable::new(filtered)?)
    }

    /// Count of missing values per column, in table order.
    ///
    /// NaN measurements count as missing, like nulls.
    pub fn missing_counts(table: &RecordTable) -> Result<Vec<(String, usize)>, ProcessorError> {
        let df = table.dataframe();
        let mut counts = Vec::with_capacity(df.width());

        for feature in Feature::ALL {
            let column = df.column(feature.column())?;
            let nan = column
                .f64()?
                .into_iter()
                .flatten()
                .filter(|v| v.is_nan())
                .count();
            counts.push((feature.column().to_string(), column.null_count() + nan));
        }

        let labels = df.column(SPECIES_COLUMN)?;
        counts.push((SPECIES_COLUMN.to_string(), labels.null_count()));

        Ok(counts)
    }

    /// Column name, dtype and non-null count for every column.
    pub fn schema(table: &RecordTable) -> Vec<ColumnInfo> {
        let df = table.dataframe();
        df.get_columns()
            .iter()
            .map(|col| ColumnInfo {
                name: col.name().to_string(),
                dtype: col.dtype().to_string(),
                non_null: col.len() - col.null_count(),
            })
            .collect()
    }
}
