//! Stats module - Descriptive statistics and per-species summaries

mod calculator;

pub use calculator::{
    CategoryMeans, ColumnStats, HistogramBin, StatsCalculator, StatsError, Summary,
};
