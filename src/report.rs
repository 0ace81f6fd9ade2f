//! Text report formatting.
//!
//! Every function here returns a `String`; writing it anywhere is the
//! caller's job.

use crate::data::{ColumnInfo, Feature, RecordTable};
use crate::stats::{CategoryMeans, ColumnStats};
use std::fmt::Write;

/// Fixed observations printed after the per-species means.
pub const OBSERVATIONS: [&str; 3] = [
    "Iris-setosa generally has smaller petal and sepal measurements.",
    "Iris-virginica has the largest average petal length and width.",
    "Iris-versicolor falls between the two other species.",
];

const STAT_ROWS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// First `n` rows of the table.
pub fn preview(table: &RecordTable, n: usize) -> String {
    format!("{}", table.head(n))
}

/// Column / non-null count / dtype listing, like a DataFrame info dump.
pub fn schema_block(schema: &[ColumnInfo], rows: usize) -> String {
    let name_w = schema
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0)
        .max("Column".len());

    let mut out = String::new();
    let _ = writeln!(out, "RecordTable: {rows} entries, 0 to {}", rows.saturating_sub(1));
    let _ = writeln!(out, "Data columns (total {} columns):", schema.len());
    let _ = writeln!(out, " #   {:<name_w$}  Non-Null Count  Dtype", "Column");
    let _ = writeln!(out, "---  {:<name_w$}  --------------  -----", "------");
    for (i, col) in schema.iter().enumerate() {
        let non_null = format!("{} non-null", col.non_null);
        let _ = writeln!(out, " {i:<3} {:<name_w$}  {non_null:<14}  {}", col.name, col.dtype);
    }
    out
}

/// Missing-value count per column.
pub fn missing_block(counts: &[(String, usize)]) -> String {
    let name_w = counts.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (name, count) in counts {
        let _ = writeln!(out, "{name:<name_w$}    {count}");
    }
    out
}

/// Descriptive statistics with statistics as rows and features as columns.
pub fn describe_block(stats: &[ColumnStats]) -> String {
    let widths: Vec<usize> = stats.iter().map(|s| s.column.len().max(12)).collect();

    let mut out = String::new();
    let _ = write!(out, "{:<6}", "");
    for (s, w) in stats.iter().zip(widths.iter().copied()) {
        let _ = write!(out, "  {:>w$}", s.column);
    }
    out.push('\n');

    for row in STAT_ROWS {
        let _ = write!(out, "{row:<6}");
        for (s, w) in stats.iter().zip(widths.iter().copied()) {
            let value = match row {
                "count" => s.count as f64,
                "mean" => s.mean,
                "std" => s.std,
                "min" => s.min,
                "25%" => s.q25,
                "50%" => s.median,
                "75%" => s.q75,
                _ => s.max,
            };
            let _ = write!(out, "  {:>w$}", format_value(value, 6));
        }
        out.push('\n');
    }
    out
}

/// Per-species means, species as rows.
pub fn category_means_block(means: &[CategoryMeans]) -> String {
    let label_w = means
        .iter()
        .map(|m| m.species.label().len())
        .max()
        .unwrap_or(0)
        .max("species".len());

    let mut out = String::new();
    let _ = write!(out, "{:<label_w$}", "species");
    for feature in Feature::ALL {
        let _ = write!(out, "  {:>w$}", feature.column(), w = feature.column().len());
    }
    out.push('\n');

    for m in means {
        let _ = write!(out, "{:<label_w$}", m.species.label());
        for feature in Feature::ALL {
            let _ = write!(
                out,
                "  {:>w$}",
                format_value(m.mean(feature), 3),
                w = feature.column().len()
            );
        }
        out.push('\n');
    }
    out
}

/// Bulleted fixed observations.
pub fn observations_block() -> String {
    OBSERVATIONS.iter().map(|o| format!("- {o}\n")).collect()
}

/// Closing findings; `correlation` is sepal length vs petal length.
pub fn findings(correlation: f64) -> String {
    let strength = if correlation.is_nan() {
        "no measurable".to_string()
    } else if correlation >= 0.7 {
        format!("strong positive (r = {correlation:.2})")
    } else if correlation > 0.0 {
        format!("weak positive (r = {correlation:.2})")
    } else {
        format!("non-positive (r = {correlation:.2})")
    };

    let lines = [
        format!("1. Sepal and petal lengths show {strength} correlation, longer sepals tend to have longer petals."),
        "2. Each species has distinct petal dimensions, useful for classification.".to_string(),
        "3. Petal length trends vary across the dataset, but remain species-consistent.".to_string(),
        "4. The dataset is clean, balanced, and ideal for supervised learning tasks like classification.".to_string(),
    ];
    lines.iter().map(|l| format!("{l}\n")).collect()
}

fn format_value(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.decimals$}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataLoader, DataProcessor};
    use crate::stats::StatsCalculator;

    #[test]
    fn test_describe_block_layout() {
        let table = DataLoader::default().load().unwrap();
        let stats = StatsCalculator::describe(&table).unwrap();
        let block = describe_block(&stats);
        let lines: Vec<&str> = block.lines().collect();

        assert_eq!(lines.len(), 9);
        assert!(lines[0].contains("sepal length (cm)"));
        assert!(lines[1].starts_with("count"));
        assert!(lines[1].contains("150.000000"));
        assert!(lines[2].contains("5.843333"));
        assert!(lines[8].starts_with("max"));
        assert!(lines[8].contains("7.900000"));
    }

    #[test]
    fn test_describe_block_empty_stats_show_nan() {
        let stats = StatsCalculator::describe(&RecordTable::empty()).unwrap();
        let block = describe_block(&stats);
        assert!(block.lines().nth(2).unwrap().contains("NaN"));
    }

    #[test]
    fn test_category_means_block() {
        let table = DataLoader::default().load().unwrap();
        let means = StatsCalculator::category_means(&table).unwrap();
        let block = category_means_block(&means);
        let lines: Vec<&str> = block.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("setosa"));
        assert!(lines[1].contains("1.462"));
        assert!(lines[3].starts_with("virginica"));
        assert!(lines[3].contains("5.552"));
    }

    #[test]
    fn test_schema_and_missing_blocks() {
        let table = DataLoader::default().load().unwrap();
        let schema = schema_block(&DataProcessor::schema(&table), table.height());
        assert!(schema.contains("150 entries, 0 to 149"));
        assert!(schema.contains("total 5 columns"));
        assert!(schema.contains("petal width (cm)"));

        let missing = missing_block(&DataProcessor::missing_counts(&table).unwrap());
        assert_eq!(missing.lines().count(), 5);
        assert!(missing.lines().all(|l| l.trim_end().ends_with('0')));
    }

    #[test]
    fn test_findings_mentions_correlation() {
        let text = findings(0.8717);
        assert!(text.contains("strong positive (r = 0.87)"));
        assert_eq!(text.lines().count(), 4);
        assert!(findings(f64::NAN).contains("no measurable"));
    }

    #[test]
    fn test_preview_has_five_rows() {
        let table = DataLoader::default().load().unwrap();
        let text = preview(&table, 5);
        assert!(text.contains("shape: (5, 5)"));
        assert!(text.contains("setosa"));
    }
}
