//! Statistics Calculator Module
//! Handles descriptive statistics, per-species means and histogram binning.

use crate::data::{Feature, RecordTable, Species, TableError, SPECIES_COLUMN};
use polars::prelude::{col, lit, IntoLazy, PolarsError};
use serde::Serialize;
use statrs::statistics::Statistics;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Table error: {0}")]
    Table(#[from] TableError),
}

/// Descriptive statistics for a single numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    fn empty(column: &str) -> Self {
        Self {
            column: column.to_string(),
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Mean of every feature over the rows of one species.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryMeans {
    pub species: Species,
    pub count: usize,
    /// One entry per feature, in [`Feature::ALL`] order.
    pub means: Vec<f64>,
}

impl CategoryMeans {
    pub fn mean(&self, feature: Feature) -> f64 {
        Feature::ALL
            .iter()
            .position(|f| *f == feature)
            .and_then(|i| self.means.get(i).copied())
            .unwrap_or(f64::NAN)
    }
}

/// One histogram bin; `upper` is inclusive only for the last bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Everything the summarizer produces.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub descriptive: Vec<ColumnStats>,
    pub category_means: Vec<CategoryMeans>,
}

/// Pure statistical computations over a record table.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics and per-species means in one pass.
    pub fn summarize(table: &RecordTable) -> Result<Summary, StatsError> {
        Ok(Summary {
            descriptive: Self::describe(table)?,
            category_means: Self::category_means(table)?,
        })
    }

    /// Descriptive statistics for every feature column, in table order.
    pub fn describe(table: &RecordTable) -> Result<Vec<ColumnStats>, StatsError> {
        Feature::ALL
            .iter()
            .map(|&feature| -> Result<ColumnStats, StatsError> {
                let values = table.feature_values(feature)?;
                Ok(Self::compute_descriptive_stats(feature.column(), &values))
            })
            .collect()
    }

    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(column: &str, values: &[f64]) -> ColumnStats {
        let n = values.len();
        if n == 0 {
            return ColumnStats::empty(column);
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        // statrs yields NaN for a single sample; pandas does the same
        let std = if n > 1 { values.std_dev() } else { f64::NAN };

        ColumnStats {
            column: column.to_string(),
            count: n,
            mean: values.mean(),
            std,
            min: sorted[0],
            q25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Get values of a feature for rows labeled with `species`.
    pub fn get_values_for_species(
        table: &RecordTable,
        species: Species,
        feature: Feature,
    ) -> Result<Vec<f64>, StatsError> {
        let selected = table
            .dataframe()
            .clone()
            .lazy()
            .filter(col(SPECIES_COLUMN).eq(lit(species.label())))
            .select([col(feature.column())])
            .collect()?;

        Ok(selected
            .column(feature.column())?
            .f64()?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect())
    }

    /// Per-species feature means, in class-index order. Absent species are omitted.
    pub fn category_means(table: &RecordTable) -> Result<Vec<CategoryMeans>, StatsError> {
        let mut result = Vec::with_capacity(Species::ALL.len());

        for species in Species::ALL {
            let mut count = 0;
            let mut means = Vec::with_capacity(Feature::ALL.len());
            for feature in Feature::ALL {
                let values = Self::get_values_for_species(table, species, feature)?;
                count = count.max(values.len());
                means.push(if values.is_empty() {
                    f64::NAN
                } else {
                    values.mean()
                });
            }

            if count > 0 {
                result.push(CategoryMeans {
                    species,
                    count,
                    means,
                });
            }
        }

        Ok(result)
    }

    /// Equal-width histogram between min and max (NumPy semantics).
    ///
    /// The last bin includes its upper edge. A constant input widens the
    /// range to half a unit either side.
    pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return Vec::new();
        }

        let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0usize; bins];
        for v in &finite {
            let idx = (((v - lo) / (hi - lo)) * bins as f64).floor() as usize;
            counts[idx.min(bins - 1)] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: lo + i as f64 * width,
                upper: if i + 1 == bins {
                    hi
                } else {
                    lo + (i + 1) as f64 * width
                },
                count,
            })
            .collect()
    }

    /// Pearson correlation coefficient of two equally long samples.
    pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
        let n = x.len().min(y.len());
        if n < 2 {
            return f64::NAN;
        }
        let (x, y) = (&x[..n], &y[..n]);
        let mx = x.mean();
        let my = y.mean();

        let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
        for (a, b) in x.iter().zip(y) {
            sxy += (a - mx) * (b - my);
            sxx += (a - mx).powi(2);
            syy += (b - my).powi(2);
        }

        if sxx == 0.0 || syy == 0.0 {
            return f64::NAN;
        }
        sxy / (sxx * syy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataLoader;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    fn iris() -> RecordTable {
        DataLoader::default().load().unwrap()
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(StatsCalculator::percentile(&sorted, 50.0), 2.5);
        assert_eq!(StatsCalculator::percentile(&sorted, 25.0), 1.75);
        assert_eq!(StatsCalculator::percentile(&sorted, 100.0), 4.0);
        assert!(StatsCalculator::percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_describe_counts_match_row_count() {
        let table = iris();
        let stats = StatsCalculator::describe(&table).unwrap();
        assert_eq!(stats.len(), 4);
        assert!(stats.iter().all(|s| s.count == table.height()));
    }

    #[test]
    fn test_describe_sepal_length_matches_reference() {
        let stats = StatsCalculator::describe(&iris()).unwrap();
        let sepal = &stats[0];
        assert_eq!(sepal.column, "sepal length (cm)");
        assert!(approx(sepal.mean, 5.843333, 1e-6));
        assert!(approx(sepal.std, 0.828066, 1e-6));
        assert_eq!(sepal.min, 4.3);
        assert!(approx(sepal.q25, 5.1, 1e-9));
        assert!(approx(sepal.median, 5.8, 1e-9));
        assert!(approx(sepal.q75, 6.4, 1e-9));
        assert_eq!(sepal.max, 7.9);
    }

    #[test]
    fn test_describe_petal_length_median() {
        let stats = StatsCalculator::describe(&iris()).unwrap();
        assert!(approx(stats[2].median, 4.35, 1e-9));
        assert!(approx(stats[2].std, 1.765298, 1e-6));
    }

    #[test]
    fn test_describe_empty_table() {
        let stats = StatsCalculator::describe(&RecordTable::empty()).unwrap();
        assert_eq!(stats.len(), 4);
        assert!(stats.iter().all(|s| s.count == 0 && s.mean.is_nan()));
    }

    #[test]
    fn test_category_means_order_and_values() {
        let means = StatsCalculator::category_means(&iris()).unwrap();
        let species: Vec<Species> = means.iter().map(|m| m.species).collect();
        assert_eq!(species, Species::ALL.to_vec());
        assert!(means.iter().all(|m| m.count == 50));

        let petal: Vec<f64> = means.iter().map(|m| m.mean(Feature::PetalLength)).collect();
        assert!(approx(petal[0], 1.462, 1e-9));
        assert!(approx(petal[1], 4.26, 1e-9));
        assert!(approx(petal[2], 5.552, 1e-9));
    }

    #[test]
    fn test_setosa_smallest_virginica_largest_petal_length() {
        let means = StatsCalculator::category_means(&iris()).unwrap();
        let petal = |s: Species| {
            means
                .iter()
                .find(|m| m.species == s)
                .map(|m| m.mean(Feature::PetalLength))
                .unwrap()
        };
        let min = means
            .iter()
            .min_by(|a, b| a.mean(Feature::PetalLength).total_cmp(&b.mean(Feature::PetalLength)))
            .unwrap();
        let max = means
            .iter()
            .max_by(|a, b| a.mean(Feature::PetalLength).total_cmp(&b.mean(Feature::PetalLength)))
            .unwrap();
        assert_eq!(min.species, Species::Setosa);
        assert_eq!(max.species, Species::Virginica);
        assert!(petal(Species::Versicolor) > petal(Species::Setosa));
    }

    #[test]
    fn test_category_means_empty_table() {
        let means = StatsCalculator::category_means(&RecordTable::empty()).unwrap();
        assert!(means.is_empty());
    }

    #[test]
    fn test_histogram_sepal_length_fifteen_bins() {
        let values = iris().feature_values(Feature::SepalLength).unwrap();
        let bins = StatsCalculator::histogram(&values, 15);
        assert_eq!(bins.len(), 15);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 150);
        assert_eq!(bins[0].lower, 4.3);
        assert_eq!(bins[14].upper, 7.9);
        assert_eq!(bins[14].count, 5);
    }

    #[test]
    fn test_histogram_constant_and_empty() {
        let bins = StatsCalculator::histogram(&[2.0, 2.0, 2.0], 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].lower, 1.5);
        assert_eq!(bins[3].upper, 2.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
        assert!(StatsCalculator::histogram(&[], 15).is_empty());
    }

    #[test]
    fn test_pearson_sepal_vs_petal_length() {
        let table = iris();
        let x = table.feature_values(Feature::SepalLength).unwrap();
        let y = table.feature_values(Feature::PetalLength).unwrap();
        assert!(approx(StatsCalculator::pearson(&x, &y), 0.871754, 1e-6));
        assert!(StatsCalculator::pearson(&[1.0], &[2.0]).is_nan());
    }
}
