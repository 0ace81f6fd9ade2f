//! Record Table Module
//! The validated in-memory dataset: four measurements and a species label per row.

use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Name of the categorical label column.
pub const SPECIES_COLUMN: &str = "species";

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("Negative measurement {value} in column '{column}' at row {row}")]
    NegativeMeasurement {
        column: String,
        row: usize,
        value: f64,
    },
    #[error("Unknown species label '{0}'")]
    UnknownSpecies(String),
}

/// Numeric measurement columns, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    SepalLength,
    SepalWidth,
    PetalLength,
    PetalWidth,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::SepalLength,
        Feature::SepalWidth,
        Feature::PetalLength,
        Feature::PetalWidth,
    ];

    /// Column name in the record table.
    pub fn column(self) -> &'static str {
        match self {
            Feature::SepalLength => "sepal length (cm)",
            Feature::SepalWidth => "sepal width (cm)",
            Feature::PetalLength => "petal length (cm)",
            Feature::PetalWidth => "petal width (cm)",
        }
    }

    /// Human-readable name without the unit, used in chart titles.
    pub fn name(self) -> &'static str {
        match self {
            Feature::SepalLength => "Sepal Length",
            Feature::SepalWidth => "Sepal Width",
            Feature::PetalLength => "Petal Length",
            Feature::PetalWidth => "Petal Width",
        }
    }

    /// Axis label used on charts.
    pub fn label(self) -> &'static str {
        match self {
            Feature::SepalLength => "Sepal Length (cm)",
            Feature::SepalWidth => "Sepal Width (cm)",
            Feature::PetalLength => "Petal Length (cm)",
            Feature::PetalWidth => "Petal Width (cm)",
        }
    }
}

/// Closed set of category labels, ordered by class index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Setosa,
    Versicolor,
    Virginica,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Setosa, Species::Versicolor, Species::Virginica];

    /// Map an integer class index (0/1/2) to its species.
    pub fn from_index(index: i64) -> Option<Species> {
        match index {
            0 => Some(Species::Setosa),
            1 => Some(Species::Versicolor),
            2 => Some(Species::Virginica),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Species> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Species::Setosa => "setosa",
            Species::Versicolor => "versicolor",
            Species::Virginica => "virginica",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Validated record table backed by a Polars DataFrame.
///
/// Column order is always the four [`Feature`] columns followed by
/// [`SPECIES_COLUMN`]. Missing values (nulls, NaN measurements) are
/// permitted here; they are the cleaner's business.
#[derive(Debug, Clone)]
pub struct RecordTable {
    df: DataFrame,
}

impl RecordTable {
    /// Validate and normalize a DataFrame into a record table.
    ///
    /// Feature columns are cast to `f64`, extra columns are dropped.
    pub fn new(df: DataFrame) -> Result<Self, TableError> {
        let mut columns: Vec<Column> = Vec::with_capacity(Feature::ALL.len() + 1);

        for feature in Feature::ALL {
            let name = feature.column();
            let column = df
                .column(name)
                .map_err(|_| TableError::MissingColumn(name.to_string()))?
                .strict_cast(&DataType::Float64)?;

            for (row, value) in column.f64()?.into_iter().enumerate() {
                if let Some(v) = value {
                    if v < 0.0 {
                        return Err(TableError::NegativeMeasurement {
                            column: name.to_string(),
                            row,
                            value: v,
                        });
                    }
                }
            }
            columns.push(column);
        }

        let species = df
            .column(SPECIES_COLUMN)
            .map_err(|_| TableError::MissingColumn(SPECIES_COLUMN.to_string()))?
            .cast(&DataType::String)?;
        for label in species.str()?.into_iter().flatten() {
            if Species::from_label(label).is_none() {
                return Err(TableError::UnknownSpecies(label.to_string()));
            }
        }
        columns.push(species);

        Ok(Self {
            df: DataFrame::new(columns)?,
        })
    }

    /// A table with the record schema and no rows.
    pub fn empty() -> Self {
        let mut columns: Vec<Column> = Feature::ALL
            .iter()
            .map(|f| Column::new(f.column().into(), Vec::<f64>::new()))
            .collect();
        columns.push(Column::new(SPECIES_COLUMN.into(), Vec::<String>::new()));

        Self {
            df: DataFrame::new(columns).unwrap_or_default(),
        }
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// First `n` rows, for display.
    pub fn head(&self, n: usize) -> DataFrame {
        self.df.head(Some(n))
    }

    /// Non-missing values of a feature, in row order.
    pub fn feature_values(&self, feature: Feature) -> Result<Vec<f64>, TableError> {
        let column = self.df.column(feature.column())?;
        Ok(column
            .f64()?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect())
    }

    /// Species label for each row; `None` marks a missing label.
    pub fn species_labels(&self) -> Result<Vec<Option<Species>>, TableError> {
        let column = self.df.column(SPECIES_COLUMN)?;
        Ok(column
            .str()?
            .into_iter()
            .map(|v| v.and_then(Species::from_label))
            .collect())
    }

    /// Paired feature values with their species, skipping rows with any gap.
    pub fn labeled_points(
        &self,
        x: Feature,
        y: Feature,
    ) -> Result<Vec<(f64, f64, Species)>, TableError> {
        let xs = self.df.column(x.column())?.f64()?;
        let ys = self.df.column(y.column())?.f64()?;
        let labels = self.species_labels()?;

        Ok(xs
            .into_iter()
            .zip(ys.into_iter())
            .zip(labels)
            .filter_map(|((x, y), s)| match (x, y, s) {
                (Some(x), Some(y), Some(s)) if !x.is_nan() && !y.is_nan() => Some((x, y, s)),
                _ => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        df!(
            "sepal length (cm)" => &[5.1, 7.0, 6.3],
            "sepal width (cm)" => &[3.5, 3.2, 3.3],
            "petal length (cm)" => &[1.4, 4.7, 6.0],
            "petal width (cm)" => &[0.2, 1.4, 2.5],
            "species" => &["setosa", "versicolor", "virginica"]
        )
        .unwrap()
    }

    #[test]
    fn test_species_index_mapping() {
        assert_eq!(Species::from_index(0), Some(Species::Setosa));
        assert_eq!(Species::from_index(2), Some(Species::Virginica));
        assert_eq!(Species::from_index(3), None);
        assert_eq!(Species::from_label("versicolor"), Some(Species::Versicolor));
        assert_eq!(Species::Virginica.index(), 2);
    }

    #[test]
    fn test_new_accepts_valid_table() {
        let table = RecordTable::new(sample_df()).unwrap();
        assert_eq!(table.height(), 3);
        assert_eq!(
            table.feature_values(Feature::PetalLength).unwrap(),
            vec![1.4, 4.7, 6.0]
        );
        assert_eq!(
            table.species_labels().unwrap(),
            vec![
                Some(Species::Setosa),
                Some(Species::Versicolor),
                Some(Species::Virginica)
            ]
        );
    }

    #[test]
    fn test_new_casts_integer_features() {
        let df = df!(
            "sepal length (cm)" => &[5i64, 7],
            "sepal width (cm)" => &[3i64, 3],
            "petal length (cm)" => &[1i64, 4],
            "petal width (cm)" => &[0i64, 1],
            "species" => &["setosa", "versicolor"]
        )
        .unwrap();
        let table = RecordTable::new(df).unwrap();
        assert_eq!(
            table.feature_values(Feature::SepalLength).unwrap(),
            vec![5.0, 7.0]
        );
    }

    #[test]
    fn test_new_rejects_missing_column() {
        let df = sample_df().drop("species").unwrap();
        assert!(matches!(
            RecordTable::new(df),
            Err(TableError::MissingColumn(c)) if c == "species"
        ));
    }

    #[test]
    fn test_new_rejects_negative_measurement() {
        let df = df!(
            "sepal length (cm)" => &[5.1],
            "sepal width (cm)" => &[-3.5],
            "petal length (cm)" => &[1.4],
            "petal width (cm)" => &[0.2],
            "species" => &["setosa"]
        )
        .unwrap();
        assert!(matches!(
            RecordTable::new(df),
            Err(TableError::NegativeMeasurement { row: 0, .. })
        ));
    }

    #[test]
    fn test_new_rejects_unknown_label() {
        let df = df!(
            "sepal length (cm)" => &[5.1],
            "sepal width (cm)" => &[3.5],
            "petal length (cm)" => &[1.4],
            "petal width (cm)" => &[0.2],
            "species" => &["daisy"]
        )
        .unwrap();
        assert!(matches!(
            RecordTable::new(df),
            Err(TableError::UnknownSpecies(label)) if label == "daisy"
        ));
    }

    #[test]
    fn test_empty_table_has_schema() {
        let table = RecordTable::empty();
        assert!(table.is_empty());
        assert_eq!(table.dataframe().width(), 5);
        assert!(table.feature_values(Feature::SepalWidth).unwrap().is_empty());
    }

    #[test]
    fn test_labeled_points_skips_gaps() {
        let df = df!(
            "sepal length (cm)" => &[Some(5.1), None, Some(6.3)],
            "sepal width (cm)" => &[3.5, 3.2, 3.3],
            "petal length (cm)" => &[1.4, 4.7, 6.0],
            "petal width (cm)" => &[0.2, 1.4, 2.5],
            "species" => &[Some("setosa"), Some("versicolor"), None]
        )
        .unwrap();
        let table = RecordTable::new(df).unwrap();
        let points = table
            .labeled_points(Feature::SepalLength, Feature::PetalLength)
            .unwrap();
        assert_eq!(points, vec![(5.1, 1.4, Species::Setosa)]);
    }
}
