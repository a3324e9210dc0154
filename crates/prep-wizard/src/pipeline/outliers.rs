//! Outlier handling module.
//!
//! Detects outliers in numeric feature columns with the IQR rule and
//! resolves them by dropping rows, replacing values with the median, or
//! leaving them alone. Bounds and medians are computed once, from the data
//! as it stands before any change. Nulls are never outliers.

use polars::prelude::*;
use tracing::{debug, info};

use crate::dataset::DatasetHandle;
use crate::error::{Result, WizardError};
use crate::prompt::{ChoiceProvider, Prompt, ask_option};
use crate::types::{FeatureSet, Resolution};
use crate::utils::{numeric_values, quantile_sorted, sorted};

/// IQR band of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierBand {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBand {
    /// Band `[Q1 - k*IQR, Q3 + k*IQR]` of the non-null values.
    pub fn from_values(values: &[f64], multiplier: f64) -> Option<Self> {
        let sorted = sorted(values);
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    /// A value is an outlier iff it lies strictly outside the band.
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Outlier findings for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnOutliers {
    pub column: String,
    pub band: OutlierBand,
    /// Median of the non-null values before any change.
    pub median: f64,
    /// Per-row outlier flags.
    pub flags: Vec<bool>,
}

impl ColumnOutliers {
    pub fn count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }
}

/// How detected outliers are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlierStrategy {
    /// Drop every row that is an outlier in any flagged column.
    DropRows,
    /// Replace each outlier with its column's median.
    ReplaceWithMedian,
    /// Leave values unchanged.
    Keep,
}

/// Handles outlier detection and treatment.
#[derive(Debug, Clone, Copy)]
pub struct OutlierHandler {
    pub iqr_multiplier: f64,
}

impl Default for OutlierHandler {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
        }
    }
}

impl OutlierHandler {
    const MENU: &'static str = "outliers";

    pub fn new(iqr_multiplier: f64) -> Self {
        Self { iqr_multiplier }
    }

    /// Scan the given numeric columns. Only columns with outliers are returned.
    pub fn detect(&self, df: &DataFrame, columns: &[String]) -> Result<Vec<ColumnOutliers>> {
        let mut found = Vec::new();
        for column in columns {
            let series = df
                .column(column)
                .map_err(|_| WizardError::ColumnNotFound(column.clone()))?
                .as_materialized_series();
            let values = numeric_values(series)?;
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            let Some(band) = OutlierBand::from_values(&present, self.iqr_multiplier) else {
                continue;
            };
            let median = quantile_sorted(&sorted(&present), 0.5).unwrap_or(band.q1);
            let flags: Vec<bool> = values
                .iter()
                .map(|v| v.is_some_and(|x| band.is_outlier(x)))
                .collect();

            let outliers = ColumnOutliers {
                column: column.clone(),
                band,
                median,
                flags,
            };
            debug!(
                column = %column,
                lower = outliers.band.lower,
                upper = outliers.band.upper,
                count = outliers.count(),
                "Scanned column for outliers"
            );
            if outliers.count() > 0 {
                found.push(outliers);
            }
        }
        Ok(found)
    }

    /// Interactive entry point.
    pub fn resolve(
        &self,
        data: &mut DatasetHandle,
        selection: &FeatureSet,
        choices: &mut dyn ChoiceProvider,
    ) -> Result<Resolution> {
        let numeric = data.numeric_among(selection.features());
        if numeric.is_empty() {
            return Ok(Resolution::NothingToDo(
                "no numeric feature columns".to_string(),
            ));
        }

        let found = self.detect(data.df(), &numeric)?;
        if found.is_empty() {
            return Ok(Resolution::NothingToDo("no outliers detected".to_string()));
        }

        let prompt = Prompt::menu("Outlier detection and handling")
            .line("Outliers per column:")
            .lines(found.iter().map(|o| {
                format!(
                    "  {}: {} outside [{:.4}, {:.4}]",
                    o.column,
                    o.count(),
                    o.band.lower,
                    o.band.upper
                )
            }))
            .option("Drop rows with outliers")
            .option("Replace outliers with the median")
            .option("Keep outliers")
            .option("Back");

        let strategy = match ask_option(choices, Self::MENU, &prompt)? {
            1 => OutlierStrategy::DropRows,
            2 => OutlierStrategy::ReplaceWithMedian,
            3 => OutlierStrategy::Keep,
            _ => return Ok(Resolution::Cancelled),
        };

        self.apply(data, &found, strategy)
    }

    /// Apply a strategy to previously detected outliers.
    pub fn apply(
        &self,
        data: &mut DatasetHandle,
        found: &[ColumnOutliers],
        strategy: OutlierStrategy,
    ) -> Result<Resolution> {
        let description = match strategy {
            OutlierStrategy::DropRows => {
                let before = data.height();
                let keep: Vec<bool> = (0..before)
                    .map(|row| !found.iter().any(|o| o.flags[row]))
                    .collect();
                let mask = BooleanChunked::from_slice("mask".into(), &keep);
                let filtered = data.df().filter(&mask)?;
                *data.df_mut() = filtered;
                format!(
                    "Removed {} rows containing outliers, {} remaining",
                    before - data.height(),
                    data.height()
                )
            }
            OutlierStrategy::ReplaceWithMedian => {
                let df = data.df_mut();
                let mut steps = Vec::with_capacity(found.len());
                for outliers in found {
                    let series = df
                        .column(&outliers.column)
                        .map_err(|_| WizardError::ColumnNotFound(outliers.column.clone()))?
                        .as_materialized_series()
                        .clone();
                    let replaced: Vec<Option<f64>> = numeric_values(&series)?
                        .into_iter()
                        .zip(&outliers.flags)
                        .map(|(v, &flag)| if flag { Some(outliers.median) } else { v })
                        .collect();
                    df.replace(
                        &outliers.column,
                        Series::new(outliers.column.as_str().into(), replaced),
                    )?;
                    steps.push(format!(
                        "Replaced {} outliers in '{}' with median {:.4}",
                        outliers.count(),
                        outliers.column,
                        outliers.median
                    ));
                }
                steps.join("\n")
            }
            OutlierStrategy::Keep => "Kept all outliers".to_string(),
        };

        info!(?strategy, columns = found.len(), "Resolved outliers");
        Ok(Resolution::Applied(description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedChoices;
    use crate::types::LoadFormat;

    fn dataset() -> (DatasetHandle, FeatureSet) {
        let df = df![
            "value" => [1.0, 2.0, 3.0, 4.0, 100.0],
            "label" => ["a", "b", "a", "b", "a"],
        ]
        .unwrap();
        let selection = FeatureSet::new(["value"], "label").unwrap();
        (DatasetHandle::new(df, "t.csv", LoadFormat::Csv), selection)
    }

    fn values(data: &DatasetHandle, col: &str) -> Vec<f64> {
        numeric_values(data.series(col).unwrap())
            .unwrap()
            .into_iter()
            .flatten()
            .collect()
    }

    // ==================== band tests ====================

    #[test]
    fn test_band_for_reference_column() {
        let band = OutlierBand::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0], 1.5).unwrap();
        assert_eq!(band.q1, 2.0);
        assert_eq!(band.q3, 4.0);
        assert_eq!(band.lower, -1.0);
        assert_eq!(band.upper, 7.0);
        assert!(band.is_outlier(100.0));
        assert!(!band.is_outlier(7.0));
        assert!(!band.is_outlier(-1.0));
    }

    #[test]
    fn test_band_of_empty_column() {
        assert!(OutlierBand::from_values(&[], 1.5).is_none());
    }

    // ==================== strategy tests ====================

    #[test]
    fn test_drop_removes_outlier_rows() {
        let (mut data, _) = dataset();
        let handler = OutlierHandler::default();
        let found = handler.detect(data.df(), &["value".to_string()]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].count(), 1);

        handler
            .apply(&mut data, &found, OutlierStrategy::DropRows)
            .unwrap();
        assert_eq!(values(&data, "value"), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(data.height(), 4);
    }

    #[test]
    fn test_median_replacement_uses_original_median() {
        let (mut data, _) = dataset();
        let handler = OutlierHandler::default();
        let found = handler.detect(data.df(), &["value".to_string()]).unwrap();
        handler
            .apply(&mut data, &found, OutlierStrategy::ReplaceWithMedian)
            .unwrap();

        let after = values(&data, "value");
        assert_eq!(after, vec![1.0, 2.0, 3.0, 4.0, 3.0]);
        let band = &found[0].band;
        assert!(after.iter().all(|&v| !band.is_outlier(v)));
    }

    #[test]
    fn test_nulls_are_kept_when_dropping() {
        let df = df![
            "v" => [Some(1.0), None, Some(2.0), Some(3.0), Some(4.0), Some(100.0)],
            "t" => [0i64, 1, 0, 1, 0, 1],
        ]
        .unwrap();
        let mut data = DatasetHandle::new(df, "t.csv", LoadFormat::Csv);
        let handler = OutlierHandler::default();
        let found = handler.detect(data.df(), &["v".to_string()]).unwrap();
        handler
            .apply(&mut data, &found, OutlierStrategy::DropRows)
            .unwrap();
        assert_eq!(data.height(), 5);
    }

    #[test]
    fn test_bounds_computed_once_across_columns() {
        // Row 4 is an outlier in "a" only; dropping it must not change the
        // verdict for "b", which was scanned on the starting data.
        let df = df![
            "a" => [1.0, 2.0, 3.0, 4.0, 100.0, 2.0],
            "b" => [10.0, 11.0, 12.0, 13.0, 12.0, 50.0],
            "t" => [0i64, 0, 0, 0, 0, 0],
        ]
        .unwrap();
        let mut data = DatasetHandle::new(df, "t.csv", LoadFormat::Csv);
        let handler = OutlierHandler::default();
        let found = handler
            .detect(data.df(), &["a".to_string(), "b".to_string()])
            .unwrap();
        assert_eq!(found.len(), 2);
        handler
            .apply(&mut data, &found, OutlierStrategy::DropRows)
            .unwrap();
        assert_eq!(data.height(), 4);
    }

    #[test]
    fn test_resolve_nothing_to_do() {
        let df = df!["v" => [1.0, 2.0, 3.0], "t" => [0i64, 1, 0]].unwrap();
        let mut data = DatasetHandle::new(df.clone(), "t.csv", LoadFormat::Csv);
        let selection = FeatureSet::new(["v"], "t").unwrap();
        let mut choices = ScriptedChoices::new(Vec::<String>::new());
        let resolution = OutlierHandler::default()
            .resolve(&mut data, &selection, &mut choices)
            .unwrap();
        assert!(matches!(resolution, Resolution::NothingToDo(_)));
        assert!(data.df().equals_missing(&df));
    }

    #[test]
    fn test_resolve_keep_and_back() {
        let (mut data, selection) = dataset();
        let mut choices = ScriptedChoices::new(["4", "3"]);
        let handler = OutlierHandler::default();
        assert_eq!(
            handler.resolve(&mut data, &selection, &mut choices).unwrap(),
            Resolution::Cancelled
        );
        let kept = handler.resolve(&mut data, &selection, &mut choices).unwrap();
        assert_eq!(kept, Resolution::Applied("Kept all outliers".to_string()));
        assert_eq!(data.height(), 5);
    }
}
