//! Statistical imputation methods.
//!
//! Provides mean, median, mode and constant fills for single columns.

use polars::prelude::*;
use tracing::warn;

use crate::error::Result;
use crate::utils::{
    DtypeCategory, fill_boolean_nulls, fill_numeric_nulls, fill_string_nulls, format_number,
    mode, non_null_values, series_dtype_category,
};

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill a numeric column with its mean.
    pub fn apply_numeric_mean(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        Self::fill_with_statistic(df, col_name, processing_steps, "mean", |series| series.mean())
    }

    /// Fill a numeric column with its median.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        Self::fill_with_statistic(df, col_name, processing_steps, "median", |series| series.median())
    }

    /// Fill a numeric column with its mode, the smallest one on ties.
    pub fn apply_numeric_mode(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        Self::fill_with_statistic(df, col_name, processing_steps, "mode", |series| {
            non_null_values(series).ok().and_then(|values| mode(&values))
        })
    }

    /// Fill any column with a constant.
    ///
    /// Numeric columns get the value, text columns its text form, boolean
    /// columns `value != 0`. Other column types are left alone.
    pub fn apply_constant(
        df: &mut DataFrame,
        col_name: &str,
        value: f64,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        let Ok(column) = df.column(col_name) else {
            return Ok(());
        };
        let series = column.as_materialized_series().clone();
        let filled = match series_dtype_category(&series) {
            DtypeCategory::Numeric => fill_numeric_nulls(&series, value)?,
            DtypeCategory::String => fill_string_nulls(&series, &format_number(value))?,
            DtypeCategory::Boolean => fill_boolean_nulls(&series, value != 0.0)?,
            _ => {
                warn!(
                    column = col_name,
                    dtype = %series.dtype(),
                    "Constant fill skipped for unsupported column type"
                );
                return Ok(());
            }
        };
        df.replace(col_name, filled)?;

        processing_steps.push(format!(
            "Filled '{}' with constant {}",
            col_name,
            format_number(value)
        ));
        Ok(())
    }

    fn fill_with_statistic(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
        method: &str,
        statistic: fn(&Series) -> Option<f64>,
    ) -> Result<()> {
        let Ok(column) = df.column(col_name) else {
            return Ok(());
        };
        let series = column.as_materialized_series().clone();
        let Some(fill_value) = statistic(&series) else {
            warn!(column = col_name, method, "Column has no values to compute a fill from");
            return Ok(());
        };
        let filled = fill_numeric_nulls(&series, fill_value)?;
        df.replace(col_name, filled)?;

        processing_steps.push(format!(
            "Filled '{}' with {}: {:.4}",
            col_name, method, fill_value
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(df: &DataFrame, col: &str, row: usize) -> f64 {
        df.column(col)
            .unwrap()
            .as_materialized_series()
            .get(row)
            .unwrap()
            .try_extract::<f64>()
            .unwrap()
    }

    #[test]
    fn test_mean_fill() {
        let mut df = df!["x" => [Some(1i64), None, Some(5)]].unwrap();
        let mut steps = Vec::new();
        StatisticalImputer::apply_numeric_mean(&mut df, "x", &mut steps).unwrap();
        assert_eq!(value(&df, "x", 1), 3.0);
        assert_eq!(df.column("x").unwrap().dtype(), &DataType::Float64);
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn test_median_fill() {
        let mut df = df!["x" => [Some(1.0), Some(2.0), None, Some(10.0)]].unwrap();
        let mut steps = Vec::new();
        StatisticalImputer::apply_numeric_median(&mut df, "x", &mut steps).unwrap();
        assert_eq!(value(&df, "x", 2), 2.0);
    }

    #[test]
    fn test_mode_fill_prefers_smallest() {
        let mut df = df!["x" => [Some(4.0), Some(2.0), Some(4.0), Some(2.0), None]].unwrap();
        let mut steps = Vec::new();
        StatisticalImputer::apply_numeric_mode(&mut df, "x", &mut steps).unwrap();
        assert_eq!(value(&df, "x", 4), 2.0);
    }

    #[test]
    fn test_all_null_column_is_left_alone() {
        let mut df = df!["x" => [None::<f64>, None]].unwrap();
        let mut steps = Vec::new();
        StatisticalImputer::apply_numeric_mean(&mut df, "x", &mut steps).unwrap();
        assert_eq!(df.column("x").unwrap().null_count(), 2);
        assert!(steps.is_empty());
    }

    #[test]
    fn test_constant_fill_by_type() {
        let mut df = df![
            "n" => [Some(1.0), None],
            "s" => [Some("a"), None],
            "b" => [Some(true), None],
        ]
        .unwrap();
        let mut steps = Vec::new();
        for col in ["n", "s", "b"] {
            StatisticalImputer::apply_constant(&mut df, col, 0.0, &mut steps).unwrap();
        }
        assert_eq!(value(&df, "n", 1), 0.0);
        let s = df.column("s").unwrap().as_materialized_series();
        assert_eq!(s.str().unwrap().get(1), Some("0"));
        let b = df.column("b").unwrap().as_materialized_series();
        assert_eq!(b.bool().unwrap().get(1), Some(false));
        assert_eq!(steps.len(), 3);
    }
}
