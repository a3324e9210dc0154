//! Shared utilities for the wizard stages.
//!
//! Data type classification, numeric extraction from Polars series, and the
//! small set of descriptive statistics the stages agree on (mean, median,
//! linear-interpolated quantiles, mode, standard deviation).

use polars::prelude::*;
use std::cmp::Ordering;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for preprocessing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

/// Get the dtype category of a Series.
pub fn series_dtype_category(series: &Series) -> DtypeCategory {
    get_dtype_category(series.dtype())
}

// =============================================================================
// Series Extraction Utilities
// =============================================================================

/// Extract the values of a numeric Series as `f64`, keeping nulls.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

/// Extract the non-null values of a numeric Series as `f64`.
pub fn non_null_values(series: &Series) -> PolarsResult<Vec<f64>> {
    Ok(numeric_values(series)?.into_iter().flatten().collect())
}

/// Extract the values of a Series as text, keeping nulls.
pub fn text_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let strings = series.cast(&DataType::String)?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

// =============================================================================
// Descriptive Statistics
// =============================================================================

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sort a copy of the values in ascending order.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Quantile of already-sorted values using linear interpolation between
/// the two nearest ranks. `None` for an empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Quantile of unsorted values, see [`quantile_sorted`].
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    quantile_sorted(&sorted(values), q)
}

/// Median (the 0.5 quantile).
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Most frequent value. On ties the smallest modal value wins.
pub fn mode(values: &[f64]) -> Option<f64> {
    let sorted = sorted(values);
    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let run = sorted[i..]
            .iter()
            .take_while(|v| v.total_cmp(&value) == Ordering::Equal)
            .count();
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((value, run));
        }
        i += run;
    }
    best.map(|(value, _)| value)
}

/// Population standard deviation (divisor N).
pub fn population_std(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Sample standard deviation (divisor N - 1). `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always `Float64`.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let filled: Vec<Option<f64>> = numeric_values(series)?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let filled: Vec<Option<String>> = text_values(series)?
        .into_iter()
        .map(|v| Some(v.unwrap_or_else(|| fill_value.to_string())))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a boolean Series with a specific value.
pub fn fill_boolean_nulls(series: &Series, fill_value: bool) -> PolarsResult<Series> {
    let filled: Vec<Option<bool>> = series
        .bool()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Format a float the way a spreadsheet would show it (no trailing `.0`).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_dtype_category() {
        assert_eq!(get_dtype_category(&DataType::Int64), DtypeCategory::Numeric);
        assert_eq!(get_dtype_category(&DataType::Date), DtypeCategory::Datetime);
        assert_eq!(
            get_dtype_category(&DataType::Boolean),
            DtypeCategory::Boolean
        );
        assert_eq!(get_dtype_category(&DataType::String), DtypeCategory::String);
    }

    #[test]
    fn test_numeric_values_keeps_nulls() {
        let series = Series::new("x".into(), &[Some(1i64), None, Some(3)]);
        let values = numeric_values(&series).unwrap();
        assert_eq!(values, vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(non_null_values(&series).unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_quartiles_interpolate() {
        let values = [1.0, 2.0, 3.0, 4.0, 100.0];
        assert_eq!(quantile(&values, 0.25), Some(2.0));
        assert_eq!(quantile(&values, 0.75), Some(4.0));
        assert_eq!(median(&values), Some(3.0));

        // Between ranks: position 0.75 of [10, 20]
        let pair = [20.0, 10.0];
        assert!((quantile(&pair, 0.75).unwrap() - 17.5).abs() < EPS);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
    }

    #[test]
    fn test_empty_statistics() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(mode(&[]), None);
        assert_eq!(population_std(&[]), None);
        assert_eq!(sample_std(&[1.0]), None);
    }

    #[test]
    fn test_mode_prefers_smallest_on_ties() {
        assert_eq!(mode(&[3.0, 1.0, 3.0, 1.0, 2.0]), Some(1.0));
        assert_eq!(mode(&[5.0, 7.0, 7.0]), Some(7.0));
        assert_eq!(mode(&[4.0]), Some(4.0));
    }

    #[test]
    fn test_standard_deviations() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std(&values).unwrap() - 2.0).abs() < EPS);
        assert!((sample_std(&values).unwrap() - 2.138089935299395).abs() < 1e-9);
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1.0), None, Some(3.0)]);
        let filled = fill_numeric_nulls(&series, 0.0).unwrap();

        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 0.0);
        assert_eq!(filled.name().as_str(), "test");
    }

    #[test]
    fn test_fill_string_nulls() {
        let series = Series::new("c".into(), &[Some("a"), None]);
        let filled = fill_string_nulls(&series, "7").unwrap();
        assert_eq!(filled.str().unwrap().get(1), Some("7"));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-2.5), "-2.5");
    }
}
