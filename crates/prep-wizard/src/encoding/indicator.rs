//! Indicator (one-hot) expansion of a categorical column.

use polars::prelude::*;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use crate::error::{Result, WizardError};
use crate::utils::text_values;

/// Names of the indicator columns `column` would expand into, ordered by
/// value.
pub fn indicator_names(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let series = df
        .column(column)
        .map_err(|_| WizardError::ColumnNotFound(column.to_string()))?
        .as_materialized_series();
    let distinct: BTreeSet<String> = text_values(series)?.into_iter().flatten().collect();
    Ok(distinct
        .iter()
        .map(|value| format!("{}_{}", column, value))
        .collect())
}

/// Fail with `ColumnConflict` if any planned name is already a column of
/// `df` or is planned twice.
pub fn check_indicator_names(df: &DataFrame, planned: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(planned.len());
    for name in planned {
        if df.column(name).is_ok() || !seen.insert(name.as_str()) {
            return Err(WizardError::ColumnConflict(name.clone()));
        }
    }
    Ok(())
}

/// Replace `column` with one 0/1 column per distinct value.
///
/// New columns are named `<column>_<value>`, ordered by value, typed Int64
/// and appended after the existing columns. Rows holding null get 0 in every
/// indicator. Returns the names of the new columns.
///
/// If a new name is already taken the frame is left untouched and
/// `ColumnConflict` is returned.
pub fn expand_indicators(df: &mut DataFrame, column: &str) -> Result<Vec<String>> {
    let names = indicator_names(df, column)?;
    check_indicator_names(df, &names)?;

    let values = text_values(df.column(column)?.as_materialized_series())?;
    let prefix_len = column.len() + 1;
    let mut indicators = Vec::with_capacity(names.len());
    for name in &names {
        let value = &name[prefix_len..];
        let flags: Vec<i64> = values
            .iter()
            .map(|v| i64::from(v.as_deref() == Some(value)))
            .collect();
        indicators.push(Series::new(name.as_str().into(), flags));
    }

    df.drop_in_place(column)?;
    for indicator in indicators {
        df.with_column(indicator)?;
    }

    debug!(column, indicators = ?names, "Expanded indicator columns");
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(df: &DataFrame, col: &str) -> Vec<Option<i64>> {
        df.column(col)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_expand_appends_sorted_indicators() {
        let mut df = df![
            "color" => ["red", "blue", "red"],
            "n" => [1i64, 2, 3],
        ]
        .unwrap();

        let names = expand_indicators(&mut df, "color").unwrap();

        assert_eq!(names, vec!["color_blue", "color_red"]);
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(columns, vec!["n", "color_blue", "color_red"]);
        assert_eq!(ints(&df, "color_blue"), vec![Some(0), Some(1), Some(0)]);
        assert_eq!(ints(&df, "color_red"), vec![Some(1), Some(0), Some(1)]);
    }

    #[test]
    fn test_null_rows_have_no_indicator_set() {
        let mut df = df!["c" => [Some("x"), None]].unwrap();
        expand_indicators(&mut df, "c").unwrap();
        assert_eq!(ints(&df, "c_x"), vec![Some(1), Some(0)]);
        assert_eq!(df.width(), 1);
    }

    #[test]
    fn test_name_clash_leaves_frame_untouched() {
        let mut df = df![
            "color" => ["red", "blue", "red"],
            "color_red" => [7i64, 8, 9],
        ]
        .unwrap();
        let before = df.clone();

        let err = expand_indicators(&mut df, "color").unwrap_err();

        assert!(matches!(err, WizardError::ColumnConflict(ref name) if name == "color_red"));
        assert!(df.equals_missing(&before));
    }

    #[test]
    fn test_check_rejects_repeated_planned_name() {
        let df = df!["a" => [1i64]].unwrap();
        let planned = vec!["a_x_y".to_string(), "a_x_y".to_string()];
        assert!(matches!(
            check_indicator_names(&df, &planned),
            Err(WizardError::ColumnConflict(_))
        ));
    }

    #[test]
    fn test_missing_column() {
        let mut df = df!["c" => ["x"]].unwrap();
        assert!(matches!(
            expand_indicators(&mut df, "d"),
            Err(WizardError::ColumnNotFound(_))
        ));
    }
}
