//! In-place integer codes for a categorical column.

use polars::prelude::*;
use std::collections::HashMap;

use crate::error::{Result, WizardError};
use crate::utils::text_values;

/// Replace the values of `column` with integer codes assigned in order of
/// first appearance, starting at 0. Null is coded like any other value.
///
/// Returns the number of distinct codes.
pub fn encode_ordinal(df: &mut DataFrame, column: &str) -> Result<usize> {
    let series = df
        .column(column)
        .map_err(|_| WizardError::ColumnNotFound(column.to_string()))?
        .as_materialized_series()
        .clone();

    let mut codes: HashMap<Option<String>, i64> = HashMap::new();
    let encoded: Vec<i64> = text_values(&series)?
        .into_iter()
        .map(|value| {
            let next = codes.len() as i64;
            *codes.entry(value).or_insert(next)
        })
        .collect();

    df.replace(column, Series::new(column.into(), encoded))?;
    Ok(codes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_first_appearance() {
        let mut df = df!["c" => [Some("b"), Some("a"), None, Some("b"), Some("c")]].unwrap();
        let distinct = encode_ordinal(&mut df, "c").unwrap();

        assert_eq!(distinct, 4);
        let codes: Vec<Option<i64>> = df
            .column("c")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(codes, vec![Some(0), Some(1), Some(2), Some(0), Some(3)]);
    }

    #[test]
    fn test_column_position_is_kept() {
        let mut df = df!["a" => [1i64, 2], "c" => ["x", "y"], "z" => [0i64, 0]].unwrap();
        encode_ordinal(&mut df, "c").unwrap();
        assert_eq!(df.get_column_names()[1].as_str(), "c");
        assert_eq!(df.column("c").unwrap().dtype(), &DataType::Int64);
    }
}
