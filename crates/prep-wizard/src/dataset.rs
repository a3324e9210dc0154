//! The in-memory dataset owned by the stage gate.

use chrono::{DateTime, Local};
use polars::prelude::*;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::{Result, WizardError};
use crate::types::LoadFormat;
use crate::utils::{DtypeCategory, get_dtype_category, is_numeric_dtype};

/// A loaded table together with where it came from.
#[derive(Debug, Clone)]
pub struct DatasetHandle {
    df: DataFrame,
    source: PathBuf,
    format: LoadFormat,
    /// Table name when the source is a relational store.
    table: Option<String>,
    loaded_at: DateTime<Local>,
}

impl DatasetHandle {
    pub fn new(df: DataFrame, source: impl Into<PathBuf>, format: LoadFormat) -> Self {
        Self {
            df,
            source: source.into(),
            format,
            table: None,
            loaded_at: Local::now(),
        }
    }

    /// Record the table the data was read from.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn df_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn format(&self) -> LoadFormat {
        self.format
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn loaded_at(&self) -> DateTime<Local> {
        self.loaded_at
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    /// Get a column as a Series.
    pub fn series(&self, name: &str) -> Result<&Series> {
        self.df
            .column(name)
            .map(|col| col.as_materialized_series())
            .map_err(|_| WizardError::ColumnNotFound(name.to_string()))
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.df
            .column(name)
            .map(|col| is_numeric_dtype(col.dtype()))
            .unwrap_or(false)
    }

    pub fn is_categorical(&self, name: &str) -> bool {
        self.df
            .column(name)
            .map(|col| get_dtype_category(col.dtype()) == DtypeCategory::String)
            .unwrap_or(false)
    }

    /// The given columns that exist and are numeric, in the given order.
    pub fn numeric_among(&self, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .filter(|c| self.is_numeric(c))
            .cloned()
            .collect()
    }

    /// The given columns that exist and hold text or categorical values.
    pub fn categorical_among(&self, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .filter(|c| self.is_categorical(c))
            .cloned()
            .collect()
    }

    /// Null count per column, for the given columns that exist.
    pub fn null_counts(&self, columns: &[String]) -> Vec<(String, usize)> {
        columns
            .iter()
            .filter_map(|c| {
                self.df
                    .column(c)
                    .ok()
                    .map(|col| (c.clone(), col.null_count()))
            })
            .collect()
    }

    /// Text shown to the operator right after loading.
    pub fn summary(&self, preview_rows: usize) -> String {
        let mut out = String::new();
        let _ = write!(out, "Loaded {} as {}", self.source.display(), self.format());
        if let Some(table) = &self.table {
            let _ = write!(out, " (table '{}')", table);
        }
        let _ = writeln!(
            out,
            " at {}: {} rows x {} columns",
            self.loaded_at.format("%Y-%m-%d %H:%M:%S"),
            self.df.height(),
            self.df.width()
        );
        for col in self.df.get_columns() {
            let _ = writeln!(out, "  {:<24} {}", col.name().as_str(), col.dtype());
        }
        let _ = write!(out, "{}", self.df.head(Some(preview_rows)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DatasetHandle {
        let df = df![
            "age" => [Some(30i64), None, Some(45)],
            "city" => ["Lima", "Quito", "Lima"],
            "score" => [1.5, 2.5, 3.5],
        ]
        .unwrap();
        DatasetHandle::new(df, "people.csv", LoadFormat::Csv)
    }

    #[test]
    fn test_column_classification() {
        let data = sample();
        let all = data.column_names();
        assert_eq!(all, vec!["age", "city", "score"]);
        assert_eq!(data.numeric_among(&all), vec!["age", "score"]);
        assert_eq!(data.categorical_among(&all), vec!["city"]);
        assert!(!data.is_numeric("missing"));
    }

    #[test]
    fn test_null_counts_skip_unknown_columns() {
        let data = sample();
        let counts = data.null_counts(&["age".to_string(), "gone".to_string()]);
        assert_eq!(counts, vec![("age".to_string(), 1)]);
    }

    #[test]
    fn test_summary_mentions_shape() {
        let data = sample().with_table("people");
        let summary = data.summary(2);
        assert!(summary.contains("3 rows x 3 columns"));
        assert!(summary.contains("people.csv as CSV"));
        assert!(summary.contains("table 'people'"));
    }

    #[test]
    fn test_series_lookup() {
        let data = sample();
        assert!(data.series("city").is_ok());
        assert!(matches!(
            data.series("nope"),
            Err(WizardError::ColumnNotFound(_))
        ));
    }
}
