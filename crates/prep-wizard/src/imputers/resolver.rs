//! Missing-value handling for the selected columns.

use polars::prelude::*;
use tracing::{debug, info};

use super::StatisticalImputer;
use crate::dataset::DatasetHandle;
use crate::error::{Result, WizardError};
use crate::prompt::{ChoiceProvider, Prompt, ask_option};
use crate::types::{FeatureSet, Resolution};

/// How missing values are resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NullStrategy {
    /// Drop rows with a null in any selected column.
    DropRows,
    Mean,
    Median,
    Mode,
    /// Fill every null with one value.
    Constant(f64),
}

impl NullStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DropRows => "drop rows",
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Mode => "mode",
            Self::Constant(_) => "constant",
        }
    }
}

/// Resolves nulls found in the selected columns.
///
/// Row drops only look at the selected columns. Fills reach every eligible
/// column of the table unless `restrict_to_selection` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingValueResolver {
    pub restrict_to_selection: bool,
}

impl MissingValueResolver {
    const MENU: &'static str = "missing values";

    pub fn new(restrict_to_selection: bool) -> Self {
        Self {
            restrict_to_selection,
        }
    }

    /// Selected columns with at least one null, with their counts.
    pub fn missing_counts(data: &DatasetHandle, selection: &FeatureSet) -> Vec<(String, usize)> {
        data.null_counts(&selection.selected_columns())
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    /// Interactive entry point.
    pub fn resolve(
        &self,
        data: &mut DatasetHandle,
        selection: &FeatureSet,
        choices: &mut dyn ChoiceProvider,
    ) -> Result<Resolution> {
        let missing = Self::missing_counts(data, selection);
        if missing.is_empty() {
            return Ok(Resolution::NothingToDo(
                "no missing values in the selected columns".to_string(),
            ));
        }

        let prompt = Prompt::menu("Missing value handling")
            .line("Missing values per column:")
            .lines(
                missing
                    .iter()
                    .map(|(col, count)| format!("  {}: {}", col, count)),
            )
            .option("Drop rows with missing values")
            .option("Fill with the mean")
            .option("Fill with the median")
            .option("Fill with the mode")
            .option("Fill with a constant value")
            .option("Back");

        let strategy = match ask_option(choices, Self::MENU, &prompt)? {
            1 => NullStrategy::DropRows,
            2 => NullStrategy::Mean,
            3 => NullStrategy::Median,
            4 => NullStrategy::Mode,
            5 => {
                let answer = choices.prompt(&Prompt::question("Value to fill with"))?;
                let value = answer.trim().parse::<f64>().map_err(|_| {
                    WizardError::InvalidSelection(format!("'{}' is not a number", answer.trim()))
                })?;
                NullStrategy::Constant(value)
            }
            _ => return Ok(Resolution::Cancelled),
        };

        let steps = self.apply(data, selection, strategy)?;
        Ok(Resolution::Applied(steps.join("\n")))
    }

    /// Apply a strategy and return a description of each change made.
    pub fn apply(
        &self,
        data: &mut DatasetHandle,
        selection: &FeatureSet,
        strategy: NullStrategy,
    ) -> Result<Vec<String>> {
        let mut steps = Vec::new();

        if strategy == NullStrategy::DropRows {
            let before = data.height();
            let kept = drop_null_rows(data.df(), &selection.selected_columns())?;
            *data.df_mut() = kept;
            let dropped = before - data.height();
            info!(dropped, remaining = data.height(), "Dropped rows with missing values");
            steps.push(format!(
                "Dropped {} row(s) with missing values, {} remaining",
                dropped,
                data.height()
            ));
            return Ok(steps);
        }

        let candidates = if self.restrict_to_selection {
            selection.selected_columns()
        } else {
            data.column_names()
        };
        let columns: Vec<String> = match strategy {
            NullStrategy::Constant(_) => candidates,
            _ => data.numeric_among(&candidates),
        }
        .into_iter()
        .filter(|c| data.df().column(c).map(|s| s.null_count() > 0).unwrap_or(false))
        .collect();
        debug!(strategy = strategy.name(), ?columns, "Filling missing values");

        let df = data.df_mut();
        for col in &columns {
            match strategy {
                NullStrategy::Mean => StatisticalImputer::apply_numeric_mean(df, col, &mut steps)?,
                NullStrategy::Median => {
                    StatisticalImputer::apply_numeric_median(df, col, &mut steps)?
                }
                NullStrategy::Mode => StatisticalImputer::apply_numeric_mode(df, col, &mut steps)?,
                NullStrategy::Constant(value) => {
                    StatisticalImputer::apply_constant(df, col, value, &mut steps)?
                }
                NullStrategy::DropRows => {}
            }
        }

        if steps.is_empty() {
            steps.push(format!(
                "No numeric column could be filled with the {}",
                strategy.name()
            ));
        }
        info!(strategy = strategy.name(), columns = columns.len(), "Filled missing values");
        Ok(steps)
    }
}

/// Keep only rows where every listed column is non-null. Columns missing
/// from the frame are ignored.
fn drop_null_rows(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    let subset: Vec<String> = columns
        .iter()
        .filter(|c| df.column(c).is_ok())
        .cloned()
        .collect();
    if subset.is_empty() {
        return Ok(df.clone());
    }
    Ok(df.drop_nulls(Some(subset.as_slice()))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedChoices;
    use crate::types::LoadFormat;

    fn dataset() -> (DatasetHandle, FeatureSet) {
        let df = df![
            "age" => [Some(20.0), None, Some(40.0), Some(50.0), Some(60.0)],
            "city" => [Some("a"), Some("b"), None, Some("a"), Some("b")],
            "label" => [1i64, 0, 1, 0, 1],
            "extra" => [Some(1.0), Some(2.0), Some(3.0), None, Some(5.0)],
        ]
        .unwrap();
        let selection = FeatureSet::new(["age", "city"], "label").unwrap();
        (DatasetHandle::new(df, "t.csv", LoadFormat::Csv), selection)
    }

    fn nulls(data: &DatasetHandle, col: &str) -> usize {
        data.df().column(col).unwrap().null_count()
    }

    #[test]
    fn test_missing_counts_only_selected() {
        let (data, selection) = dataset();
        let counts = MissingValueResolver::missing_counts(&data, &selection);
        assert_eq!(
            counts,
            vec![("age".to_string(), 1), ("city".to_string(), 1)]
        );
    }

    #[test]
    fn test_drop_rows_uses_selected_columns() {
        let (mut data, selection) = dataset();
        MissingValueResolver::default()
            .apply(&mut data, &selection, NullStrategy::DropRows)
            .unwrap();
        // Rows 1 and 2 have nulls in age/city; row 3's null is in "extra"
        assert_eq!(data.height(), 3);
        assert_eq!(nulls(&data, "extra"), 1);
    }

    #[test]
    fn test_drop_null_rows_ignores_unknown_columns() {
        let (data, _) = dataset();
        let kept = drop_null_rows(data.df(), &["extra".to_string(), "gone".to_string()]).unwrap();
        assert_eq!(kept.height(), 4);
        assert_eq!(kept.column("extra").unwrap().null_count(), 0);

        let kept = drop_null_rows(data.df(), &["gone".to_string()]).unwrap();
        assert!(kept.equals_missing(data.df()));
    }

    #[test]
    fn test_mean_fill_reaches_whole_table() {
        let (mut data, selection) = dataset();
        MissingValueResolver::default()
            .apply(&mut data, &selection, NullStrategy::Mean)
            .unwrap();
        assert_eq!(nulls(&data, "age"), 0);
        assert_eq!(nulls(&data, "extra"), 0);
        // Text columns are not numeric fills
        assert_eq!(nulls(&data, "city"), 1);
    }

    #[test]
    fn test_restricted_fill_leaves_other_columns() {
        let (mut data, selection) = dataset();
        MissingValueResolver::new(true)
            .apply(&mut data, &selection, NullStrategy::Median)
            .unwrap();
        assert_eq!(nulls(&data, "age"), 0);
        assert_eq!(nulls(&data, "extra"), 1);
    }

    #[test]
    fn test_constant_fill_covers_text() {
        let (mut data, selection) = dataset();
        MissingValueResolver::default()
            .apply(&mut data, &selection, NullStrategy::Constant(0.0))
            .unwrap();
        for col in ["age", "city", "extra"] {
            assert_eq!(nulls(&data, col), 0, "column {col}");
        }
    }

    #[test]
    fn test_resolve_nothing_to_do() {
        let df = df!["a" => [1.0, 2.0], "b" => [3i64, 4]].unwrap();
        let mut data = DatasetHandle::new(df.clone(), "t.csv", LoadFormat::Csv);
        let selection = FeatureSet::new(["a"], "b").unwrap();
        let mut choices = ScriptedChoices::new(Vec::<String>::new());
        let resolution = MissingValueResolver::default()
            .resolve(&mut data, &selection, &mut choices)
            .unwrap();
        assert!(matches!(resolution, Resolution::NothingToDo(_)));
        assert!(data.df().equals_missing(&df));
    }

    #[test]
    fn test_resolve_back_and_invalid_option() {
        let (mut data, selection) = dataset();
        let mut choices = ScriptedChoices::new(["6", "9"]);
        let resolver = MissingValueResolver::default();
        assert_eq!(
            resolver.resolve(&mut data, &selection, &mut choices).unwrap(),
            Resolution::Cancelled
        );
        assert!(matches!(
            resolver.resolve(&mut data, &selection, &mut choices),
            Err(WizardError::InvalidOption { .. })
        ));
        assert_eq!(nulls(&data, "age"), 1);
    }

    #[test]
    fn test_resolve_constant_from_prompt() {
        let (mut data, selection) = dataset();
        let mut choices = ScriptedChoices::new(["5", "-1"]);
        let resolution = MissingValueResolver::default()
            .resolve(&mut data, &selection, &mut choices)
            .unwrap();
        assert!(matches!(resolution, Resolution::Applied(_)));
        assert_eq!(nulls(&data, "age"), 0);
    }
}
