//! Categorical encoding of text feature columns.
//!
//! Two strategies are offered:
//! - Indicator expansion: one 0/1 column per distinct value
//! - Ordinal codes: integers in order of first appearance, in place
//!
//! Value sets are derived from the data at the time of encoding.

mod indicator;
mod ordinal;

pub use indicator::{check_indicator_names, expand_indicators, indicator_names};
pub use ordinal::encode_ordinal;

use tracing::info;

use crate::dataset::DatasetHandle;
use crate::error::Result;
use crate::prompt::{ChoiceProvider, Prompt, ask_option};
use crate::types::{FeatureSet, Resolution};

/// Encoding strategy for categorical features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingStrategy {
    Indicator,
    Ordinal,
}

/// Result of an encoding pass.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingOutcome {
    pub resolution: Resolution,
    /// Indicator columns created, per original column.
    pub derived: Vec<(String, Vec<String>)>,
}

impl EncodingOutcome {
    fn without_changes(resolution: Resolution) -> Self {
        Self {
            resolution,
            derived: Vec::new(),
        }
    }
}

/// Encodes the categorical features of the selection.
pub struct CategoricalEncoder;

impl CategoricalEncoder {
    const MENU: &'static str = "categorical encoding";

    /// Interactive entry point.
    pub fn resolve(
        data: &mut DatasetHandle,
        selection: &FeatureSet,
        choices: &mut dyn ChoiceProvider,
    ) -> Result<EncodingOutcome> {
        let categorical = data.categorical_among(selection.features());
        if categorical.is_empty() {
            return Ok(EncodingOutcome::without_changes(Resolution::NothingToDo(
                "no categorical feature columns".to_string(),
            )));
        }

        let prompt = Prompt::menu("Categorical encoding")
            .line(format!("Categorical features: {}", categorical.join(", ")))
            .option("Indicator columns (one-hot)")
            .option("Integer codes (label encoding)")
            .option("Back");

        let strategy = match ask_option(choices, Self::MENU, &prompt)? {
            1 => EncodingStrategy::Indicator,
            2 => EncodingStrategy::Ordinal,
            _ => return Ok(EncodingOutcome::without_changes(Resolution::Cancelled)),
        };

        Self::apply(data, &categorical, strategy)
    }

    /// Encode the given columns with one strategy.
    pub fn apply(
        data: &mut DatasetHandle,
        columns: &[String],
        strategy: EncodingStrategy,
    ) -> Result<EncodingOutcome> {
        if strategy == EncodingStrategy::Indicator {
            // Every column is checked before the first one is expanded.
            let mut planned = Vec::new();
            for column in columns {
                planned.extend(indicator_names(data.df(), column)?);
            }
            check_indicator_names(data.df(), &planned)?;
        }

        let mut steps = Vec::with_capacity(columns.len());
        let mut derived = Vec::new();
        let df = data.df_mut();

        for column in columns {
            match strategy {
                EncodingStrategy::Indicator => {
                    let names = expand_indicators(df, column)?;
                    steps.push(format!(
                        "Expanded '{}' into {} indicator column(s): {}",
                        column,
                        names.len(),
                        names.join(", ")
                    ));
                    derived.push((column.clone(), names));
                }
                EncodingStrategy::Ordinal => {
                    let distinct = encode_ordinal(df, column)?;
                    steps.push(format!(
                        "Encoded '{}' as integer codes 0-{}",
                        column,
                        distinct.saturating_sub(1)
                    ));
                }
            }
        }

        info!(?strategy, columns = columns.len(), "Encoded categorical features");
        Ok(EncodingOutcome {
            resolution: Resolution::Applied(steps.join("\n")),
            derived,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WizardError;
    use crate::prompt::ScriptedChoices;
    use crate::types::LoadFormat;
    use polars::prelude::*;

    fn dataset() -> (DatasetHandle, FeatureSet) {
        let df = df![
            "size" => [1.0, 2.0, 3.0],
            "color" => ["red", "blue", "red"],
            "label" => ["yes", "no", "yes"],
        ]
        .unwrap();
        let selection = FeatureSet::new(["size", "color"], "label").unwrap();
        (DatasetHandle::new(df, "t.csv", LoadFormat::Csv), selection)
    }

    #[test]
    fn test_indicator_leaves_target_alone() {
        let (mut data, selection) = dataset();
        let mut choices = ScriptedChoices::new(["1"]);
        let outcome = CategoricalEncoder::resolve(&mut data, &selection, &mut choices).unwrap();

        assert!(matches!(outcome.resolution, Resolution::Applied(_)));
        assert_eq!(
            outcome.derived,
            vec![(
                "color".to_string(),
                vec!["color_blue".to_string(), "color_red".to_string()]
            )]
        );
        assert!(!data.has_column("color"));
        assert!(data.is_categorical("label"));
    }

    #[test]
    fn test_ordinal_keeps_columns() {
        let (mut data, selection) = dataset();
        let mut choices = ScriptedChoices::new(["2"]);
        let outcome = CategoricalEncoder::resolve(&mut data, &selection, &mut choices).unwrap();
        assert!(outcome.derived.is_empty());
        assert!(data.is_numeric("color"));
        assert_eq!(data.df().width(), 3);
    }

    #[test]
    fn test_nothing_to_do_without_text_features() {
        let df = df!["a" => [1.0], "b" => ["x"]].unwrap();
        let mut data = DatasetHandle::new(df.clone(), "t.csv", LoadFormat::Csv);
        let selection = FeatureSet::new(["a"], "b").unwrap();
        let mut choices = ScriptedChoices::new(Vec::<String>::new());
        let outcome = CategoricalEncoder::resolve(&mut data, &selection, &mut choices).unwrap();
        assert!(matches!(outcome.resolution, Resolution::NothingToDo(_)));
        assert!(data.df().equals_missing(&df));
    }

    #[test]
    fn test_indicator_clash_with_target_is_refused() {
        let df = df![
            "shape" => ["round", "flat", "round"],
            "color" => ["red", "blue", "red"],
            "color_red" => [1i64, 0, 1],
        ]
        .unwrap();
        let mut data = DatasetHandle::new(df.clone(), "t.csv", LoadFormat::Csv);
        let selection = FeatureSet::new(["shape", "color"], "color_red").unwrap();
        let mut choices = ScriptedChoices::new(["1"]);

        let err = CategoricalEncoder::resolve(&mut data, &selection, &mut choices).unwrap_err();

        assert!(matches!(err, WizardError::ColumnConflict(_)));
        // The first column is not expanded either
        assert!(data.df().equals_missing(&df));
    }

    #[test]
    fn test_back_option_cancels() {
        let (mut data, selection) = dataset();
        let mut choices = ScriptedChoices::new(["3"]);
        let outcome = CategoricalEncoder::resolve(&mut data, &selection, &mut choices).unwrap();
        assert_eq!(outcome.resolution, Resolution::Cancelled);
        assert!(data.is_categorical("color"));
    }
}
