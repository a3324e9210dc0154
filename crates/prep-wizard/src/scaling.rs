//! Numeric rescaling of feature columns.
//!
//! Columns are scaled independently. Degenerate columns (constant values)
//! map to 0 instead of dividing by zero. Nulls stay null.

use polars::prelude::*;
use tracing::{debug, info};

use crate::dataset::DatasetHandle;
use crate::error::{Result, WizardError};
use crate::prompt::{ChoiceProvider, Prompt, ask_option};
use crate::types::{FeatureSet, Resolution};
use crate::utils::{mean, numeric_values, population_std};

/// Rescaling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingStrategy {
    /// Map [min, max] onto [0, 1].
    MinMax,
    /// Subtract the mean and divide by the population standard deviation.
    ZScore,
}

impl ScalingStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MinMax => "min-max",
            Self::ZScore => "z-score",
        }
    }
}

/// Min-max scale a vector of optional values.
pub fn min_max_scale(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let present = values.iter().flatten();
    let min = present.clone().copied().fold(f64::INFINITY, f64::min);
    let max = present.copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    values
        .iter()
        .map(|v| {
            v.map(|x| {
                if range > 0.0 && range.is_finite() {
                    (x - min) / range
                } else {
                    0.0
                }
            })
        })
        .collect()
}

/// Standardize a vector of optional values.
pub fn z_score_scale(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let (Some(mean), Some(std)) = (mean(&present), population_std(&present)) else {
        return values.to_vec();
    };
    values
        .iter()
        .map(|v| v.map(|x| if std > 0.0 { (x - mean) / std } else { 0.0 }))
        .collect()
}

/// Rescales the numeric features of the selection.
pub struct NumericNormalizer;

impl NumericNormalizer {
    const MENU: &'static str = "normalization";

    /// Interactive entry point.
    pub fn resolve(
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

        let prompt = Prompt::menu("Normalization and scaling")
            .line(format!("Numeric features: {}", numeric.join(", ")))
            .option("Min-max scaling to [0, 1]")
            .option("Z-score standardization")
            .option("Back");

        let strategy = match ask_option(choices, Self::MENU, &prompt)? {
            1 => ScalingStrategy::MinMax,
            2 => ScalingStrategy::ZScore,
            _ => return Ok(Resolution::Cancelled),
        };

        Self::apply(data, &numeric, strategy)
    }

    /// Scale the given numeric columns in place. Results are Float64.
    pub fn apply(
        data: &mut DatasetHandle,
        columns: &[String],
        strategy: ScalingStrategy,
    ) -> Result<Resolution> {
        let df = data.df_mut();
        for column in columns {
            let series = df
                .column(column)
                .map_err(|_| WizardError::ColumnNotFound(column.clone()))?
                .as_materialized_series()
                .clone();
            let values = numeric_values(&series)?;
            let scaled = match strategy {
                ScalingStrategy::MinMax => min_max_scale(&values),
                ScalingStrategy::ZScore => z_score_scale(&values),
            };
            df.replace(column, Series::new(column.as_str().into(), scaled))?;
            debug!(column = %column, strategy = strategy.name(), "Scaled column");
        }

        info!(strategy = strategy.name(), columns = columns.len(), "Normalized numeric features");
        Ok(Resolution::Applied(format!(
            "Applied {} scaling to: {}",
            strategy.name(),
            columns.join(", ")
        )))
    }
}
