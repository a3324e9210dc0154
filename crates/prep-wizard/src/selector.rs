//! Column selection: partition the dataset columns into features and a target.
//!
//! Features are entered as comma-separated 1-based indices; the target is a
//! single index outside the features. Invalid feature input restarts the
//! whole selection, invalid target input only re-asks for the target.

use tracing::{debug, info};

use crate::error::{Result, WizardError};
use crate::prompt::{ChoiceProvider, Prompt};
use crate::types::FeatureSet;

/// Parse a comma-separated list of 1-based column indices.
///
/// Blank entries are ignored and duplicates collapse in first-mention order.
/// Returns 0-based indices.
pub fn parse_feature_indices(input: &str, column_count: usize) -> Result<Vec<usize>> {
    let mut indices = Vec::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let index = parse_index(token, column_count)?;
        if !indices.contains(&index) {
            indices.push(index);
        }
    }
    if indices.is_empty() {
        return Err(WizardError::InvalidSelection(
            "no feature columns were given".to_string(),
        ));
    }
    Ok(indices)
}

/// Parse a single 1-based column index. Returns a 0-based index.
pub fn parse_index(token: &str, column_count: usize) -> Result<usize> {
    let token = token.trim();
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return Err(WizardError::InvalidSelection(format!(
            "'{}' is not a column number",
            token
        )));
    }
    match token.parse::<usize>() {
        Ok(n) if (1..=column_count).contains(&n) => Ok(n - 1),
        _ => Err(WizardError::InvalidSelection(format!(
            "column {} is out of range 1-{}",
            token, column_count
        ))),
    }
}

/// Ask the operator for features and a target among `columns`.
///
/// Re-prompts on every recoverable error; only errors from the choice
/// provider itself (such as exhausted input) are returned.
pub fn select_columns(columns: &[String], choices: &mut dyn ChoiceProvider) -> Result<FeatureSet> {
    if columns.len() < 2 {
        return Err(WizardError::InvalidSelection(format!(
            "at least two columns are needed to pick features and a target, found {}",
            columns.len()
        )));
    }

    let listing: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {}", i + 1, name))
        .collect();

    loop {
        let feature_prompt = Prompt::question("Feature columns (comma-separated numbers)")
            .lines(listing.iter().cloned());
        let answer = choices.prompt(&feature_prompt)?;
        let feature_indices = match parse_feature_indices(&answer, columns.len()) {
            Ok(indices) => indices,
            Err(e) => {
                debug!(answer = %answer, "Rejected feature selection");
                choices.notify(&e.to_string());
                continue;
            }
        };

        if feature_indices.len() == columns.len() {
            choices.notify("Every column was picked as a feature; leave one for the target");
            continue;
        }

        let features: Vec<String> = feature_indices.iter().map(|&i| columns[i].clone()).collect();
        choices.notify(&format!("Features: {}", features.join(", ")));

        let target = ask_target(columns, &feature_indices, choices)?;
        let selection = FeatureSet::new(features, target)?;
        info!(selection = %selection, "Columns selected");
        return Ok(selection);
    }
}

fn ask_target(
    columns: &[String],
    feature_indices: &[usize],
    choices: &mut dyn ChoiceProvider,
) -> Result<String> {
    let target_prompt = Prompt::question("Target column (one number)");
    loop {
        let answer = choices.prompt(&target_prompt)?;
        let result = parse_index(&answer, columns.len()).and_then(|index| {
            if feature_indices.contains(&index) {
                Err(WizardError::FeatureTargetOverlap(columns[index].clone()))
            } else {
                Ok(columns[index].clone())
            }
        });
        match result {
            Ok(target) => return Ok(target),
            Err(e) => choices.notify(&e.to_string()),
        }
    }
}
