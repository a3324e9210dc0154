//! Core data types shared across the wizard.
//!
//! This module defines the column partition chosen by the operator, the file
//! formats the wizard reads and writes, and the reports each stage returns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{Result, WizardError};
use crate::pipeline::stage::{Command, Stage};

// ============================================================================
// Column Selection
// ============================================================================

/// Ordered feature columns plus exactly one target column.
///
/// The target is never one of the features. Construct through
/// [`FeatureSet::new`], which enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    features: Vec<String>,
    target: String,
}

impl FeatureSet {
    /// Build a feature set, collapsing duplicate features in first-mention
    /// order.
    ///
    /// Fails with `InvalidSelection` when no feature is given and with
    /// `FeatureTargetOverlap` when the target is one of the features.
    pub fn new(
        features: impl IntoIterator<Item = impl Into<String>>,
        target: impl Into<String>,
    ) -> Result<Self> {
        let mut unique: Vec<String> = Vec::new();
        for feature in features {
            let feature = feature.into();
            if !unique.contains(&feature) {
                unique.push(feature);
            }
        }
        if unique.is_empty() {
            return Err(WizardError::InvalidSelection(
                "at least one feature column is required".to_string(),
            ));
        }

        let target = target.into();
        if unique.contains(&target) {
            return Err(WizardError::FeatureTargetOverlap(target));
        }

        Ok(Self {
            features: unique,
            target,
        })
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Features followed by the target.
    pub fn selected_columns(&self) -> Vec<String> {
        let mut columns = self.features.clone();
        columns.push(self.target.clone());
        columns
    }

    pub fn is_feature(&self, column: &str) -> bool {
        self.features.iter().any(|f| f == column)
    }

    pub fn is_selected(&self, column: &str) -> bool {
        self.is_feature(column) || self.target == column
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "features [{}], target '{}'",
            self.features.join(", "),
            self.target
        )
    }
}

// ============================================================================
// File Formats
// ============================================================================

/// Declared format of a dataset to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadFormat {
    Csv,
    Excel,
    Sqlite,
}

impl LoadFormat {
    pub const ALL: [LoadFormat; 3] = [LoadFormat::Csv, LoadFormat::Excel, LoadFormat::Sqlite];

    /// File extensions accepted for this format, lowercase and without dot.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Csv => &["csv"],
            Self::Excel => &["xlsx", "xls"],
            Self::Sqlite => &["sqlite", "db"],
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Excel => "Excel",
            Self::Sqlite => "SQLite",
        }
    }

    /// Whether the path's extension matches this format, ignoring case.
    pub fn matches_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions().contains(&ext.as_str())
            })
            .unwrap_or(false)
    }
}

impl fmt::Display for LoadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Format of an exported dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Excel,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xlsx",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Excel => "Excel",
        }
    }
}

// ============================================================================
// Stage Results
// ============================================================================

/// What a component did with the dataset when invoked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Resolution {
    /// The data was transformed (or deliberately left as is) by an operator choice.
    Applied(String),
    /// The stage had nothing to work on; the data is untouched.
    NothingToDo(String),
    /// The operator chose "back"; the data is untouched.
    Cancelled,
}

impl Resolution {
    /// Whether the stage counts as complete.
    pub fn completes(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Outcome of one gate step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StepOutcome {
    Completed(String),
    NothingToDo(String),
    Cancelled,
    Closed,
}

impl From<Resolution> for StepOutcome {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Applied(description) => Self::Completed(description),
            Resolution::NothingToDo(reason) => Self::NothingToDo(reason),
            Resolution::Cancelled => Self::Cancelled,
        }
    }
}

/// Report returned by the stage gate for every accepted command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub command: Command,
    /// Stage after the step.
    pub stage: Stage,
    pub outcome: StepOutcome,
}

impl StepReport {
    /// Message shown to the operator for this step, if any.
    pub fn message(&self) -> Option<String> {
        match &self.outcome {
            StepOutcome::Completed(description) => Some(description.clone()),
            StepOutcome::NothingToDo(reason) => Some(format!("Nothing to do: {}", reason)),
            StepOutcome::Cancelled => Some("Returning to main menu".to_string()),
            StepOutcome::Closed => None,
        }
    }
}
