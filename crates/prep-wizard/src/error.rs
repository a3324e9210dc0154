//! Error types for the preparation wizard.
//!
//! Every failure an operator can trigger from the menus maps to one variant
//! of [`WizardError`]. Those variants are recoverable: the session loop shows
//! the message and returns to the main menu. Wrapped library errors (I/O,
//! Polars, file-format readers) are surfaced the same way.
//!
//! Errors serialize as `{ code, message }` so a session transcript can be
//! written out as JSON.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::pipeline::stage::{Command, Stage};

/// The main error type for the wizard.
#[derive(Error, Debug)]
pub enum WizardError {
    /// Path does not exist, or its extension does not match the declared format.
    #[error("Invalid file '{path}': {reason}")]
    InvalidFile { path: String, reason: String },

    /// The relational store has no tables to load.
    #[error("No tables found in database '{0}'")]
    EmptyTableSet(String),

    /// Out-of-range or non-numeric index during a selection.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// The chosen target column is already a selected feature.
    #[error("Column '{0}' is already selected as a feature; pick a target outside the features")]
    FeatureTargetOverlap(String),

    /// A stage command was issued before its prerequisite stage was reached.
    #[error("Cannot run '{command}' while the pipeline is at stage '{}'", .stage.display_name())]
    InvalidTransition { command: Command, stage: Stage },

    /// Column selection was requested after value-mutating stages started.
    #[error("Columns cannot be changed once preprocessing has started")]
    LockedSelection,

    /// Unrecognized numeric choice within a stage's own menu.
    #[error("Invalid option '{option}' in the {menu} menu")]
    InvalidOption { menu: String, option: String },

    /// The choice provider has no more input to give.
    #[error("No more input available")]
    InputExhausted,

    /// A stage needed a dataset but none is loaded.
    #[error("No data loaded")]
    NoDataLoaded,

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A derived column would take the name of a column already present.
    #[error("Column '{0}' already exists and would be overwritten by encoding")]
    ColumnConflict(String),

    /// Internal invariant failure.
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite error wrapper.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Spreadsheet read error wrapper.
    #[error("Spreadsheet read error: {0}")]
    SpreadsheetRead(#[from] calamine::Error),

    /// Spreadsheet write error wrapper.
    #[error("Spreadsheet write error: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<WizardError>,
    },
}

impl WizardError {
    /// Shorthand for an [`WizardError::InvalidFile`].
    pub fn invalid_file(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`WizardError::InvalidOption`].
    pub fn invalid_option(menu: impl Into<String>, option: impl ToString) -> Self {
        Self::InvalidOption {
            menu: menu.into(),
            option: option.to_string(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        WizardError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, independent of the message text.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidFile { .. } => "INVALID_FILE",
            Self::EmptyTableSet(_) => "EMPTY_TABLE_SET",
            Self::InvalidSelection(_) => "INVALID_SELECTION",
            Self::FeatureTargetOverlap(_) => "FEATURE_TARGET_OVERLAP",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::LockedSelection => "LOCKED_SELECTION",
            Self::InvalidOption { .. } => "INVALID_OPTION",
            Self::InputExhausted => "INPUT_EXHAUSTED",
            Self::NoDataLoaded => "NO_DATA_LOADED",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::ColumnConflict(_) => "COLUMN_CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Sqlite(_) => "SQLITE_ERROR",
            Self::SpreadsheetRead(_) => "SPREADSHEET_READ_ERROR",
            Self::SpreadsheetWrite(_) => "SPREADSHEET_WRITE_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if the input stream ran dry.
    pub fn is_input_exhausted(&self) -> bool {
        match self {
            Self::InputExhausted => true,
            Self::WithContext { source, .. } => source.is_input_exhausted(),
            _ => false,
        }
    }

    /// Check if this error is one of the operator-facing kinds that are
    /// handled by re-prompting or returning to the menu.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidFile { .. }
            | Self::EmptyTableSet(_)
            | Self::InvalidSelection(_)
            | Self::FeatureTargetOverlap(_)
            | Self::InvalidTransition { .. }
            | Self::LockedSelection
            | Self::InvalidOption { .. }
            | Self::ColumnConflict(_)
            | Self::NoDataLoaded => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

impl Serialize for WizardError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("WizardError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for wizard operations.
pub type Result<T> = std::result::Result<T, WizardError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| WizardError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(WizardError::LockedSelection.error_code(), "LOCKED_SELECTION");
        assert_eq!(
            WizardError::EmptyTableSet("data.db".to_string()).error_code(),
            "EMPTY_TABLE_SET"
        );
        assert_eq!(
            WizardError::InvalidTransition {
                command: Command::Export,
                stage: Stage::OutliersPending,
            }
            .error_code(),
            "INVALID_TRANSITION"
        );
    }

    #[test]
    fn test_is_recoverable() {
        assert!(WizardError::LockedSelection.is_recoverable());
        assert!(WizardError::invalid_option("outliers", 9).is_recoverable());
        assert!(WizardError::FeatureTargetOverlap("age".to_string()).is_recoverable());
        assert!(WizardError::ColumnConflict("color_red".to_string()).is_recoverable());
        assert!(!WizardError::InputExhausted.is_recoverable());
        assert!(!WizardError::Internal("boom".to_string()).is_recoverable());
    }

    #[test]
    fn test_input_exhausted_through_context() {
        let error = WizardError::InputExhausted.with_context("Selecting columns");
        assert!(error.is_input_exhausted());
        assert!(!WizardError::LockedSelection.is_input_exhausted());
    }

    #[test]
    fn test_transition_message_names_stage() {
        let error = WizardError::InvalidTransition {
            command: Command::Export,
            stage: Stage::VisualizationReady,
        };
        let message = error.to_string();
        assert!(message.contains("export"));
        assert!(message.contains("Visualization Ready"));
    }

    #[test]
    fn test_error_serialization() {
        let error = WizardError::invalid_file("data.txt", "extension does not match CSV");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("INVALID_FILE"));
        assert!(json.contains("data.txt"));
    }

    #[test]
    fn test_with_context() {
        let error = WizardError::ColumnNotFound("age".to_string()).with_context("During export");
        assert!(error.to_string().contains("During export"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }
}
