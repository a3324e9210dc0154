//! Interactive Data Preparation Wizard
//!
//! A step-gated data preparation library built with Rust and Polars.
//!
//! # Overview
//!
//! The wizard walks an operator through a fixed sequence of stages:
//!
//! - **Load**: CSV, Excel (`.xlsx`/`.xls`) or SQLite (`.db`/`.sqlite`)
//! - **Column Selection**: ordered features plus one disjoint target
//! - **Missing Values**: drop rows, or fill with mean, median, mode or a constant
//! - **Categorical Encoding**: indicator columns or integer codes
//! - **Normalization**: min-max or z-score scaling
//! - **Outliers**: IQR detection; drop, replace with median, or keep
//! - **Visualization**: summaries, histograms, scatter comparisons, correlations
//! - **Export**: CSV or Excel
//!
//! The [`StageGate`] owns the dataset and refuses any command whose
//! prerequisite stage has not been reached. Every question goes through an
//! injected [`ChoiceProvider`], so a session can be scripted end to end.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use prep_wizard::{Command, LoadFormat, ScriptedChoices, StageGate, WizardConfig};
//! use std::path::Path;
//!
//! let mut gate = StageGate::new(WizardConfig::default());
//! let mut choices = ScriptedChoices::new(["1,2", "3", "2", "1", "1", "1", "1"]);
//!
//! gate.load_from(Path::new("data.csv"), LoadFormat::Csv, &mut choices)?;
//! for command in [
//!     Command::SelectColumns,
//!     Command::ResolveNulls,
//!     Command::EncodeCategorical,
//!     Command::Normalize,
//!     Command::ResolveOutliers,
//!     Command::Visualize,
//! ] {
//!     let report = gate.advance(command, &mut choices)?;
//!     println!("{:?} -> {}", report.outcome, report.stage);
//! }
//! ```
//!
//! # Interactive Use
//!
//! ```rust,ignore
//! use prep_wizard::{ConsoleChoices, StageGate, WizardConfig, run_session};
//!
//! let mut gate = StageGate::new(WizardConfig::default());
//! run_session(&mut gate, &mut ConsoleChoices::new())?;
//! ```

pub mod config;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod prompt;
pub mod scaling;
pub mod selector;
pub mod types;
pub mod utils;
pub mod visualize;

// Re-export main types for convenience
pub use config::{ConfigValidationError, WizardConfig, WizardConfigBuilder};
pub use dataset::DatasetHandle;
pub use error::{Result, ResultExt, WizardError};
pub use pipeline::{Command, Stage, StageGate, run_session};
pub use prompt::{ChoiceProvider, ConsoleChoices, Prompt, ScriptedChoices};
pub use types::{
    ExportFormat, FeatureSet, LoadFormat, Resolution, StepOutcome, StepReport,
};
pub use visualize::Visualization;
