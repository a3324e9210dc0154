//! Configuration for the preparation wizard.
//!
//! The wizard is driven by operator choices, so configuration only covers
//! the knobs that sit underneath those choices: outlier band width, preview
//! size, schema inference, histogram resolution, and where exports go.
//!
//! Use [`WizardConfig::builder()`] for a validated configuration, or load
//! one from a JSON file with [`WizardConfig::from_json_file`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, WizardError};

/// Configuration for one wizard session.
///
/// # Example
///
/// ```rust,ignore
/// use prep_wizard::WizardConfig;
///
/// let config = WizardConfig::builder()
///     .iqr_multiplier(3.0)
///     .output_dir("exports")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Width of the outlier band in interquartile ranges.
    /// Values outside [Q1 - k*IQR, Q3 + k*IQR] are outliers.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Number of rows shown after a dataset is loaded.
    /// Default: 5
    pub preview_rows: usize,

    /// Number of rows used to infer the schema of a CSV file.
    /// Default: 100
    pub infer_schema_length: usize,

    /// Number of equal-width bins in histograms.
    /// Default: 20
    pub histogram_bins: usize,

    /// Directory for exported files. `None` writes to the working directory.
    /// Default: None
    pub output_dir: Option<PathBuf>,

    /// Restrict mean/median/mode/constant fills to the selected columns.
    /// When false, fills apply to every eligible column of the table.
    /// Default: false
    pub restrict_fill_to_selection: bool,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
            preview_rows: 5,
            infer_schema_length: 100,
            histogram_bins: 20,
            output_dir: None,
            restrict_fill_to_selection: false,
        }
    }
}

impl WizardConfig {
    /// Create a new configuration builder.
    pub fn builder() -> WizardConfigBuilder {
        WizardConfigBuilder::default()
    }

    /// Read and validate a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: WizardConfig = serde_json::from_str(&content)?;
        config.validate().map_err(|e| {
            WizardError::Internal(e.to_string())
                .with_context(format!("Invalid configuration in {}", path.display()))
        })?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if !(self.iqr_multiplier.is_finite() && self.iqr_multiplier > 0.0) {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidHistogramBins(
                self.histogram_bins,
            ));
        }

        if self.infer_schema_length == 0 {
            return Err(ConfigValidationError::InvalidInferSchemaLength);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid IQR multiplier: {0} (must be a positive number)")]
    InvalidIqrMultiplier(f64),

    #[error("Invalid histogram bins: {0} (must be at least 1)")]
    InvalidHistogramBins(usize),

    #[error("Invalid schema inference length (must be at least 1)")]
    InvalidInferSchemaLength,
}

/// Builder for [`WizardConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct WizardConfigBuilder {
    iqr_multiplier: Option<f64>,
    preview_rows: Option<usize>,
    infer_schema_length: Option<usize>,
    histogram_bins: Option<usize>,
    output_dir: Option<PathBuf>,
    restrict_fill_to_selection: Option<bool>,
}

impl WizardConfigBuilder {
    /// Set the outlier band width in interquartile ranges.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the number of preview rows shown after loading.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Set the CSV schema inference window.
    pub fn infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set the directory exports are written to.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Restrict value fills to the selected columns.
    pub fn restrict_fill_to_selection(mut self, restrict: bool) -> Self {
        self.restrict_fill_to_selection = Some(restrict);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `WizardConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<WizardConfig, ConfigValidationError> {
        let defaults = WizardConfig::default();
        let config = WizardConfig {
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            preview_rows: self.preview_rows.unwrap_or(defaults.preview_rows),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            output_dir: self.output_dir,
            restrict_fill_to_selection: self
                .restrict_fill_to_selection
                .unwrap_or(defaults.restrict_fill_to_selection),
        };

        config.validate()?;
        Ok(config)
    }
}
