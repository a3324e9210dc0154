//! The stage gate: owns the dataset and the pipeline state, validates each
//! command against the transition table, and dispatches it to one component.

use std::path::Path;
use tracing::{debug, info};

use super::outliers::OutlierHandler;
use super::stage::{Command, Stage};
use crate::config::WizardConfig;
use crate::dataset::DatasetHandle;
use crate::encoding::CategoricalEncoder;
use crate::error::{Result, WizardError};
use crate::imputers::MissingValueResolver;
use crate::io::{Exporter, ask_format, load_dataset};
use crate::prompt::{ChoiceProvider, Prompt, ask_option_until_valid};
use crate::scaling::NumericNormalizer;
use crate::selector::select_columns;
use crate::types::{FeatureSet, LoadFormat, Resolution, StepOutcome, StepReport};
use crate::visualize::Visualizer;

/// State of one pipeline run.
#[derive(Debug, Default)]
pub struct StageGate {
    stage: Stage,
    /// Set on entry into missing-value handling, cleared when outlier
    /// handling completes. Column selection is refused while set.
    locked: bool,
    dataset: Option<DatasetHandle>,
    selection: Option<FeatureSet>,
    /// Indicator columns created by encoding, per original column.
    derived: Vec<(String, Vec<String>)>,
    /// Whether an export completed in the current pass.
    exported: bool,
    config: WizardConfig,
}

impl StageGate {
    pub fn new(config: WizardConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn dataset(&self) -> Option<&DatasetHandle> {
        self.dataset.as_ref()
    }

    pub fn selection(&self) -> Option<&FeatureSet> {
        self.selection.as_ref()
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// Columns shown by visualization: the features still in the dataset
    /// plus the indicator columns derived from them.
    pub fn visualization_scope(&self) -> Vec<String> {
        let (Some(data), Some(selection)) = (&self.dataset, &self.selection) else {
            return Vec::new();
        };
        let mut scope: Vec<String> = Vec::new();
        for feature in selection.features() {
            if data.has_column(feature) {
                scope.push(feature.clone());
            } else if let Some((_, names)) = self.derived.iter().find(|(orig, _)| orig == feature)
            {
                scope.extend(names.iter().filter(|n| data.has_column(n)).cloned());
            }
        }
        scope
    }

    /// Run one command.
    ///
    /// Illegal commands fail with `InvalidTransition` (or `LockedSelection`)
    /// and leave both the stage and the dataset untouched.
    pub fn advance(
        &mut self,
        command: Command,
        choices: &mut dyn ChoiceProvider,
    ) -> Result<StepReport> {
        self.check(command)?;

        if command == Command::Close {
            return self.close(choices);
        }
        if command == Command::Load {
            let Some(format) = ask_format(choices)? else {
                return Ok(self.report(command, Resolution::Cancelled));
            };
            let path = choices.prompt(&Prompt::question("File path"))?;
            return self.load_from(Path::new(path.trim()), format, choices);
        }

        self.enter(command);
        let resolution = self.dispatch(command, choices)?;
        if resolution.completes() {
            self.complete(command);
        }
        Ok(self.report(command, resolution))
    }

    /// Load a dataset from a known path and format.
    pub fn load_from(
        &mut self,
        path: &Path,
        format: LoadFormat,
        choices: &mut dyn ChoiceProvider,
    ) -> Result<StepReport> {
        self.check(Command::Load)?;
        let handle = load_dataset(path, format, self.config.infer_schema_length, choices)?;
        choices.notify(&handle.summary(self.config.preview_rows));

        let description = format!(
            "Loaded {} rows and {} columns",
            handle.height(),
            handle.df().width()
        );
        self.dataset = Some(handle);
        self.complete(Command::Load);
        Ok(self.report(Command::Load, Resolution::Applied(description)))
    }

    /// Main menu with a status marker per command: `✓` done, `-` available,
    /// `✗` not reachable yet.
    pub fn menu_prompt(&self) -> Prompt {
        let mut prompt = Prompt::menu("Main menu");
        for command in Command::ALL {
            let is_step = command.menu_key().starts_with("2.");
            if is_step && command == Command::SelectColumns {
                prompt = prompt.line(format!(
                    "{} 2. Preprocessing",
                    self.marker(Command::ResolveOutliers)
                ));
            }
            if is_step && self.stage < Stage::Loaded {
                continue;
            }
            let indent = if is_step { "   " } else { "" };
            let marker = if command == Command::Close {
                " ".to_string()
            } else {
                self.marker(command).to_string()
            };
            prompt = prompt.line(format!(
                "{}{} {}. {}",
                indent,
                marker,
                command.menu_key(),
                command.label()
            ));
        }
        prompt.line(format!("Stage: {}", self.stage))
    }

    fn marker(&self, command: Command) -> char {
        let Some(transition) = command.transition() else {
            return ' ';
        };
        let done = match command {
            Command::Export => self.exported,
            Command::ResolveOutliers => self.stage >= Stage::VisualizationReady,
            _ => self.stage >= transition.completes,
        };
        if done {
            '✓'
        } else if self.check(command).is_ok() {
            '-'
        } else {
            '✗'
        }
    }

    fn check(&self, command: Command) -> Result<()> {
        if self.stage.is_terminal() {
            return Err(self.invalid(command));
        }
        let Some(transition) = command.transition() else {
            return Ok(());
        };
        if !transition.allows(self.stage) {
            return Err(self.invalid(command));
        }
        if command == Command::SelectColumns && self.locked {
            return Err(WizardError::LockedSelection);
        }
        Ok(())
    }

    fn invalid(&self, command: Command) -> WizardError {
        WizardError::InvalidTransition {
            command,
            stage: self.stage,
        }
    }

    /// Record the entry stage of a command, if it has one.
    fn enter(&mut self, command: Command) {
        let Some(entry) = command.transition().and_then(|t| t.entry) else {
            return;
        };
        match command {
            Command::SelectColumns => {
                if self.stage == Stage::Loaded {
                    self.stage = entry;
                }
            }
            _ => self.stage = self.stage.max(entry),
        }
        if command == Command::ResolveNulls {
            self.locked = true;
        }
        debug!(%command, stage = %self.stage, locked = self.locked, "Entered stage");
    }

    fn complete(&mut self, command: Command) {
        let Some(transition) = command.transition() else {
            return;
        };
        match command {
            Command::SelectColumns => {
                // A new selection starts a new pass.
                self.stage = transition.completes;
                self.derived.clear();
                self.exported = false;
            }
            Command::ResolveOutliers => {
                self.stage = self.stage.max(Stage::VisualizationReady);
                self.locked = false;
            }
            Command::Export => self.exported = true,
            // NothingToDo completes too: outlier handling requires
            // NormalizationResolved even when no feature is numeric.
            _ => self.stage = self.stage.max(transition.completes),
        }
        info!(%command, stage = %self.stage, "Stage completed");
    }

    fn dispatch(&mut self, command: Command, choices: &mut dyn ChoiceProvider) -> Result<Resolution> {
        let data = self.dataset.as_mut().ok_or(WizardError::NoDataLoaded)?;

        if command == Command::SelectColumns {
            let selection = select_columns(&data.column_names(), choices)?;
            let description = format!("Selected {}", selection);
            self.selection = Some(selection);
            return Ok(Resolution::Applied(description));
        }

        let selection = self
            .selection
            .as_ref()
            .ok_or_else(|| WizardError::Internal("no column selection".to_string()))?;

        match command {
            Command::ResolveNulls => {
                MissingValueResolver::new(self.config.restrict_fill_to_selection)
                    .resolve(data, selection, choices)
            }
            Command::EncodeCategorical => {
                let outcome = CategoricalEncoder::resolve(data, selection, choices)?;
                self.derived.extend(outcome.derived);
                Ok(outcome.resolution)
            }
            Command::Normalize => NumericNormalizer::resolve(data, selection, choices),
            Command::ResolveOutliers => {
                OutlierHandler::new(self.config.iqr_multiplier).resolve(data, selection, choices)
            }
            Command::Visualize => {
                let scope = self.visualization_scope();
                let data = self.dataset.as_ref().ok_or(WizardError::NoDataLoaded)?;
                Visualizer::new(self.config.histogram_bins).resolve(data, &scope, choices)
            }
            Command::Export => {
                Exporter::new(self.config.output_dir.clone()).resolve(data, choices)
            }
            Command::Load | Command::SelectColumns | Command::Close => {
                Err(WizardError::Internal(format!("{} is not dispatched", command)))
            }
        }
    }

    fn close(&mut self, choices: &mut dyn ChoiceProvider) -> Result<StepReport> {
        let prompt = Prompt::menu("Are you sure you want to exit?")
            .option("Yes")
            .option("No");
        if ask_option_until_valid(choices, "close", &prompt)? == 1 {
            self.stage = Stage::Closed;
            info!("Session closed");
            Ok(StepReport {
                command: Command::Close,
                stage: self.stage,
                outcome: StepOutcome::Closed,
            })
        } else {
            Ok(self.report(Command::Close, Resolution::Cancelled))
        }
    }

    fn report(&self, command: Command, resolution: Resolution) -> StepReport {
        if resolution == Resolution::Cancelled {
            debug!(%command, stage = %self.stage, "Stage left without completing");
        }
        StepReport {
            command,
            stage: self.stage,
            outcome: resolution.into(),
        }
    }
}
