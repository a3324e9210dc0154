//! Pipeline stages, operator commands, and the transition table between them.
//!
//! Stages form a closed, totally ordered enumeration. Forward progress is the
//! only direction the gate moves in, with one exception: a new column
//! selection after the preprocessing lock cleared starts a fresh pass from
//! [`Stage::ColumnsSelected`].
//!
//! The table in [`TRANSITIONS`] is the single source of truth for which
//! command is legal at which stage:
//!
//! ```text
//! command             requires               entry                 completes
//! ─────────────────   ────────────────────   ───────────────────   ─────────────────────
//! load                NotLoaded (only)       -                     Loaded
//! select-columns      Loaded                 ColumnsPending        ColumnsSelected
//! resolve-nulls       ColumnsSelected        NullsPending          NullsResolved
//! encode-categorical  NullsResolved          CategoricalPending    CategoricalResolved
//! normalize           CategoricalResolved    NormalizationPending  NormalizationResolved
//! resolve-outliers    NormalizationResolved  OutliersPending       OutliersResolved
//! visualize           VisualizationReady     -                     ExportReady
//! export              ExportReady            -                     ExportReady
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discrete progress marker of one pipeline run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Nothing loaded yet
    #[default]
    NotLoaded,
    /// A dataset is in memory
    Loaded,
    /// Column selection has been entered
    ColumnsPending,
    /// Features and target are chosen
    ColumnsSelected,
    /// Missing-value handling has been entered
    NullsPending,
    NullsResolved,
    CategoricalPending,
    CategoricalResolved,
    NormalizationPending,
    NormalizationResolved,
    OutliersPending,
    OutliersResolved,
    /// Preprocessing is complete; the data can be examined
    VisualizationReady,
    /// The data has been examined at least once
    ExportReady,
    /// Session ended by a confirmed close
    Closed,
}

impl Stage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NotLoaded => "Not Loaded",
            Self::Loaded => "Loaded",
            Self::ColumnsPending => "Columns Pending",
            Self::ColumnsSelected => "Columns Selected",
            Self::NullsPending => "Nulls Pending",
            Self::NullsResolved => "Nulls Resolved",
            Self::CategoricalPending => "Categorical Pending",
            Self::CategoricalResolved => "Categorical Resolved",
            Self::NormalizationPending => "Normalization Pending",
            Self::NormalizationResolved => "Normalization Resolved",
            Self::OutliersPending => "Outliers Pending",
            Self::OutliersResolved => "Outliers Resolved",
            Self::VisualizationReady => "Visualization Ready",
            Self::ExportReady => "Export Ready",
            Self::Closed => "Closed",
        }
    }

    /// True once the session has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// External command vocabulary accepted by the stage gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    Load,
    SelectColumns,
    ResolveNulls,
    EncodeCategorical,
    Normalize,
    ResolveOutliers,
    Visualize,
    Export,
    Close,
}

impl Command {
    /// All commands in menu order.
    pub const ALL: [Command; 9] = [
        Command::Load,
        Command::SelectColumns,
        Command::ResolveNulls,
        Command::EncodeCategorical,
        Command::Normalize,
        Command::ResolveOutliers,
        Command::Visualize,
        Command::Export,
        Command::Close,
    ];

    /// Command name as typed by the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::SelectColumns => "select-columns",
            Self::ResolveNulls => "resolve-nulls",
            Self::EncodeCategorical => "encode-categorical",
            Self::Normalize => "normalize",
            Self::ResolveOutliers => "resolve-outliers",
            Self::Visualize => "visualize",
            Self::Export => "export",
            Self::Close => "close",
        }
    }

    /// Menu label shown next to the command.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Load => "Load data",
            Self::SelectColumns => "Column selection",
            Self::ResolveNulls => "Missing value handling",
            Self::EncodeCategorical => "Categorical encoding",
            Self::Normalize => "Normalization and scaling",
            Self::ResolveOutliers => "Outlier detection and handling",
            Self::Visualize => "Data visualization",
            Self::Export => "Export data",
            Self::Close => "Exit",
        }
    }

    /// Menu number of the command (the sub-steps of preprocessing are 2.x).
    pub fn menu_key(&self) -> &'static str {
        match self {
            Self::Load => "1",
            Self::SelectColumns => "2.1",
            Self::ResolveNulls => "2.2",
            Self::EncodeCategorical => "2.3",
            Self::Normalize => "2.4",
            Self::ResolveOutliers => "2.5",
            Self::Visualize => "3",
            Self::Export => "4",
            Self::Close => "5",
        }
    }

    /// Transition row for this command. `Close` has none: it is legal anywhere.
    pub fn transition(&self) -> Option<&'static Transition> {
        TRANSITIONS.iter().find(|t| t.command == *self)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = String;

    /// Accepts the command name or its menu number. `2` is an alias for
    /// column selection, the entry point of preprocessing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_ascii_lowercase();
        if input == "2" {
            return Ok(Self::SelectColumns);
        }
        Self::ALL
            .iter()
            .find(|c| c.as_str() == input || c.menu_key() == input)
            .copied()
            .ok_or_else(|| format!("unknown command '{}'", s.trim()))
    }
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub command: Command,
    /// Lowest stage at which the command is legal.
    pub requires: Stage,
    /// The command is illegal at this stage and beyond.
    pub before: Stage,
    /// Stage recorded as soon as the command is entered, if any.
    pub entry: Option<Stage>,
    /// Stage reached when the command completes.
    pub completes: Stage,
}

impl Transition {
    /// Whether the command may run at `stage`.
    pub fn allows(&self, stage: Stage) -> bool {
        stage >= self.requires && stage < self.before
    }
}

/// The transition table of the stage gate.
pub const TRANSITIONS: [Transition; 8] = [
    Transition {
        command: Command::Load,
        requires: Stage::NotLoaded,
        before: Stage::Loaded,
        entry: None,
        completes: Stage::Loaded,
    },
    Transition {
        command: Command::SelectColumns,
        requires: Stage::Loaded,
        before: Stage::Closed,
        entry: Some(Stage::ColumnsPending),
        completes: Stage::ColumnsSelected,
    },
    Transition {
        command: Command::ResolveNulls,
        requires: Stage::ColumnsSelected,
        before: Stage::Closed,
        entry: Some(Stage::NullsPending),
        completes: Stage::NullsResolved,
    },
    Transition {
        command: Command::EncodeCategorical,
        requires: Stage::NullsResolved,
        before: Stage::Closed,
        entry: Some(Stage::CategoricalPending),
        completes: Stage::CategoricalResolved,
    },
    Transition {
        command: Command::Normalize,
        requires: Stage::CategoricalResolved,
        before: Stage::Closed,
        entry: Some(Stage::NormalizationPending),
        completes: Stage::NormalizationResolved,
    },
    Transition {
        command: Command::ResolveOutliers,
        requires: Stage::NormalizationResolved,
        before: Stage::Closed,
        entry: Some(Stage::OutliersPending),
        completes: Stage::OutliersResolved,
    },
    Transition {
        command: Command::Visualize,
        requires: Stage::VisualizationReady,
        before: Stage::Closed,
        entry: None,
        completes: Stage::ExportReady,
    },
    Transition {
        command: Command::Export,
        requires: Stage::ExportReady,
        before: Stage::Closed,
        entry: None,
        completes: Stage::ExportReady,
    },
];
