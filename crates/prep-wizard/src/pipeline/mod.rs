//! Pipeline module.
//!
//! The staged state machine (stages, commands and the transition table),
//! the gate that enforces it, the outlier component, and the session loop.

mod gate;
pub mod outliers;
mod session;
pub mod stage;

pub use gate::StageGate;
pub use outliers::{OutlierBand, OutlierHandler, OutlierStrategy};
pub use session::run_session;
pub use stage::{Command, Stage, TRANSITIONS, Transition};
