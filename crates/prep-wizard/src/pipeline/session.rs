//! The interactive main loop.

use tracing::{info, warn};

use super::gate::StageGate;
use super::stage::{Command, Stage};
use crate::error::{Result, WizardError};
use crate::prompt::ChoiceProvider;

/// Show the main menu and run commands until the session is closed or the
/// input runs out. Every other error is shown and the menu comes back.
///
/// Returns the final stage.
pub fn run_session(gate: &mut StageGate, choices: &mut dyn ChoiceProvider) -> Result<Stage> {
    while !gate.stage().is_terminal() {
        let answer = match choices.prompt(&gate.menu_prompt()) {
            Ok(answer) => answer,
            Err(e) if e.is_input_exhausted() => {
                info!("Input exhausted, ending session");
                break;
            }
            Err(e) => return Err(e),
        };

        let command = match answer.parse::<Command>() {
            Ok(command) => command,
            Err(_) => {
                choices.notify(&WizardError::invalid_option("main", answer.trim()).to_string());
                continue;
            }
        };

        match gate.advance(command, choices) {
            Ok(report) => {
                if let Some(message) = report.message() {
                    choices.notify(&message);
                }
            }
            Err(e) if e.is_input_exhausted() => {
                info!("Input exhausted, ending session");
                break;
            }
            Err(e) => {
                if !e.is_recoverable() {
                    warn!(code = e.error_code(), "Command failed: {}", e);
                }
                choices.notify(&e.to_string());
            }
        }
    }
    Ok(gate.stage())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedChoices;

    #[test]
    fn test_unknown_command_is_reported() {
        let mut gate = StageGate::default();
        let mut choices = ScriptedChoices::new(["9", "export", "5", "1"]);
        let stage = run_session(&mut gate, &mut choices).unwrap();

        assert_eq!(stage, Stage::Closed);
        let messages = choices.messages();
        assert!(messages[0].contains("Invalid option '9'"));
        assert!(messages[1].contains("Cannot run 'export'"));
    }

    #[test]
    fn test_session_ends_when_input_runs_out() {
        let mut gate = StageGate::default();
        let mut choices = ScriptedChoices::new(["1"]);
        let stage = run_session(&mut gate, &mut choices).unwrap();
        assert_eq!(stage, Stage::NotLoaded);
    }
}
