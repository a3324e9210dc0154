//! Terminal choice provider.

use std::io::{self, BufRead, Write};

use super::{ChoiceProvider, Prompt};
use crate::error::{Result, WizardError};
use crate::visualize::Visualization;

/// Reads answers from stdin and writes prompts, messages and text renderings
/// of visualizations to stdout.
#[derive(Debug, Default)]
pub struct ConsoleChoices;

impl ConsoleChoices {
    pub fn new() -> Self {
        Self
    }
}

impl ChoiceProvider for ConsoleChoices {
    fn prompt(&mut self, prompt: &Prompt) -> Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "\n{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(WizardError::InputExhausted);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn notify(&mut self, message: &str) {
        println!("{}", message);
    }

    fn render(&mut self, view: &Visualization) -> Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", view)?;
        stdout.flush()?;
        Ok(())
    }
}
