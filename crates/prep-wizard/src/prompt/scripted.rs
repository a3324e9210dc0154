//! Queue-backed choice provider.

use std::collections::VecDeque;
use std::path::Path;
use tracing::debug;

use super::{ChoiceProvider, Prompt};
use crate::error::{Result, WizardError};
use crate::visualize::Visualization;

/// Answers prompts from a fixed queue and records everything shown.
///
/// Used by tests and by non-interactive runs. When `echo` is on, prompts,
/// answers and messages are also printed to stdout.
#[derive(Debug, Default)]
pub struct ScriptedChoices {
    answers: VecDeque<String>,
    prompts: Vec<Prompt>,
    messages: Vec<String>,
    renders: Vec<Visualization>,
    echo: bool,
}

impl ScriptedChoices {
    pub fn new(answers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Read answers from a file, one per line.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::new(content.lines()))
    }

    /// Print the conversation to stdout as it happens.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn renders(&self) -> &[Visualization] {
        &self.renders
    }
}

impl ChoiceProvider for ScriptedChoices {
    fn prompt(&mut self, prompt: &Prompt) -> Result<String> {
        self.prompts.push(prompt.clone());
        let answer = self.answers.pop_front().ok_or(WizardError::InputExhausted)?;
        debug!(question = %prompt.question, answer = %answer, "Scripted answer");
        if self.echo {
            println!("{}{}", prompt, answer);
        }
        Ok(answer)
    }

    fn notify(&mut self, message: &str) {
        if self.echo {
            println!("{}", message);
        }
        self.messages.push(message.to_string());
    }

    fn render(&mut self, view: &Visualization) -> Result<()> {
        if self.echo {
            println!("{}", view);
        }
        self.renders.push(view.clone());
        Ok(())
    }
}
