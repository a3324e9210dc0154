//! Operator interaction.
//!
//! Every stage asks its questions through a [`ChoiceProvider`] instead of
//! reading stdin directly, so the whole wizard can be driven by a script.
//!
//! - [`ConsoleChoices`] talks to a terminal.
//! - [`ScriptedChoices`] answers from a queue and records what was shown.

mod console;
mod scripted;

pub use console::ConsoleChoices;
pub use scripted::ScriptedChoices;

use std::fmt;

use crate::error::{Result, WizardError};
use crate::visualize::Visualization;

/// Injected prompt capability.
pub trait ChoiceProvider {
    /// Show a prompt and return the operator's raw answer.
    ///
    /// Returns `InputExhausted` when no more input is available.
    fn prompt(&mut self, prompt: &Prompt) -> Result<String>;

    /// Show an informational message.
    fn notify(&mut self, message: &str);

    /// Hand a computed view to the renderer.
    fn render(&mut self, view: &Visualization) -> Result<()>;
}

/// A menu or a free-text question.
///
/// Options are numbered from 1 in the order they were added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prompt {
    pub title: String,
    /// Informational lines shown between the title and the options.
    pub lines: Vec<String>,
    pub options: Vec<String>,
    pub question: String,
}

impl Prompt {
    /// A numbered menu.
    pub fn menu(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            question: "Select an option".to_string(),
            ..Default::default()
        }
    }

    /// A question without options.
    pub fn question(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn lines(mut self, lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.title.is_empty() {
            writeln!(f, "--- {} ---", self.title)?;
        }
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        for (i, option) in self.options.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, option)?;
        }
        write!(f, "{}: ", self.question)
    }
}

/// Ask and parse the answer as a non-negative integer.
///
/// Fails with `InvalidSelection` when the answer is not one.
pub fn ask_number(choices: &mut dyn ChoiceProvider, prompt: &Prompt) -> Result<usize> {
    let answer = choices.prompt(prompt)?;
    let trimmed = answer.trim();
    trimmed
        .parse::<usize>()
        .map_err(|_| WizardError::InvalidSelection(format!("'{}' is not a number", trimmed)))
}

/// Ask a stage menu question and return the chosen 1-based option.
///
/// Anything that is not one of the listed options is `InvalidOption`.
pub fn ask_option(choices: &mut dyn ChoiceProvider, menu: &str, prompt: &Prompt) -> Result<usize> {
    let answer = choices.prompt(prompt)?;
    let trimmed = answer.trim();
    match trimmed.parse::<usize>() {
        Ok(n) if (1..=prompt.options.len()).contains(&n) => Ok(n),
        _ => Err(WizardError::invalid_option(menu, trimmed)),
    }
}

/// Ask until the answer is one of the listed options, telling the operator
/// about each invalid answer.
pub fn ask_option_until_valid(
    choices: &mut dyn ChoiceProvider,
    menu: &str,
    prompt: &Prompt,
) -> Result<usize> {
    loop {
        match ask_option(choices, menu, prompt) {
            Ok(n) => return Ok(n),
            Err(e) if e.is_recoverable() => choices.notify(&e.to_string()),
            Err(e) => return Err(e),
        }
    }
}
