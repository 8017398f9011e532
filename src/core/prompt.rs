// src/core/prompt.rs

use dialoguer::{Confirm, theme::ColorfulTheme};
#[cfg(test)]
use std::{cell::RefCell, collections::VecDeque};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("User Interface Error: {0}")]
    Dialoguer(#[from] dialoguer::Error),
    #[error("A confirmation was requested in non-interactive mode: {0}")]
    NotInteractive(String),
}

/// The single "ask, then branch" capability used by every optional action.
///
/// The pipeline only depends on this trait, so a terminal session, a CI run
/// and a unit test all drive exactly the same code.
pub trait Confirmer {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, PromptError>;
}

/// Asks on the terminal with dialoguer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, PromptError> {
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}

/// Never asks. Any attempt to confirm declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl Confirmer for NonInteractive {
    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool, PromptError> {
        log::debug!("Declining prompt in non-interactive mode: {}", prompt);
        Ok(false)
    }
}

/// Answers from a fixed script and records every prompt it was shown.
/// Running out of answers falls back to each prompt's default.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedConfirmer {
    answers: RefCell<VecDeque<bool>>,
    asked: RefCell<Vec<String>>,
}

#[cfg(test)]
impl ScriptedConfirmer {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// The prompts shown so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

#[cfg(test)]
impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool, PromptError> {
        self.asked.borrow_mut().push(prompt.to_string());
        Ok(self.answers.borrow_mut().pop_front().unwrap_or(default))
    }
}
