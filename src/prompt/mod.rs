//! Interactive prompting
//!
//! The resolver never talks to a terminal directly. It asks a [`Prompter`] for
//! each value it cannot take from the configuration, which keeps resolution
//! testable with a scripted collaborator.
//!
//! Every operation may fail with [`PromptError::Cancelled`], which callers treat
//! as a clean end of the run rather than a failure.

mod scripted;
mod terminal;

pub use scripted::{Answer, ScriptedPrompter};
pub use terminal::TerminalPrompter;

use thiserror::Error;

/// Errors returned by a prompt collaborator
#[derive(Debug, Error)]
pub enum PromptError {
    /// The user aborted input
    #[error("prompt cancelled by user")]
    Cancelled,

    /// Every choice of a single-choice question is disabled
    #[error("no selectable choices for '{0}'")]
    NoSelectableChoices(String),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// A scripted prompter received a request it has no answer for
    #[error("scripted prompt mismatch: {0}")]
    Script(String),
}

/// Free-text question
#[derive(Debug, Clone, PartialEq)]
pub struct TextPrompt {
    pub message: String,
    /// Value used when the answer is left empty, shown to the user
    pub default: Option<String>,
}

/// Yes/no question
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmPrompt {
    pub message: String,
    pub initial: bool,
}

/// Free-text question whose answer is split into elements
#[derive(Debug, Clone, PartialEq)]
pub struct ListPrompt {
    pub message: String,
    pub separator: String,
}

/// One entry offered by a choice prompt
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub label: String,
    pub disabled: bool,
    pub selected: bool,
}

/// Single-choice question
#[derive(Debug, Clone, PartialEq)]
pub struct SelectPrompt {
    pub message: String,
    pub choices: Vec<Choice>,
    /// Index highlighted initially
    pub initial: Option<usize>,
}

/// Multi-choice question
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSelectPrompt {
    pub message: String,
    pub choices: Vec<Choice>,
}

/// Source of interactively supplied values
pub trait Prompter {
    /// Ask for free text. `None` means the answer was left empty.
    fn text(&mut self, prompt: &TextPrompt) -> Result<Option<String>, PromptError>;

    fn confirm(&mut self, prompt: &ConfirmPrompt) -> Result<bool, PromptError>;

    /// Ask for a delimited list, returned already split
    fn list(&mut self, prompt: &ListPrompt) -> Result<Vec<String>, PromptError>;

    /// Returns the index of the chosen entry
    fn select(&mut self, prompt: &SelectPrompt) -> Result<usize, PromptError>;

    /// Returns the indices of the chosen entries in enumeration order
    fn multiselect(&mut self, prompt: &MultiSelectPrompt) -> Result<Vec<usize>, PromptError>;

    /// Show a heading before a group of related questions
    fn announce(&mut self, _message: &str) -> Result<(), PromptError> {
        Ok(())
    }
}

/// Default list separator
pub const DEFAULT_SEPARATOR: &str = ",";

/// Split list input on `separator`, trimming elements and dropping empty ones
pub fn split_list(input: &str, separator: &str) -> Vec<String> {
    let separator = if separator.is_empty() {
        DEFAULT_SEPARATOR
    } else {
        separator
    };
    input
        .split(separator)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
