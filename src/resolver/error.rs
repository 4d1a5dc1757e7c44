//! Error types for variable resolution

use thiserror::Error;

use crate::condition::ConditionError;
use crate::context::ContextError;
use crate::prompt::PromptError;

/// Errors that abort the resolution of a format
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The user aborted an interactive prompt
    #[error("resolution cancelled by user")]
    Cancelled,

    /// A resolved top-level variable has no name to store it under
    #[error("variable '{variable}' has a value but no name")]
    MissingName { variable: String },

    /// A boolean array item did not produce a value
    #[error("boolean variable '{variable}' is not resolved")]
    UnresolvedBooleanItem { variable: String },

    /// An array item declaration that can never terminate the item loop
    #[error("invalid item for array '{variable}': {reason}")]
    InvalidArrayItem { variable: String, reason: String },

    /// The prompt returned a choice outside the enumeration
    #[error("choice {index} out of range for variable '{variable}'")]
    InvalidChoice { variable: String, index: usize },

    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("prompt failed: {0}")]
    Prompt(PromptError),
}

impl ResolveError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolveError::Cancelled)
    }
}

impl From<PromptError> for ResolveError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::Cancelled => ResolveError::Cancelled,
            other => ResolveError::Prompt(other),
        }
    }
}
