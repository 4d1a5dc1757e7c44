//! Prompter that replays canned answers

use std::collections::VecDeque;

use super::{
    ConfirmPrompt, ListPrompt, MultiSelectPrompt, PromptError, Prompter, SelectPrompt, TextPrompt,
};

/// One canned answer for a [`ScriptedPrompter`]
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Text(Option<String>),
    Confirm(bool),
    List(Vec<String>),
    Select(usize),
    MultiSelect(Vec<usize>),
    /// Simulate the user aborting the prompt
    Cancel,
}

impl Answer {
    pub fn text(value: impl Into<String>) -> Self {
        Answer::Text(Some(value.into()))
    }

    pub fn empty() -> Self {
        Answer::Text(None)
    }

    fn kind(&self) -> &'static str {
        match self {
            Answer::Text(_) => "text",
            Answer::Confirm(_) => "confirm",
            Answer::List(_) => "list",
            Answer::Select(_) => "select",
            Answer::MultiSelect(_) => "multiselect",
            Answer::Cancel => "cancel",
        }
    }
}

/// Replays answers in order and records every question asked
///
/// Used by tests and by non-interactive callers that already know the answers.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<String>,
    announcements: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
            announcements: Vec::new(),
        }
    }

    /// Number of questions asked so far
    pub fn calls(&self) -> usize {
        self.asked.len()
    }

    /// Messages of the questions asked, in order
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn announcements(&self) -> &[String] {
        &self.announcements
    }

    /// Answers that were never consumed
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, message: &str, expected: &str) -> Result<Answer, PromptError> {
        self.asked.push(message.to_string());
        match self.answers.pop_front() {
            Some(Answer::Cancel) => Err(PromptError::Cancelled),
            Some(answer) => Ok(answer),
            None => Err(PromptError::Script(format!(
                "no answer left for {} prompt '{}'",
                expected, message
            ))),
        }
    }

    fn mismatch(expected: &str, got: &Answer, message: &str) -> PromptError {
        PromptError::Script(format!(
            "expected {} answer for '{}', got {}",
            expected,
            message,
            got.kind()
        ))
    }
}

impl Prompter for ScriptedPrompter {
    fn text(&mut self, prompt: &TextPrompt) -> Result<Option<String>, PromptError> {
        match self.next(&prompt.message, "text")? {
            Answer::Text(value) => Ok(value.filter(|v| !v.is_empty())),
            other => Err(Self::mismatch("text", &other, &prompt.message)),
        }
    }

    fn confirm(&mut self, prompt: &ConfirmPrompt) -> Result<bool, PromptError> {
        match self.next(&prompt.message, "confirm")? {
            Answer::Confirm(value) => Ok(value),
            other => Err(Self::mismatch("confirm", &other, &prompt.message)),
        }
    }

    fn list(&mut self, prompt: &ListPrompt) -> Result<Vec<String>, PromptError> {
        match self.next(&prompt.message, "list")? {
            Answer::List(items) => Ok(items),
            other => Err(Self::mismatch("list", &other, &prompt.message)),
        }
    }

    fn select(&mut self, prompt: &SelectPrompt) -> Result<usize, PromptError> {
        match self.next(&prompt.message, "select")? {
            Answer::Select(index) if index < prompt.choices.len() => Ok(index),
            Answer::Select(index) => Err(PromptError::Script(format!(
                "select index {} out of range for '{}'",
                index, prompt.message
            ))),
            other => Err(Self::mismatch("select", &other, &prompt.message)),
        }
    }

    fn multiselect(&mut self, prompt: &MultiSelectPrompt) -> Result<Vec<usize>, PromptError> {
        match self.next(&prompt.message, "multiselect")? {
            Answer::MultiSelect(mut indices) => {
                if let Some(bad) = indices.iter().find(|&&i| i >= prompt.choices.len()) {
                    return Err(PromptError::Script(format!(
                        "multiselect index {} out of range for '{}'",
                        bad, prompt.message
                    )));
                }
                indices.sort_unstable();
                indices.dedup();
                Ok(indices)
            }
            other => Err(Self::mismatch("multiselect", &other, &prompt.message)),
        }
    }

    fn announce(&mut self, message: &str) -> Result<(), PromptError> {
        self.announcements.push(message.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_prompt(message: &str) -> TextPrompt {
        TextPrompt {
            message: message.to_string(),
            default: None,
        }
    }

    #[test]
    fn test_replays_in_order() {
        let mut prompter = ScriptedPrompter::new([Answer::text("a"), Answer::Confirm(true)]);
        assert_eq!(
            prompter.text(&text_prompt("first")).unwrap(),
            Some("a".to_string())
        );
        let confirm = ConfirmPrompt {
            message: "second".to_string(),
            initial: false,
        };
        assert!(prompter.confirm(&confirm).unwrap());
        assert_eq!(prompter.calls(), 2);
        assert_eq!(prompter.asked(), ["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_empty_text_is_none() {
        let mut prompter = ScriptedPrompter::new([Answer::text("")]);
        assert_eq!(prompter.text(&text_prompt("q")).unwrap(), None);
    }

    #[test]
    fn test_cancel() {
        let mut prompter = ScriptedPrompter::new([Answer::Cancel]);
        assert!(matches!(
            prompter.text(&text_prompt("q")),
            Err(PromptError::Cancelled)
        ));
    }

    #[test]
    fn test_exhausted_script() {
        let mut prompter = ScriptedPrompter::new([]);
        assert!(matches!(
            prompter.text(&text_prompt("q")),
            Err(PromptError::Script(_))
        ));
    }

    #[test]
    fn test_kind_mismatch() {
        let mut prompter = ScriptedPrompter::new([Answer::Select(0)]);
        let err = prompter.text(&text_prompt("q")).unwrap_err();
        assert!(err.to_string().contains("expected text answer"));
    }
}
