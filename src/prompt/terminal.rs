//! Line-based prompter for interactive terminals

use std::io::{self, BufRead, Write};

use super::{
    split_list, Choice, ConfirmPrompt, ListPrompt, MultiSelectPrompt, PromptError, Prompter,
    SelectPrompt, TextPrompt,
};

/// Prompter reading answers line by line
///
/// End of input (Ctrl-D) cancels the current prompt. Invalid answers to yes/no
/// and choice questions are asked again.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stderr> {
    /// Prompter bound to the process's stdin, writing questions to stderr
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the prompter, returning the output sink
    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        write!(self.output, "? {} › ", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(PromptError::Cancelled);
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    fn print_choices(
        &mut self,
        choices: &[Choice],
        marker: impl Fn(usize, &Choice) -> bool,
    ) -> Result<(), PromptError> {
        for (index, choice) in choices.iter().enumerate() {
            let mark = if marker(index, choice) { '*' } else { ' ' };
            let note = if choice.disabled { " (disabled)" } else { "" };
            writeln!(self.output, "  {}{:>3}) {}{}", mark, index + 1, choice.label, note)?;
        }
        Ok(())
    }

    fn warn(&mut self, message: &str) -> Result<(), PromptError> {
        writeln!(self.output, "  {}", message)?;
        Ok(())
    }
}

/// Parse a 1-based choice number into an index of a selectable choice
fn parse_choice(token: &str, choices: &[Choice]) -> Option<usize> {
    let number: usize = token.trim().parse().ok()?;
    let index = number.checked_sub(1)?;
    match choices.get(index) {
        Some(choice) if !choice.disabled => Some(index),
        _ => None,
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn text(&mut self, prompt: &TextPrompt) -> Result<Option<String>, PromptError> {
        let question = match &prompt.default {
            Some(default) => format!("{} ({})", prompt.message, default),
            None => prompt.message.clone(),
        };
        let answer = self.ask(&question)?;
        let answer = answer.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }

    fn confirm(&mut self, prompt: &ConfirmPrompt) -> Result<bool, PromptError> {
        let hint = if prompt.initial { "Y/n" } else { "y/N" };
        loop {
            let answer = self.ask(&format!("{} [{}]", prompt.message, hint))?;
            match answer.trim().to_lowercase().as_str() {
                "" => return Ok(prompt.initial),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.warn("Please answer yes or no")?,
            }
        }
    }

    fn list(&mut self, prompt: &ListPrompt) -> Result<Vec<String>, PromptError> {
        let answer = self.ask(&format!(
            "{} (separated by '{}')",
            prompt.message, prompt.separator
        ))?;
        Ok(split_list(&answer, &prompt.separator))
    }

    fn select(&mut self, prompt: &SelectPrompt) -> Result<usize, PromptError> {
        if prompt.choices.iter().all(|choice| choice.disabled) {
            return Err(PromptError::NoSelectableChoices(prompt.message.clone()));
        }
        writeln!(self.output, "? {}", prompt.message)?;
        self.print_choices(&prompt.choices, |index, _| prompt.initial == Some(index))?;
        loop {
            let answer = self.ask("Choose a number")?;
            if answer.trim().is_empty() {
                if let Some(initial) = prompt.initial {
                    return Ok(initial);
                }
            }
            match parse_choice(&answer, &prompt.choices) {
                Some(index) => return Ok(index),
                None => self.warn("Not a selectable choice")?,
            }
        }
    }

    fn multiselect(&mut self, prompt: &MultiSelectPrompt) -> Result<Vec<usize>, PromptError> {
        writeln!(self.output, "? {}", prompt.message)?;
        self.print_choices(&prompt.choices, |_, choice| choice.selected)?;
        'ask: loop {
            let answer = self.ask("Choose numbers (comma or space separated)")?;
            if answer.trim().is_empty() {
                return Ok(prompt
                    .choices
                    .iter()
                    .enumerate()
                    .filter(|(_, choice)| choice.selected && !choice.disabled)
                    .map(|(index, _)| index)
                    .collect());
            }

            let mut indices = Vec::new();
            for token in answer.split([',', ' ']).filter(|t| !t.trim().is_empty()) {
                match parse_choice(token, &prompt.choices) {
                    Some(index) => indices.push(index),
                    None => {
                        self.warn(&format!("'{}' is not a selectable choice", token.trim()))?;
                        continue 'ask;
                    }
                }
            }
            indices.sort_unstable();
            indices.dedup();
            return Ok(indices);
        }
    }

    fn announce(&mut self, message: &str) -> Result<(), PromptError> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }
}
