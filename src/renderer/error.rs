//! Error types for template rendering

use thiserror::Error;

use crate::error::{report, Span};
use crate::ParseError;

/// Errors that can occur while rendering a template
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("template parse errors: {}", format_parse_errors(.0))]
    Parse(Vec<ParseError>),

    /// A name used by the template is neither a context variable, a known
    /// argument nor a helper
    #[error("'{name}' is not defined")]
    UnboundIdentifier { name: String, span: Span },

    #[error("{callee} is not a function")]
    NotCallable { callee: String, span: Span },

    /// A helper referenced without calling it
    #[error("helper '{name}' must be called")]
    HelperNotCalled { name: String, span: Span },

    /// Invalid operation on a value, such as reading a property of `undefined`
    #[error("{message}")]
    Type { message: String, span: Span },
}

impl From<Vec<ParseError>> for RenderError {
    fn from(errors: Vec<ParseError>) -> Self {
        RenderError::Parse(errors)
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl RenderError {
    /// Format the error with template context using ariadne
    pub fn format(&self, template: &str, filename: &str) -> String {
        match self {
            RenderError::Parse(errors) => errors
                .iter()
                .map(|e| e.format(template, filename))
                .collect::<Vec<_>>()
                .join("\n"),
            RenderError::UnboundIdentifier { span, .. }
            | RenderError::NotCallable { span, .. }
            | RenderError::HelperNotCalled { span, .. }
            | RenderError::Type { span, .. } => {
                let message = self.to_string();
                report(template, filename, span.clone(), &message, &message)
            }
        }
    }
}
