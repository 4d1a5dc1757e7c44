//! commits-format - interactive commit message builder
//!
//! A repository declares one or more commit message formats: an ordered list of
//! typed variables and a template. This library resolves the variables (from
//! static values in the configuration or by prompting the user), assembles
//! them into a value context and renders the template against it.
//!
//! # Example
//!
//! ```rust
//! use commits_format::prompt::{Answer, ScriptedPrompter};
//! use commits_format::{format_commit, CommitFormatConfiguration};
//!
//! let config = CommitFormatConfiguration::from_json_str(r#"{
//!     "formats": [{
//!         "name": "default",
//!         "variables": [
//!             { "type": "string", "id": "scope", "name": "scope" },
//!             { "type": "boolean", "id": "breaking", "name": "breaking" }
//!         ],
//!         "template": { "string": "${scope}${$eq(breaking, true) ? '!' : ''}: change" }
//!     }]
//! }"#).unwrap();
//!
//! let mut prompter = ScriptedPrompter::new([Answer::text("api"), Answer::Confirm(true)]);
//! let message = format_commit(&config, "default", &mut prompter).unwrap();
//! assert_eq!(message, "api!: change");
//! ```

pub mod condition;
pub mod config;
pub mod context;
pub mod error;
pub mod parser;
pub mod prompt;
pub mod renderer;
pub mod resolver;
pub mod schema;

pub use config::{ConfigError, FormatOptions};
pub use context::ValueContext;
pub use error::ParseError;
pub use renderer::RenderError;
pub use resolver::ResolveError;
pub use schema::{CommitFormatConfiguration, Format, Variable};

use thiserror::Error;
use tracing::debug;

use prompt::Prompter;

/// Errors that can occur while producing a commit message
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Format {0} not found")]
    FormatNotFound(String),

    #[error("Format {0} does not have template")]
    MissingTemplate(String),

    #[error("Format {0} does not have template string")]
    MissingTemplateString(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

impl FormatError {
    /// Whether the user aborted an interactive prompt
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FormatError::Resolve(err) if err.is_cancelled())
    }
}

/// Resolve the named format and render its commit message
pub fn format_commit(
    configuration: &CommitFormatConfiguration,
    format_name: &str,
    prompter: &mut dyn Prompter,
) -> Result<String, FormatError> {
    let format = configuration
        .format(format_name)
        .ok_or_else(|| FormatError::FormatNotFound(format_name.to_string()))?;
    render_format(format, prompter)
}

/// Resolve a format's variables and render its template
///
/// The template is parsed before any prompt is shown, so a malformed
/// template fails without asking the user anything.
pub fn render_format(format: &Format, prompter: &mut dyn Prompter) -> Result<String, FormatError> {
    let spec = format
        .template
        .as_ref()
        .ok_or_else(|| FormatError::MissingTemplate(format.name.clone()))?;
    let source = spec
        .string
        .as_deref()
        .ok_or_else(|| FormatError::MissingTemplateString(format.name.clone()))?;
    let template = renderer::compile(source)?;

    debug!(
        "Resolving {} variables for format {}",
        format.variables.len(),
        format.name
    );
    let context = resolver::resolve_variables(&format.variables, prompter)?;
    debug!("Resolved context: {}", context.as_json());

    Ok(renderer::render_template(&template, &context, &spec.known_args)?)
}
