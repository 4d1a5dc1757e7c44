//! Template renderer
//!
//! Produces the commit message from a format's template string and the
//! resolved [`ValueContext`]. Literal text is copied through with escapes
//! applied; every `${...}` interpolation is evaluated against the top-level
//! context entries, the format's known arguments and the built-in helpers,
//! then converted to a string.

mod error;
mod eval;
mod helpers;
mod value;

pub use error::RenderError;
pub use eval::Scope;
pub use helpers::Helper;
pub use value::Value;

use crate::context::ValueContext;
use crate::parser::{parse_template, Segment, Template};

/// Parse a template, mapping syntax errors into [`RenderError::Parse`]
pub fn compile(template: &str) -> Result<Template, RenderError> {
    Ok(parse_template(template)?)
}

/// Render an already parsed template
///
/// Names are looked up as they are evaluated: an unbound name in a branch
/// that is never taken does not fail the render.
pub fn render_template(
    template: &Template,
    context: &ValueContext,
    known_args: &[String],
) -> Result<String, RenderError> {
    let scope = Scope::new(context, known_args);

    let mut out = String::new();
    for segment in &template.segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Interpolation(expr) => {
                let value = scope.eval(expr)?;
                out.push_str(&value.to_string());
            }
        }
    }
    tracing::debug!(
        segments = template.segments.len(),
        length = out.len(),
        "Rendered template"
    );
    Ok(out)
}

/// Parse and render a template string in one step
pub fn render(
    template: &str,
    context: &ValueContext,
    known_args: &[String],
) -> Result<String, RenderError> {
    render_template(&compile(template)?, context, known_args)
}
