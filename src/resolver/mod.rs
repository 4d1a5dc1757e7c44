//! Variable resolution
//!
//! Walks a format's variable declarations in order, obtaining a value for each
//! one either from the configuration or from a [`Prompter`](crate::prompt::Prompter),
//! and assembles the results into a [`ValueContext`](crate::context::ValueContext).
//!
//! Every declaration first consults its `includeOn` condition; an excluded
//! declaration yields no value and asks no question. Composite kinds (`list`,
//! `array`) recurse into their item declarations.

mod error;
mod variables;

pub use error::ResolveError;
pub use variables::{
    resolve, resolve_array, resolve_boolean, resolve_list, resolve_multiselect, resolve_select,
    resolve_string, resolve_variables, DEFAULT_CONTINUE_PROMPT,
};
