//! Parser for commit message templates

pub mod ast;
mod grammar;
pub mod lexer;
mod literal;

pub use ast::*;
pub use grammar::parse_expression;
pub use literal::parse_template;
