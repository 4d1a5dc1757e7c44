//! Splitting template strings into text and `${...}` interpolations

use crate::parser::ast::{Segment, Span, Template};
use crate::parser::grammar::parse_expression;
use crate::ParseError;

/// Parse a template string
///
/// Backslash escapes in literal text follow template-literal rules: `\n`,
/// `\t` and `\r` produce control characters, any other escaped character
/// stands for itself (so `\${` yields a literal `${`). Errors from every
/// interpolation are collected before returning.
pub fn parse_template(source: &str) -> Result<Template, Vec<ParseError>> {
    let mut segments = Vec::new();
    let mut errors = Vec::new();
    let mut text = String::new();

    let mut chars = source.char_indices().peekable();
    while let Some((pos, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => text.push('\n'),
                Some((_, 't')) => text.push('\t'),
                Some((_, 'r')) => text.push('\r'),
                Some((_, escaped)) => text.push(escaped),
                None => text.push('\\'),
            },
            '$' if matches!(chars.peek(), Some((_, '{'))) => {
                let open = pos + 2;
                let close = match find_closing_brace(source, open) {
                    Some(close) => close,
                    None => {
                        errors.push(syntax_error(
                            pos..source.len(),
                            "Unterminated interpolation",
                            vec!["'}'".to_string()],
                        ));
                        break;
                    }
                };

                if !text.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut text)));
                }

                let inner = &source[open..close];
                if inner.trim().is_empty() {
                    errors.push(syntax_error(
                        pos..close + 1,
                        "Empty interpolation",
                        vec!["expression".to_string()],
                    ));
                } else {
                    match parse_expression(inner, open) {
                        Ok(expr) => segments.push(Segment::Interpolation(expr)),
                        Err(errs) => errors.extend(errs),
                    }
                }

                // Skip past the closing brace
                while let Some(&(next, _)) = chars.peek() {
                    if next > close {
                        break;
                    }
                    chars.next();
                }
            }
            other => text.push(other),
        }
    }

    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }

    if errors.is_empty() {
        Ok(Template { segments })
    } else {
        Err(errors)
    }
}

/// Byte offset of the `}` that closes an interpolation opened just before `start`
///
/// Braces inside quoted strings do not count.
fn find_closing_brace(source: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = source[start..].char_indices();

    while let Some((offset, c)) = chars.next() {
        match (quote, c) {
            (Some(_), '\\') => {
                chars.next();
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '{') => depth += 1,
            (None, '}') if depth == 0 => return Some(start + offset),
            (None, '}') => depth -= 1,
            (None, _) => {}
        }
    }
    None
}

fn syntax_error(span: Span, message: &str, expected: Vec<String>) -> ParseError {
    ParseError::Syntax {
        span,
        message: message.to_string(),
        expected,
    }
}
