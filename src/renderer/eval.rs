//! Expression evaluation against a resolved context

use std::collections::BTreeMap;

use crate::context::ValueContext;
use crate::parser::{BinaryOp, Expr, Literal, Spanned, UnaryOp};

use super::error::RenderError;
use super::helpers::Helper;
use super::value::Value;

/// Names visible to a template
///
/// Top-level context entries are bound to their values; declared known
/// arguments that the context does not define are bound to `undefined`.
/// Helper names always refer to helpers.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: BTreeMap<String, Value>,
}

impl Scope {
    pub fn new(context: &ValueContext, known_args: &[String]) -> Self {
        let mut bindings: BTreeMap<String, Value> = known_args
            .iter()
            .map(|name| (name.clone(), Value::Undefined))
            .collect();
        for (name, value) in context.entries() {
            bindings.insert(name.clone(), Value::from(value));
        }
        Self { bindings }
    }

    pub fn is_bound(&self, name: &str) -> bool {
        Helper::from_name(name).is_some() || self.bindings.contains_key(name)
    }

    pub fn eval(&self, expr: &Spanned<Expr>) -> Result<Value, RenderError> {
        match &expr.node {
            Expr::Literal(lit) => Ok(match lit {
                Literal::Undefined => Value::Undefined,
                Literal::Null => Value::Null,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Number(n) => Value::Number(*n),
                Literal::String(s) => Value::String(s.clone()),
            }),

            Expr::Ident(id) => {
                if Helper::from_name(id.as_str()).is_some() {
                    return Err(RenderError::HelperNotCalled {
                        name: id.to_string(),
                        span: expr.span.clone(),
                    });
                }
                self.bindings
                    .get(id.as_str())
                    .cloned()
                    .ok_or_else(|| RenderError::UnboundIdentifier {
                        name: id.to_string(),
                        span: expr.span.clone(),
                    })
            }

            Expr::Array(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),

            Expr::Member { object, property } => {
                let target = self.eval(object)?;
                property_of(&target, property.node.as_str(), &expr.span)
            }

            Expr::Index { object, index } => {
                let target = self.eval(object)?;
                let key = self.eval(index)?;
                match (&target, &key) {
                    (Value::Array(items), Value::Number(n)) => Ok(array_index(items, *n)
                        .cloned()
                        .unwrap_or(Value::Undefined)),
                    (Value::String(s), Value::Number(n)) => Ok(array_index_len(s.chars().count(), *n)
                        .and_then(|i| s.chars().nth(i))
                        .map(|c| Value::String(c.to_string()))
                        .unwrap_or(Value::Undefined)),
                    _ => property_of(&target, &key.to_string(), &expr.span),
                }
            }

            Expr::Call { callee, args } => {
                let helper = match &callee.node {
                    Expr::Ident(id) if !self.is_bound(id.as_str()) => {
                        return Err(RenderError::UnboundIdentifier {
                            name: id.to_string(),
                            span: callee.span.clone(),
                        })
                    }
                    Expr::Ident(id) => Helper::from_name(id.as_str()),
                    _ => None,
                };
                let helper = helper.ok_or_else(|| RenderError::NotCallable {
                    callee: describe_callee(callee),
                    span: callee.span.clone(),
                })?;
                let values = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                helper.call(values).map_err(|message| RenderError::Type {
                    message,
                    span: expr.span.clone(),
                })
            }

            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!value.is_truthy()),
                    UnaryOp::Neg => Value::Number(-value.to_number()),
                })
            }

            Expr::Binary { op, left, right } => {
                let lhs = self.eval(left)?;
                match op {
                    // Logical operators short-circuit and yield an operand
                    BinaryOp::And if !lhs.is_truthy() => Ok(lhs),
                    BinaryOp::Or if lhs.is_truthy() => Ok(lhs),
                    BinaryOp::And | BinaryOp::Or => self.eval(right),
                    _ => {
                        let rhs = self.eval(right)?;
                        Ok(binary(*op, &lhs, &rhs))
                    }
                }
            }

            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.eval(test)?.is_truthy() {
                    self.eval(consequent)
                } else {
                    self.eval(alternate)
                }
            }
        }
    }
}

fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    match op {
        BinaryOp::StrictEq => Value::Bool(lhs.strict_eq(rhs)),
        BinaryOp::StrictNe => Value::Bool(!lhs.strict_eq(rhs)),
        BinaryOp::LooseEq => Value::Bool(lhs.loose_eq(rhs)),
        BinaryOp::LooseNe => Value::Bool(!lhs.loose_eq(rhs)),
        BinaryOp::Less | BinaryOp::LessOrEqual | BinaryOp::Greater | BinaryOp::GreaterOrEqual => {
            Value::Bool(compare(op, lhs, rhs))
        }
        BinaryOp::Add if concatenates(lhs) || concatenates(rhs) => {
            Value::String(format!("{}{}", lhs, rhs))
        }
        BinaryOp::Add => Value::Number(lhs.to_number() + rhs.to_number()),
        BinaryOp::Sub => Value::Number(lhs.to_number() - rhs.to_number()),
        // Handled with short-circuiting by the caller
        BinaryOp::And | BinaryOp::Or => Value::Undefined,
    }
}

fn concatenates(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Array(_) | Value::Object(_))
}

/// Relational comparison; strings compare lexicographically, anything else numerically
fn compare(op: BinaryOp, lhs: &Value, rhs: &Value) -> bool {
    let ordering = match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => lhs.to_number().partial_cmp(&rhs.to_number()),
    };
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        BinaryOp::Less => ordering.is_lt(),
        BinaryOp::LessOrEqual => ordering.is_le(),
        BinaryOp::Greater => ordering.is_gt(),
        BinaryOp::GreaterOrEqual => ordering.is_ge(),
        _ => false,
    }
}

fn property_of(target: &Value, property: &str, span: &std::ops::Range<usize>) -> Result<Value, RenderError> {
    match target {
        Value::Undefined | Value::Null => Err(RenderError::Type {
            message: format!(
                "cannot read property '{}' of {}",
                property,
                target.type_name()
            ),
            span: span.clone(),
        }),
        Value::Object(map) => Ok(map.get(property).cloned().unwrap_or(Value::Undefined)),
        Value::Array(items) if property == "length" => Ok(Value::Number(items.len() as f64)),
        Value::String(s) if property == "length" => {
            Ok(Value::Number(s.encode_utf16().count() as f64))
        }
        Value::Array(items) => Ok(property
            .parse::<f64>()
            .ok()
            .and_then(|n| array_index(items, n))
            .cloned()
            .unwrap_or(Value::Undefined)),
        _ => Ok(Value::Undefined),
    }
}

fn array_index(items: &[Value], n: f64) -> Option<&Value> {
    array_index_len(items.len(), n).and_then(|i| items.get(i))
}

fn array_index_len(len: usize, n: f64) -> Option<usize> {
    if n.fract() == 0.0 && n >= 0.0 && n < len as f64 {
        Some(n as usize)
    } else {
        None
    }
}

fn describe_callee(callee: &Spanned<Expr>) -> String {
    match &callee.node {
        Expr::Ident(id) => format!("'{}'", id),
        Expr::Member { property, .. } => format!("method '{}'", property.node),
        _ => "expression".to_string(),
    }
}
