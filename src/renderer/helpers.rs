//! Built-in helper functions callable from templates
//!
//! Helpers are the only callable names in a template. They never consult the
//! context directly; all data arrives through their arguments.

use super::value::{join, Value};

static UNDEFINED: Value = Value::Undefined;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Helper {
    Eq,
    In,
    Contains,
    ContainsAny,
    ContainsAll,
    Array,
    Exist,
    Join,
}

impl Helper {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "$eq" => Some(Helper::Eq),
            "$in" => Some(Helper::In),
            "$contains" => Some(Helper::Contains),
            "$containsAny" => Some(Helper::ContainsAny),
            "$containsAll" => Some(Helper::ContainsAll),
            "$array" => Some(Helper::Array),
            "$exist" => Some(Helper::Exist),
            "$join" => Some(Helper::Join),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Helper::Eq => "$eq",
            Helper::In => "$in",
            Helper::Contains => "$contains",
            Helper::ContainsAny => "$containsAny",
            Helper::ContainsAll => "$containsAll",
            Helper::Array => "$array",
            Helper::Exist => "$exist",
            Helper::Join => "$join",
        }
    }

    /// Apply the helper to already-evaluated arguments
    ///
    /// Missing arguments are `undefined`. The error is a message describing
    /// the misuse; the caller attaches the source location.
    pub fn call(self, args: Vec<Value>) -> Result<Value, String> {
        let arg = |i: usize| args.get(i).unwrap_or(&UNDEFINED);
        let rest = |from: usize| args.get(from..).unwrap_or(&[]);

        match self {
            Helper::Eq => {
                let first = arg(0);
                Ok(Value::Bool(rest(1).iter().all(|v| first.strict_eq(v))))
            }
            Helper::In => self.includes(arg(1), arg(0)).map(Value::Bool),
            Helper::Contains => {
                if arg(0).is_nullish() {
                    return Ok(Value::Bool(false));
                }
                self.includes(arg(0), arg(1)).map(Value::Bool)
            }
            Helper::ContainsAny | Helper::ContainsAll => {
                let container = arg(0);
                if container.is_nullish() {
                    return Ok(Value::Bool(false));
                }
                let mut found = Vec::new();
                for value in rest(1) {
                    found.push(self.includes(container, value)?);
                }
                Ok(Value::Bool(if self == Helper::ContainsAny {
                    found.into_iter().any(|f| f)
                } else {
                    found.into_iter().all(|f| f)
                }))
            }
            Helper::Array => Ok(Value::Array(args.clone())),
            Helper::Exist => Ok(Value::Bool(!arg(0).is_nullish())),
            Helper::Join => {
                let separator = match arg(1) {
                    Value::Undefined => ",".to_string(),
                    other => other.to_string(),
                };
                match arg(0) {
                    Value::Undefined | Value::Null => Ok(Value::String(String::new())),
                    Value::Array(items) => Ok(Value::String(join(items, &separator))),
                    other => Err(format!(
                        "{}: expected an array, got {}",
                        self.name(),
                        other.type_name()
                    )),
                }
            }
        }
    }

    /// Membership test on an array, or substring test on a string
    fn includes(self, container: &Value, value: &Value) -> Result<bool, String> {
        match container {
            Value::Array(items) => Ok(items.iter().any(|item| item.same_value_zero(value))),
            Value::String(s) => Ok(s.contains(value.to_string().as_str())),
            other => Err(format!(
                "{}: cannot search in {}",
                self.name(),
                other.type_name()
            )),
        }
    }
}
