//! Inclusion conditions for variable declarations

use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::context::{Lookup, ValueContext};
use crate::schema::{ConditionMode, IncludeCondition};

/// Errors for malformed inclusion conditions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConditionError {
    #[error("include condition name is not specified")]
    MissingName,

    #[error("unknown include condition mode '{0}'")]
    UnknownMode(String),
}

/// Decide whether a declaration guarded by `condition` takes part in resolution
///
/// A missing condition always includes. `true`/`false` modes require the looked
/// up value to be exactly that boolean.
pub fn evaluate(
    context: &ValueContext,
    condition: Option<&IncludeCondition>,
) -> Result<bool, ConditionError> {
    let Some(condition) = condition else {
        return Ok(true);
    };

    let name = match condition.name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => return Err(ConditionError::MissingName),
    };
    let found = context.lookup(name);

    let included = match &condition.mode {
        ConditionMode::Exists => found.is_defined(),
        ConditionMode::NotExists => !found.is_defined(),
        ConditionMode::True => matches!(found, Lookup::Found(JsonValue::Bool(true))),
        ConditionMode::False => matches!(found, Lookup::Found(JsonValue::Bool(false))),
        ConditionMode::Other(mode) => return Err(ConditionError::UnknownMode(mode.clone())),
    };
    Ok(included)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn condition(name: &str, mode: &str) -> IncludeCondition {
        IncludeCondition {
            name: Some(name.to_string()),
            mode: ConditionMode::from(mode.to_string()),
        }
    }

    fn context() -> ValueContext {
        let mut ctx = ValueContext::new();
        ctx.assign("flag", json!(false)).unwrap();
        ctx.assign("on", json!(true)).unwrap();
        ctx.assign("scope.name", json!("api")).unwrap();
        ctx.assign("count", json!(1)).unwrap();
        ctx
    }

    #[test]
    fn test_no_condition_includes() {
        assert_eq!(evaluate(&ValueContext::new(), None), Ok(true));
    }

    #[test]
    fn test_exists_and_not_exists() {
        let ctx = context();
        assert_eq!(evaluate(&ctx, Some(&condition("flag", "exists"))), Ok(true));
        assert_eq!(evaluate(&ctx, Some(&condition("scope.name", "exists"))), Ok(true));
        assert_eq!(evaluate(&ctx, Some(&condition("missing", "exists"))), Ok(false));
        assert_eq!(evaluate(&ctx, Some(&condition("flag", "not-exists"))), Ok(false));
        assert_eq!(
            evaluate(&ctx, Some(&condition("missing.deep", "not-exists"))),
            Ok(true)
        );
    }

    #[test]
    fn test_true_requires_exact_boolean() {
        let ctx = context();
        assert_eq!(evaluate(&ctx, Some(&condition("on", "true"))), Ok(true));
        assert_eq!(evaluate(&ctx, Some(&condition("count", "true"))), Ok(false));
        assert_eq!(evaluate(&ctx, Some(&condition("flag", "true"))), Ok(false));
        assert_eq!(evaluate(&ctx, Some(&condition("missing", "true"))), Ok(false));
    }

    #[test]
    fn test_false_requires_exact_boolean() {
        let ctx = context();
        assert_eq!(evaluate(&ctx, Some(&condition("flag", "false"))), Ok(true));
        assert_eq!(evaluate(&ctx, Some(&condition("missing", "false"))), Ok(false));
        assert_eq!(evaluate(&ctx, Some(&condition("on", "false"))), Ok(false));
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let cond = IncludeCondition {
            name: None,
            mode: ConditionMode::Exists,
        };
        assert_eq!(
            evaluate(&ValueContext::new(), Some(&cond)),
            Err(ConditionError::MissingName)
        );
        assert_eq!(
            evaluate(&ValueContext::new(), Some(&condition("", "true"))),
            Err(ConditionError::MissingName)
        );
    }

    #[test]
    fn test_unknown_mode_is_an_error() {
        assert_eq!(
            evaluate(&context(), Some(&condition("flag", "truthy"))),
            Err(ConditionError::UnknownMode("truthy".to_string()))
        );
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let ctx = context();
        let cond = condition("scope.name", "exists");
        let first = evaluate(&ctx, Some(&cond));
        let second = evaluate(&ctx, Some(&cond));
        assert_eq!(first, second);
    }
}
