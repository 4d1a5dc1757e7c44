//! Per-kind value resolution and top-level assembly

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::condition::evaluate;
use crate::context::ValueContext;
use crate::prompt::{
    Choice, ConfirmPrompt, ListPrompt, MultiSelectPrompt, Prompter, SelectPrompt, TextPrompt,
    DEFAULT_SEPARATOR,
};
use crate::schema::{
    ArrayVariable, BooleanVariable, EnumItem, ListItem, ListVariable, MultiselectVariable,
    SelectVariable, StringVariable, Variable, VariableKind, VariableMeta,
};

use super::ResolveError;

/// Question asked between array items when the declaration has no `continuePrompt`
pub const DEFAULT_CONTINUE_PROMPT: &str = "Do you want to add another item?";

/// Resolve every top-level variable in order into a fresh context
///
/// Later declarations see the values written by earlier ones, both in their
/// inclusion conditions and in the final template.
pub fn resolve_variables(
    variables: &[Variable],
    prompter: &mut dyn Prompter,
) -> Result<ValueContext, ResolveError> {
    let mut context = ValueContext::new();

    for variable in variables {
        let meta = variable.meta();
        match resolve(variable, &context, prompter)? {
            Some(value) => {
                let name = match meta.name.as_deref() {
                    Some(name) if !name.is_empty() => name,
                    _ => {
                        return Err(ResolveError::MissingName {
                            variable: meta.label().to_string(),
                        })
                    }
                };
                debug!(
                    "Setting top level variable {} as {} to {}",
                    meta.label(),
                    name,
                    value
                );
                context.assign(name, value)?;
            }
            None => debug!("Skipping top level variable {}", meta.label()),
        }
    }

    Ok(context)
}

/// Resolve one declaration of any kind
pub fn resolve(
    variable: &Variable,
    context: &ValueContext,
    prompter: &mut dyn Prompter,
) -> Result<Option<JsonValue>, ResolveError> {
    debug!("Processing {} as {}", variable.meta().label(), variable.kind());

    let value = match variable {
        Variable::String(v) => resolve_string(v, context, prompter)?.map(JsonValue::String),
        Variable::Boolean(v) => resolve_boolean(v, context, prompter)?.map(JsonValue::Bool),
        Variable::List(v) => resolve_list(v, context, prompter)?.map(JsonValue::Array),
        Variable::Array(v) => resolve_array(v, context, prompter)?.map(JsonValue::Array),
        Variable::Select(v) => resolve_select(v, context, prompter)?,
        Variable::Multiselect(v) => {
            resolve_multiselect(v, context, prompter)?.map(JsonValue::Array)
        }
    };
    Ok(value)
}

fn included(meta: &VariableMeta, context: &ValueContext) -> Result<bool, ResolveError> {
    let included = evaluate(context, meta.include_on.as_ref())?;
    if !included {
        debug!("Variable {} excluded by its include condition", meta.label());
    }
    Ok(included)
}

fn message(meta: &VariableMeta, kind: VariableKind) -> String {
    meta.message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Enter {} value", kind))
}

pub fn resolve_string(
    variable: &StringVariable,
    context: &ValueContext,
    prompter: &mut dyn Prompter,
) -> Result<Option<String>, ResolveError> {
    if !included(&variable.meta, context)? {
        return Ok(None);
    }
    if let Some(value) = &variable.value {
        return Ok(Some(value.clone()));
    }

    match prompter.text(&text_prompt(variable))? {
        Some(input) if !input.is_empty() => Ok(Some(input)),
        _ => Ok(variable.default.clone()),
    }
}

fn text_prompt(variable: &StringVariable) -> TextPrompt {
    let mut text = message(&variable.meta, VariableKind::String);
    if variable.optional == Some(true) {
        text.push_str(" (optional)");
    }
    TextPrompt {
        message: text,
        default: variable.default.clone(),
    }
}

pub fn resolve_boolean(
    variable: &BooleanVariable,
    context: &ValueContext,
    prompter: &mut dyn Prompter,
) -> Result<Option<bool>, ResolveError> {
    if !included(&variable.meta, context)? {
        return Ok(None);
    }
    if let Some(value) = variable.value {
        return Ok(Some(value));
    }

    let answer = prompter.confirm(&ConfirmPrompt {
        message: message(&variable.meta, VariableKind::Boolean),
        initial: variable.initial.unwrap_or(false),
    })?;
    Ok(Some(answer))
}

/// Resolve a `list`; boolean items are coerced by exact match against `"true"`
pub fn resolve_list(
    variable: &ListVariable,
    context: &ValueContext,
    prompter: &mut dyn Prompter,
) -> Result<Option<Vec<JsonValue>>, ResolveError> {
    if !included(&variable.meta, context)? {
        return Ok(None);
    }
    if let Some(value) = &variable.value {
        return Ok(Some(value.clone()));
    }

    let items = prompter.list(&ListPrompt {
        message: message(&variable.meta, VariableKind::List),
        separator: variable
            .separator
            .clone()
            .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string()),
    })?;

    let values = match &variable.items {
        ListItem::Boolean(_) => items
            .into_iter()
            .map(|item| JsonValue::Bool(item == "true"))
            .collect(),
        ListItem::String(_) => items.into_iter().map(JsonValue::String).collect(),
    };
    Ok(Some(values))
}

/// Resolve an `array` by repeatedly resolving its item declaration
///
/// String items end the loop on the first empty answer, before any default
/// applies. Other kinds ask whether to continue after each appended item.
pub fn resolve_array(
    variable: &ArrayVariable,
    context: &ValueContext,
    prompter: &mut dyn Prompter,
) -> Result<Option<Vec<JsonValue>>, ResolveError> {
    if !included(&variable.meta, context)? {
        return Ok(None);
    }
    if let Some(value) = &variable.value {
        return Ok(Some(value.clone()));
    }

    let label = variable.meta.label();
    if let Variable::String(item) = variable.items.as_ref() {
        if item.value.is_some() {
            return Err(ResolveError::InvalidArrayItem {
                variable: label.to_string(),
                reason: "string items end on an empty answer and cannot carry a static value"
                    .to_string(),
            });
        }
    }

    let header = message(&variable.meta, VariableKind::Array);
    if variable.items.kind() == VariableKind::String {
        prompter.announce(&format!("{} (Enter empty string to finish)", header))?;
    } else {
        prompter.announce(&header)?;
    }

    let mut items = Vec::new();
    loop {
        match variable.items.as_ref() {
            Variable::String(item) => {
                if !included(&item.meta, context)? {
                    break;
                }
                match prompter.text(&text_prompt(item))? {
                    Some(value) if !value.is_empty() => items.push(JsonValue::String(value)),
                    _ => break,
                }
            }
            Variable::Boolean(item) => match resolve_boolean(item, context, prompter)? {
                Some(value) => items.push(JsonValue::Bool(value)),
                None => {
                    return Err(ResolveError::UnresolvedBooleanItem {
                        variable: item.meta.label().to_string(),
                    })
                }
            },
            other => match resolve(other, context, prompter)? {
                Some(value) => items.push(value),
                None => break,
            },
        }

        if variable.items.kind() != VariableKind::String {
            let more = prompter.confirm(&ConfirmPrompt {
                message: variable
                    .continue_prompt
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CONTINUE_PROMPT.to_string()),
                initial: false,
            })?;
            if !more {
                break;
            }
        }
    }

    debug!("Collected {} items for array {}", items.len(), label);
    Ok(Some(items))
}

fn choices(items: &[EnumItem], disabled: &[String], selected: &[String]) -> Vec<Choice> {
    items
        .iter()
        .map(|item| Choice {
            label: item.label().to_string(),
            disabled: disabled.iter().any(|d| d == item.label()),
            selected: selected.iter().any(|s| s == item.label()),
        })
        .collect()
}

/// Resolve a `select`; the result is the chosen entry's value, not its label
pub fn resolve_select(
    variable: &SelectVariable,
    context: &ValueContext,
    prompter: &mut dyn Prompter,
) -> Result<Option<JsonValue>, ResolveError> {
    if !included(&variable.meta, context)? {
        return Ok(None);
    }
    if let Some(value) = &variable.value {
        return Ok(Some(value.clone()));
    }

    let initial = variable.initial.as_deref().and_then(|initial| {
        variable
            .choices
            .iter()
            .position(|item| item.label() == initial)
    });
    let index = prompter.select(&SelectPrompt {
        message: message(&variable.meta, VariableKind::Select),
        choices: choices(&variable.choices, &variable.disabled, &[]),
        initial,
    })?;

    let item = variable
        .choices
        .get(index)
        .ok_or_else(|| ResolveError::InvalidChoice {
            variable: variable.meta.label().to_string(),
            index,
        })?;
    match item.value() {
        JsonValue::Null => {
            debug!("Choice {} of {} has no value", item.label(), variable.meta.label());
            Ok(None)
        }
        value => Ok(Some(value)),
    }
}

/// Resolve a `multiselect` into the chosen values in enumeration order
pub fn resolve_multiselect(
    variable: &MultiselectVariable,
    context: &ValueContext,
    prompter: &mut dyn Prompter,
) -> Result<Option<Vec<JsonValue>>, ResolveError> {
    if !included(&variable.meta, context)? {
        return Ok(None);
    }
    if let Some(value) = &variable.value {
        return Ok(Some(value.clone()));
    }

    let mut indices = prompter.multiselect(&MultiSelectPrompt {
        message: message(&variable.meta, VariableKind::Multiselect),
        choices: choices(&variable.choices, &variable.disabled, &variable.selected),
    })?;
    indices.sort_unstable();
    indices.dedup();

    let values = indices
        .into_iter()
        .map(|index| {
            variable
                .choices
                .get(index)
                .map(EnumItem::value)
                .ok_or_else(|| ResolveError::InvalidChoice {
                    variable: variable.meta.label().to_string(),
                    index,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionError;
    use crate::prompt::{Answer, ScriptedPrompter};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn variable(value: JsonValue) -> Variable {
        serde_json::from_value(value).expect("Should deserialize")
    }

    fn resolve_one(
        raw: JsonValue,
        context: &ValueContext,
        answers: Vec<Answer>,
    ) -> (Result<Option<JsonValue>, ResolveError>, ScriptedPrompter) {
        let var = variable(raw);
        let mut prompter = ScriptedPrompter::new(answers);
        let result = resolve(&var, context, &mut prompter);
        (result, prompter)
    }

    #[test]
    fn test_excluded_variable_asks_nothing() {
        let kinds = [
            json!({"type": "string"}),
            json!({"type": "boolean"}),
            json!({"type": "list", "items": {"type": "string"}}),
            json!({"type": "array", "items": {"type": "string"}}),
            json!({"type": "select", "enum": ["a"]}),
            json!({"type": "multiselect", "enum": ["a"]}),
        ];
        for mut raw in kinds {
            raw["includeOn"] = json!({"name": "missing", "mode": "exists"});
            let (result, prompter) = resolve_one(raw, &ValueContext::new(), vec![]);
            assert_eq!(result.unwrap(), None);
            assert_eq!(prompter.calls(), 0);
        }
    }

    #[test]
    fn test_static_value_takes_precedence() {
        let cases = [
            (json!({"type": "string", "value": "api"}), json!("api")),
            (json!({"type": "boolean", "value": false}), json!(false)),
            (
                json!({"type": "list", "items": {"type": "boolean"}, "value": ["x"]}),
                json!(["x"]),
            ),
            (
                json!({"type": "array", "items": {"type": "string"}, "value": [1, "a"]}),
                json!([1, "a"]),
            ),
            (
                json!({"type": "select", "enum": ["a"], "value": {"k": 1}}),
                json!({"k": 1}),
            ),
            (
                json!({"type": "multiselect", "enum": ["a"], "value": ["z"]}),
                json!(["z"]),
            ),
        ];
        for (raw, expected) in cases {
            let (result, prompter) = resolve_one(raw, &ValueContext::new(), vec![Answer::Cancel]);
            assert_eq!(result.unwrap(), Some(expected));
            assert_eq!(prompter.calls(), 0);
        }
    }

    #[test]
    fn test_string_input() {
        let (result, _) = resolve_one(
            json!({"type": "string", "prompt": "Subject"}),
            &ValueContext::new(),
            vec![Answer::text("add parser")],
        );
        assert_eq!(result.unwrap(), Some(json!("add parser")));
    }

    #[test]
    fn test_string_empty_falls_back_to_default() {
        let (result, _) = resolve_one(
            json!({"type": "string", "default": "misc"}),
            &ValueContext::new(),
            vec![Answer::empty()],
        );
        assert_eq!(result.unwrap(), Some(json!("misc")));

        let (result, _) = resolve_one(
            json!({"type": "string"}),
            &ValueContext::new(),
            vec![Answer::text("")],
        );
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_optional_string_message() {
        let (_, prompter) = resolve_one(
            json!({"type": "string", "prompt": "Body", "optional": true}),
            &ValueContext::new(),
            vec![Answer::empty()],
        );
        assert_eq!(prompter.asked(), ["Body (optional)".to_string()]);
    }

    #[test]
    fn test_boolean_prompt() {
        let (result, _) = resolve_one(
            json!({"type": "boolean", "initial": true}),
            &ValueContext::new(),
            vec![Answer::Confirm(true)],
        );
        assert_eq!(result.unwrap(), Some(json!(true)));
    }

    #[test]
    fn test_list_of_booleans_is_coerced() {
        let (result, _) = resolve_one(
            json!({"type": "list", "items": {"type": "boolean"}}),
            &ValueContext::new(),
            vec![Answer::List(vec![
                "true".to_string(),
                "false".to_string(),
                "true".to_string(),
            ])],
        );
        assert_eq!(result.unwrap(), Some(json!([true, false, true])));
    }

    #[test]
    fn test_list_coercion_is_exact() {
        let (result, _) = resolve_one(
            json!({"type": "list", "items": {"type": "boolean"}}),
            &ValueContext::new(),
            vec![Answer::List(vec!["TRUE".to_string(), "yes".to_string()])],
        );
        assert_eq!(result.unwrap(), Some(json!([false, false])));
    }

    #[test]
    fn test_list_of_strings() {
        let (result, _) = resolve_one(
            json!({"type": "list", "items": {"type": "string"}, "separator": ";"}),
            &ValueContext::new(),
            vec![Answer::List(vec!["#1".to_string(), "#2".to_string()])],
        );
        assert_eq!(result.unwrap(), Some(json!(["#1", "#2"])));
    }

    #[test]
    fn test_array_of_strings_stops_on_empty() {
        let (result, prompter) = resolve_one(
            json!({"type": "array", "prompt": "Notes", "items": {"type": "string"}}),
            &ValueContext::new(),
            vec![Answer::text("one"), Answer::text("two"), Answer::text("")],
        );
        assert_eq!(result.unwrap(), Some(json!(["one", "two"])));
        assert_eq!(prompter.calls(), 3);
        assert_eq!(
            prompter.announcements(),
            ["Notes (Enter empty string to finish)".to_string()]
        );
    }

    #[test]
    fn test_array_of_strings_stops_on_absent() {
        let (result, prompter) = resolve_one(
            json!({"type": "array", "items": {"type": "string"}}),
            &ValueContext::new(),
            vec![Answer::empty()],
        );
        assert_eq!(result.unwrap(), Some(json!([])));
        assert_eq!(prompter.calls(), 1);
    }

    #[test]
    fn test_array_of_booleans_stops_when_declined() {
        let (result, prompter) = resolve_one(
            json!({"type": "array", "continuePrompt": "More?", "items": {"type": "boolean"}}),
            &ValueContext::new(),
            vec![
                Answer::Confirm(true),
                Answer::Confirm(true),
                Answer::Confirm(false),
                Answer::Confirm(true),
                Answer::Confirm(false),
                Answer::Confirm(false),
            ],
        );
        assert_eq!(result.unwrap(), Some(json!([true, false, false])));
        assert_eq!(prompter.remaining(), 0);
        assert_eq!(prompter.asked()[1], "More?");
    }

    #[test]
    fn test_array_of_selects() {
        let (result, prompter) = resolve_one(
            json!({
                "type": "array",
                "items": {"type": "select", "enum": ["api", {"label": "CLI", "value": "cli"}]}
            }),
            &ValueContext::new(),
            vec![
                Answer::Select(1),
                Answer::Confirm(true),
                Answer::Select(0),
                Answer::Confirm(false),
            ],
        );
        assert_eq!(result.unwrap(), Some(json!(["cli", "api"])));
        assert_eq!(prompter.asked()[1], DEFAULT_CONTINUE_PROMPT);
    }

    #[test]
    fn test_array_boolean_item_must_resolve() {
        let mut ctx = ValueContext::new();
        ctx.assign("flag", json!(false)).unwrap();
        let (result, _) = resolve_one(
            json!({
                "type": "array",
                "items": {"type": "boolean", "id": "ack", "includeOn": {"name": "flag", "mode": "true"}}
            }),
            &ctx,
            vec![],
        );
        match result {
            Err(ResolveError::UnresolvedBooleanItem { variable }) => assert_eq!(variable, "ack"),
            other => panic!("Expected unresolved boolean item, got {:?}", other),
        }
    }

    #[test]
    fn test_array_static_string_item_rejected() {
        let (result, _) = resolve_one(
            json!({"type": "array", "items": {"type": "string", "value": "x"}}),
            &ValueContext::new(),
            vec![],
        );
        assert!(matches!(result, Err(ResolveError::InvalidArrayItem { .. })));
    }

    #[test]
    fn test_array_defaulted_string_item_stops_on_empty_answer() {
        let (result, prompter) = resolve_one(
            json!({"type": "array", "items": {"type": "string", "default": "x"}}),
            &ValueContext::new(),
            vec![Answer::text("a"), Answer::empty(), Answer::text("unused")],
        );
        assert_eq!(result.unwrap(), Some(json!(["a"])));
        assert_eq!(prompter.remaining(), 1);
    }

    #[test]
    fn test_select_null_value_is_absent() {
        let (result, _) = resolve_one(
            json!({
                "type": "select",
                "enum": [{"label": "none", "value": null}, "x"]
            }),
            &ValueContext::new(),
            vec![Answer::Select(0)],
        );
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_select_returns_mapped_value() {
        let (result, _) = resolve_one(
            json!({
                "type": "select",
                "enum": ["K", {"label": "L", "value": {"x": 1}}]
            }),
            &ValueContext::new(),
            vec![Answer::Select(1)],
        );
        assert_eq!(result.unwrap(), Some(json!({"x": 1})));
    }

    #[test]
    fn test_select_builds_prompt() {
        let var = variable(json!({
            "type": "select",
            "prompt": "Type",
            "enum": ["feat", "fix", "chore"],
            "disabled": ["chore"],
            "initial": "fix"
        }));

        struct Capture(Option<SelectPrompt>);
        impl Prompter for Capture {
            fn text(&mut self, _: &TextPrompt) -> Result<Option<String>, crate::prompt::PromptError> {
                unreachable!()
            }
            fn confirm(&mut self, _: &ConfirmPrompt) -> Result<bool, crate::prompt::PromptError> {
                unreachable!()
            }
            fn list(&mut self, _: &ListPrompt) -> Result<Vec<String>, crate::prompt::PromptError> {
                unreachable!()
            }
            fn select(&mut self, prompt: &SelectPrompt) -> Result<usize, crate::prompt::PromptError> {
                self.0 = Some(prompt.clone());
                Ok(0)
            }
            fn multiselect(
                &mut self,
                _: &MultiSelectPrompt,
            ) -> Result<Vec<usize>, crate::prompt::PromptError> {
                unreachable!()
            }
        }

        let mut capture = Capture(None);
        let value = resolve(&var, &ValueContext::new(), &mut capture).unwrap();
        assert_eq!(value, Some(json!("feat")));

        let prompt = capture.0.unwrap();
        assert_eq!(prompt.message, "Type");
        assert_eq!(prompt.initial, Some(1));
        assert!(prompt.choices[2].disabled);
        assert!(!prompt.choices[0].disabled);
    }

    #[test]
    fn test_multiselect_values_in_enum_order() {
        let (result, _) = resolve_one(
            json!({
                "type": "multiselect",
                "enum": ["api", {"label": "CLI", "value": 2}, "docs"],
                "selected": ["docs"]
            }),
            &ValueContext::new(),
            vec![Answer::MultiSelect(vec![2, 1])],
        );
        assert_eq!(result.unwrap(), Some(json!([2, "docs"])));
    }

    #[test]
    fn test_resolve_variables_in_order() {
        let vars: Vec<Variable> = serde_json::from_value(json!([
            {"type": "boolean", "name": "hasScope"},
            {"type": "string", "name": "commit.scope", "includeOn": {"name": "hasScope", "mode": "true"}},
            {"type": "string", "name": "commit.subject"},
            {"type": "string", "name": "footer", "includeOn": {"name": "commit.scope", "mode": "not-exists"}}
        ]))
        .unwrap();
        let mut prompter = ScriptedPrompter::new([
            Answer::Confirm(true),
            Answer::text("api"),
            Answer::text("add endpoint"),
        ]);
        let ctx = resolve_variables(&vars, &mut prompter).unwrap();
        assert_eq!(
            ctx.as_json(),
            json!({
                "hasScope": true,
                "commit": {"scope": "api", "subject": "add endpoint"}
            })
        );
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_absent_value_is_skipped_without_name() {
        let vars: Vec<Variable> = serde_json::from_value(json!([
            {"type": "string", "id": "nameless"}
        ]))
        .unwrap();
        let mut prompter = ScriptedPrompter::new([Answer::empty()]);
        let ctx = resolve_variables(&vars, &mut prompter).unwrap();
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_resolved_value_requires_name() {
        let vars: Vec<Variable> = serde_json::from_value(json!([
            {"type": "string", "id": "nameless", "value": "x"}
        ]))
        .unwrap();
        let mut prompter = ScriptedPrompter::new([]);
        let err = resolve_variables(&vars, &mut prompter).unwrap_err();
        assert_eq!(err.to_string(), "variable 'nameless' has a value but no name");
    }

    #[test]
    fn test_missing_condition_name_is_fatal() {
        let vars: Vec<Variable> = serde_json::from_value(json!([
            {"type": "string", "name": "a", "includeOn": {"mode": "exists"}}
        ]))
        .unwrap();
        let mut prompter = ScriptedPrompter::new([]);
        let err = resolve_variables(&vars, &mut prompter).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Condition(ConditionError::MissingName)
        ));
    }

    #[test]
    fn test_cancellation_stops_resolution() {
        let vars: Vec<Variable> = serde_json::from_value(json!([
            {"type": "string", "name": "a"},
            {"type": "string", "name": "b"}
        ]))
        .unwrap();
        let mut prompter = ScriptedPrompter::new([Answer::Cancel, Answer::text("never")]);
        let err = resolve_variables(&vars, &mut prompter).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(prompter.calls(), 1);
    }
}
