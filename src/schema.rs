//! Data model for a commits-format configuration document
//!
//! A configuration holds named formats. Each format declares an ordered list of
//! typed variables and a template that interpolates their resolved values.
//! Declarations are read-only once loaded; the resolver never mutates them.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Root of a `commits-format.json` / `commits-format.toml` document
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CommitFormatConfiguration {
    /// Schema version of the document
    #[serde(default)]
    pub version: Option<String>,
    /// Available formats, selected by name
    #[serde(default)]
    pub formats: Vec<Format>,
}

impl CommitFormatConfiguration {
    /// Find a format by its name
    pub fn format(&self, name: &str) -> Option<&Format> {
        self.formats.iter().find(|format| format.name == name)
    }
}

/// A named commit message format
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Format {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Resolved strictly in declaration order
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub template: Option<TemplateSpec>,
}

/// How a format's final text is produced
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSpec {
    #[serde(default)]
    pub mode: Option<TemplateMode>,
    /// Template literal with `${...}` interpolations
    #[serde(default)]
    pub string: Option<String>,
    /// Names that are always bound while rendering, even when unresolved
    #[serde(default)]
    pub known_args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateMode {
    #[default]
    StringLiteral,
}

/// Condition deciding whether a variable takes part in resolution
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IncludeCondition {
    /// Dotted path looked up in the value context
    #[serde(default)]
    pub name: Option<String>,
    pub mode: ConditionMode,
}

/// Check performed by an [`IncludeCondition`]
///
/// Unknown modes deserialize into [`ConditionMode::Other`] and are rejected
/// when the condition is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionMode {
    Exists,
    NotExists,
    True,
    False,
    Other(String),
}

impl From<String> for ConditionMode {
    fn from(mode: String) -> Self {
        match mode.as_str() {
            "exists" => ConditionMode::Exists,
            "not-exists" => ConditionMode::NotExists,
            "true" => ConditionMode::True,
            "false" => ConditionMode::False,
            _ => ConditionMode::Other(mode),
        }
    }
}

impl From<ConditionMode> for String {
    fn from(mode: ConditionMode) -> Self {
        mode.to_string()
    }
}

impl std::fmt::Display for ConditionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConditionMode::Exists => "exists",
            ConditionMode::NotExists => "not-exists",
            ConditionMode::True => "true",
            ConditionMode::False => "false",
            ConditionMode::Other(other) => other.as_str(),
        };
        write!(f, "{}", s)
    }
}

/// Fields shared by every variable kind
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableMeta {
    /// Diagnostic label
    #[serde(default)]
    pub id: Option<String>,
    /// Dotted path the resolved value is stored under
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Text shown when the value is asked for interactively
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub include_on: Option<IncludeCondition>,
}

impl VariableMeta {
    /// Label used in diagnostics
    pub fn label(&self) -> &str {
        self.id
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("<anonymous>")
    }

    /// Message for an interactive prompt, falling back through the descriptive fields
    pub fn message(&self) -> Option<&str> {
        self.prompt
            .as_deref()
            .or(self.description.as_deref())
            .or(self.name.as_deref())
            .or(self.id.as_deref())
    }
}

/// One variable declaration, discriminated by its `type` field
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Variable {
    String(StringVariable),
    Boolean(BooleanVariable),
    List(ListVariable),
    Array(ArrayVariable),
    Select(SelectVariable),
    Multiselect(MultiselectVariable),
}

/// Discriminant of a [`Variable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    String,
    Boolean,
    List,
    Array,
    Select,
    Multiselect,
}

impl std::fmt::Display for VariableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VariableKind::String => "string",
            VariableKind::Boolean => "boolean",
            VariableKind::List => "list",
            VariableKind::Array => "array",
            VariableKind::Select => "select",
            VariableKind::Multiselect => "multiselect",
        };
        write!(f, "{}", s)
    }
}

impl Variable {
    pub fn kind(&self) -> VariableKind {
        match self {
            Variable::String(_) => VariableKind::String,
            Variable::Boolean(_) => VariableKind::Boolean,
            Variable::List(_) => VariableKind::List,
            Variable::Array(_) => VariableKind::Array,
            Variable::Select(_) => VariableKind::Select,
            Variable::Multiselect(_) => VariableKind::Multiselect,
        }
    }

    pub fn meta(&self) -> &VariableMeta {
        match self {
            Variable::String(v) => &v.meta,
            Variable::Boolean(v) => &v.meta,
            Variable::List(v) => &v.meta,
            Variable::Array(v) => &v.meta,
            Variable::Select(v) => &v.meta,
            Variable::Multiselect(v) => &v.meta,
        }
    }

    pub fn as_string(&self) -> Option<&StringVariable> {
        match self {
            Variable::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<&BooleanVariable> {
        match self {
            Variable::Boolean(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListVariable> {
        match self {
            Variable::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayVariable> {
        match self {
            Variable::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_select(&self) -> Option<&SelectVariable> {
        match self {
            Variable::Select(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_multiselect(&self) -> Option<&MultiselectVariable> {
        match self {
            Variable::Multiselect(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct StringVariable {
    #[serde(flatten)]
    pub meta: VariableMeta,
    #[serde(default)]
    pub value: Option<String>,
    /// Used when interactive input is empty
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub optional: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct BooleanVariable {
    #[serde(flatten)]
    pub meta: VariableMeta,
    #[serde(default)]
    pub value: Option<bool>,
    /// Pre-selected answer of the yes/no prompt
    #[serde(default)]
    pub initial: Option<bool>,
}

/// Item declaration allowed inside a `list`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ListItem {
    String(StringVariable),
    Boolean(BooleanVariable),
}

impl ListItem {
    pub fn kind(&self) -> VariableKind {
        match self {
            ListItem::String(_) => VariableKind::String,
            ListItem::Boolean(_) => VariableKind::Boolean,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ListVariable {
    #[serde(flatten)]
    pub meta: VariableMeta,
    pub items: ListItem,
    #[serde(default)]
    pub value: Option<Vec<JsonValue>>,
    /// Splits the interactive input into elements
    #[serde(default)]
    pub separator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayVariable {
    #[serde(flatten)]
    pub meta: VariableMeta,
    pub items: Box<Variable>,
    #[serde(default)]
    pub value: Option<Vec<JsonValue>>,
    /// Question asked after each item when items are not strings
    #[serde(default)]
    pub continue_prompt: Option<String>,
}

/// One entry of a `select`/`multiselect` enumeration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EnumItem {
    /// Label and value are the same string
    Plain(String),
    Labeled { label: String, value: JsonValue },
}

impl EnumItem {
    pub fn label(&self) -> &str {
        match self {
            EnumItem::Plain(label) => label,
            EnumItem::Labeled { label, .. } => label,
        }
    }

    pub fn value(&self) -> JsonValue {
        match self {
            EnumItem::Plain(label) => JsonValue::String(label.clone()),
            EnumItem::Labeled { value, .. } => value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SelectVariable {
    #[serde(flatten)]
    pub meta: VariableMeta,
    #[serde(rename = "enum")]
    pub choices: Vec<EnumItem>,
    /// Labels shown but not selectable
    #[serde(default)]
    pub disabled: Vec<String>,
    /// Label highlighted initially
    #[serde(default)]
    pub initial: Option<String>,
    #[serde(default)]
    pub value: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MultiselectVariable {
    #[serde(flatten)]
    pub meta: VariableMeta,
    #[serde(rename = "enum")]
    pub choices: Vec<EnumItem>,
    #[serde(default)]
    pub disabled: Vec<String>,
    /// Labels checked initially
    #[serde(default)]
    pub selected: Vec<String>,
    #[serde(default)]
    pub value: Option<Vec<JsonValue>>,
}
