//! Value context built up while a format is resolved
//!
//! The context is a single owned tree of JSON objects keyed by dotted paths.
//! Writes create intermediate objects on demand; reads distinguish a path that
//! was never written from one that holds a falsy value.

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Errors raised when writing into the context
#[derive(Debug, Error, PartialEq)]
pub enum ContextError {
    #[error("variable path is empty")]
    EmptyPath,

    #[error("cannot write '{path}': segment '{segment}' holds a non-object value")]
    NotAnObject { path: String, segment: String },
}

/// Result of a dotted-path lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// Some segment of the path does not exist
    NotFound,
    Found(&'a JsonValue),
}

impl<'a> Lookup<'a> {
    /// True when a value is present and not `null`
    pub fn is_defined(&self) -> bool {
        matches!(self, Lookup::Found(value) if !value.is_null())
    }

    pub fn value(&self) -> Option<&'a JsonValue> {
        match self {
            Lookup::NotFound => None,
            Lookup::Found(value) => Some(value),
        }
    }
}

/// Mapping from dotted paths to resolved values, scoped to one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueContext {
    root: Map<String, JsonValue>,
}

impl ValueContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` at a dotted path, creating missing intermediate objects
    ///
    /// Siblings of every segment are left untouched.
    pub fn assign(&mut self, path: &str, value: JsonValue) -> Result<(), ContextError> {
        if path.is_empty() {
            return Err(ContextError::EmptyPath);
        }

        let mut segments: Vec<&str> = path.split('.').collect();
        let last = segments.pop().unwrap_or(path);
        let mut current = &mut self.root;

        for segment in segments {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if entry.is_null() {
                *entry = JsonValue::Object(Map::new());
            }
            current = match entry {
                JsonValue::Object(map) => map,
                _ => {
                    return Err(ContextError::NotAnObject {
                        path: path.to_string(),
                        segment: segment.to_string(),
                    })
                }
            };
        }

        current.insert(last.to_string(), value);
        Ok(())
    }

    /// Read the value at a dotted path
    pub fn lookup(&self, path: &str) -> Lookup<'_> {
        let mut segments = path.split('.');
        let Some(first) = segments.next() else {
            return Lookup::NotFound;
        };
        let Some(mut current) = self.root.get(first) else {
            return Lookup::NotFound;
        };

        for segment in segments {
            match current.as_object().and_then(|map| map.get(segment)) {
                Some(next) => current = next,
                None => return Lookup::NotFound,
            }
        }
        Lookup::Found(current)
    }

    /// Top-level entries, in insertion-independent key order
    pub fn entries(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.root.iter()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.root.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// The whole context as a JSON object
    pub fn as_json(&self) -> JsonValue {
        JsonValue::Object(self.root.clone())
    }
}
