//! Free-text input coercion

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A description string coerced from arbitrary JSON.
///
/// Strings are taken as-is. Objects carrying a `description` field yield that
/// field (coerced recursively). `null` becomes the empty string. Anything else
/// is stringified as JSON.
///
/// ```rust
/// # use muninn::TextInput;
/// let text: TextInput = serde_json::from_str(r#"{"description": "Uber"}"#).unwrap();
/// assert_eq!(text.as_str(), "Uber");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub struct TextInput(String);

impl TextInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the text is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<Value> for TextInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self(s),
            Value::Null => Self::default(),
            Value::Object(mut map) => match map.remove("description") {
                Some(inner) => Self::from(inner),
                None => Self(Value::Object(map).to_string()),
            },
            other => Self(other.to_string()),
        }
    }
}

impl From<&str> for TextInput {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TextInput {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<TextInput> for String {
    fn from(text: TextInput) -> Self {
        text.0
    }
}

impl AsRef<str> for TextInput {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TextInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
