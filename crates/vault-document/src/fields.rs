//! Structured fields parsed from a document's leading block.

use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_yaml::{Mapping, Value};

/// A single structured field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// `true` or `false`.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A floating-point number.
    Float(f64),
    /// A string. Nested mappings are kept as their YAML text.
    Text(String),
    /// A sequence of values.
    List(Vec<Self>),
}

impl FieldValue {
    /// Converts a YAML value. Returns `None` for null.
    fn from_yaml(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            Value::String(s) => Some(Self::Text(s)),
            Value::Sequence(items) => Some(Self::List(
                items.into_iter().filter_map(Self::from_yaml).collect(),
            )),
            Value::Mapping(map) => Some(Self::Text(render_yaml(&Value::Mapping(map)))),
            Value::Tagged(tagged) => Self::from_yaml(tagged.value),
        }
    }

    /// Renders scalar values as text; lists are rendered element by element.
    fn texts(&self) -> Vec<String> {
        match self {
            Self::Bool(b) => vec![b.to_string()],
            Self::Integer(i) => vec![i.to_string()],
            Self::Float(f) => vec![f.to_string()],
            Self::Text(s) => vec![s.clone()],
            Self::List(items) => items.iter().flat_map(Self::texts).collect(),
        }
    }
}

/// Renders a YAML value as compact text.
fn render_yaml(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|text| text.trim_end().to_string())
        .unwrap_or_default()
}

/// Renders a mapping key as a string.
fn key_text(key: Value) -> String {
    match key {
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => render_yaml(&other),
    }
}

/// Ordered string-keyed fields. Null-valued keys are never present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredFields {
    /// Entries in document order.
    entries: Vec<(String, FieldValue)>,
}

impl StructuredFields {
    /// Creates an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds fields from a parsed YAML mapping, keeping key order.
    pub fn from_mapping(mapping: Mapping) -> Self {
        let entries = mapping
            .into_iter()
            .filter_map(|(key, value)| {
                FieldValue::from_yaml(value).map(|value| (key_text(key), value))
            })
            .collect();
        Self { entries }
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Iterates over entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when there are no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the document's tags.
    ///
    /// Accepts a list (`tags: [a, b]`) or a single string separated by commas or spaces
    /// (`tags: a, b`). A leading `#` is dropped from each tag.
    pub fn tags(&self) -> Vec<String> {
        let Some(value) = self.get("tags") else {
            return Vec::new();
        };
        let raw = match value {
            FieldValue::List(_) => value.texts(),
            other => other
                .texts()
                .iter()
                .flat_map(|text| {
                    text.split(|c: char| c == ',' || c.is_whitespace())
                        .map(String::from)
                        .collect::<Vec<_>>()
                })
                .collect(),
        };
        raw.into_iter()
            .map(|tag| tag.trim().trim_start_matches('#').to_string())
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

impl Serialize for StructuredFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
