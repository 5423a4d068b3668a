//! Projected records

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::FieldList;

/// Ordered sequence of records, in the order the backend delivered them.
pub type ResultSet = Vec<Record>;

/// One matched document, projected to the report fields.
///
/// A record always holds an entry for every report field; fields the
/// document did not carry are stored as `None` so every record lines up with
/// the same columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: BTreeMap<String, Option<String>>,
}

impl Record {
    /// Record with every field absent
    pub fn empty(fields: &FieldList) -> Self {
        Self {
            values: fields.iter().map(|f| (f.clone(), None)).collect(),
        }
    }

    /// Project the fields returned for a hit onto `fields`
    ///
    /// Fields not requested are ignored; requested fields the hit lacks are
    /// kept as `None`.
    pub fn project(fields: &FieldList, hit_fields: &Map<String, Value>) -> Self {
        Self {
            values: fields
                .iter()
                .map(|f| (f.clone(), hit_fields.get(f).and_then(render_value)))
                .collect(),
        }
    }

    /// Value of `field`, `None` when absent or not a report field
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(|v| v.as_deref())
    }

    /// Whether `field` has an entry (present or explicitly absent)
    pub fn has_field(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Number of field entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Set a single value, mostly useful when building fixtures
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(field.into(), Some(value.into()));
        self
    }
}

/// Render a backend value as display text.
///
/// Strings are kept verbatim, numbers and booleans use their JSON text,
/// objects become compact JSON. Multi-valued fields (backends return field
/// values as arrays) are joined with `,`. `null` and empty arrays are absent.
pub fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(render_value).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(","))
            }
        }
        Value::Object(_) => Some(value.to_string()),
    }
}
