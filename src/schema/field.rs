//! Schema field descriptors

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input kind a field declares, determining validation and coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Widget {
    /// Free-form text
    #[default]
    Text,
    /// Whole number, entered as text and coerced at submit time
    Integer,
    /// Selection from a fetched option list
    Choice,
    /// Anything the service declares that we don't recognize; validates like text
    #[serde(other)]
    Other,
}

/// One schema-declared input slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Unique key within the schema
    pub id: String,
    /// Display string for the view layer
    #[serde(default)]
    pub label: String,
    /// Input kind
    #[serde(default)]
    pub widget: Widget,
}

impl Field {
    pub fn new(id: &str, label: &str, widget: Widget) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            widget,
        }
    }
}

/// Extract the field list from a schema response.
///
/// The service answers with either a bare array of field descriptors or an
/// object carrying a `fields` array; any other shape yields an empty schema.
pub fn parse_schema(body: &Value) -> Result<Vec<Field>, serde_json::Error> {
    let fields = match body {
        Value::Array(_) => body.clone(),
        Value::Object(map) => map.get("fields").cloned().unwrap_or(Value::Array(Vec::new())),
        _ => Value::Array(Vec::new()),
    };
    match fields {
        Value::Array(_) => serde_json::from_value(fields),
        _ => Ok(Vec::new()),
    }
}
