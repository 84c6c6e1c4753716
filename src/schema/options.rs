//! Choice option normalization
//!
//! The choice endpoint answers with a loosely-shaped array: bare strings,
//! objects with some of `label`/`value`/`id`, or anything else. Everything
//! is normalized into a (label, value) pair before the view sees it.

use serde_json::Value;

/// A selectable (label, value) pair for a choice field
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOption {
    /// Display string for the view layer
    pub label: String,
    /// Submitted value; echoes the original entry when none was declared
    pub value: Value,
}

impl ChoiceOption {
    /// String form of the value, as stored in the value map when the
    /// option is selected.
    pub fn value_string(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Normalize one raw choice-list entry at position `index`.
///
/// A bare string is its own label and value. An object falls back through
/// `label`, then `value`, then `id`, then the position for the label, and
/// through `value`, then `id`, then the raw entry itself for the value.
/// Explicit `null`s count as absent.
pub fn normalize_option(raw: &Value, index: usize) -> ChoiceOption {
    match raw {
        Value::String(s) => ChoiceOption {
            label: s.clone(),
            value: Value::String(s.clone()),
        },
        Value::Object(map) => {
            let value_field = map.get("value").filter(|v| !v.is_null());
            let id_field = map.get("id").filter(|v| !v.is_null());
            let value = value_field
                .or(id_field)
                .cloned()
                .unwrap_or_else(|| raw.clone());
            let label = match map.get("label").filter(|v| !v.is_null()) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => display_label(value_field.or(id_field), index),
            };
            ChoiceOption { label, value }
        }
        other => ChoiceOption {
            label: display_label(Some(other), index),
            value: other.clone(),
        },
    }
}

/// Normalize a whole choice response body; anything but an array is empty.
pub fn normalize_options(body: &Value) -> Vec<ChoiceOption> {
    body.as_array()
        .map(|entries| {
            entries
                .iter()
                .enumerate()
                .map(|(i, raw)| normalize_option(raw, i))
                .collect()
        })
        .unwrap_or_default()
}

fn display_label(value: Option<&Value>, index: usize) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => index.to_string(),
    }
}
