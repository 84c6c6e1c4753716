//! Submission payload construction

use crate::schema::{Field, Widget};
use crate::validate::is_integer_literal;
use serde_json::Value;
use std::collections::HashMap;

/// Build the JSON object POSTed to the save endpoint.
///
/// Fields are emitted in schema order. Integer-widget values are coerced to
/// JSON numbers only when their stored string already passes the integer
/// check; anything else passes through unchanged, so a value that slipped
/// past validation still round-trips without being mangled.
pub fn build_payload(schema: &[Field], values: &HashMap<String, String>) -> Value {
    let mut payload = serde_json::Map::new();
    for field in schema {
        let raw = values.get(&field.id).cloned().unwrap_or_default();
        let value = match field.widget {
            Widget::Integer if is_integer_literal(&raw) => match raw.parse::<i64>() {
                Ok(n) => Value::from(n),
                // out of i64 range, keep the digits as-is
                Err(_) => Value::String(raw),
            },
            _ => Value::String(raw),
        };
        payload.insert(field.id.clone(), value);
    }
    Value::Object(payload)
}
