//! Pure validation over schema and current values
//!
//! Validation is all-or-nothing: the submit action is a single gate, so the
//! form-level predicate short-circuits on the first failing field. The view
//! layer uses the per-field predicate for its own error messaging.

use crate::schema::{Field, Widget};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

static INTEGER_RE: OnceLock<Regex> = OnceLock::new();

fn integer_re() -> &'static Regex {
    INTEGER_RE.get_or_init(|| Regex::new(r"^-?\d+$").expect("integer pattern"))
}

/// Whether a raw value is a well-formed integer literal: an optional
/// leading minus followed by one or more decimal digits.
pub fn is_integer_literal(value: &str) -> bool {
    integer_re().is_match(value)
}

/// Whether one field's current value passes its widget's rule.
pub fn field_is_valid(field: &Field, values: &HashMap<String, String>) -> bool {
    let Some(value) = values.get(&field.id) else {
        return false;
    };
    if value.is_empty() {
        return false;
    }
    if field.widget == Widget::Integer && !is_integer_literal(value) {
        return false;
    }
    true
}

/// Whether the whole form is submittable. An empty schema is never valid.
pub fn form_is_valid(schema: &[Field], values: &HashMap<String, String>) -> bool {
    !schema.is_empty() && schema.iter().all(|field| field_is_valid(field, values))
}
