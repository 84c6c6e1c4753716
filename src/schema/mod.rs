//! Form schema module

mod field;
mod options;

pub use field::{parse_schema, Field, Widget};
pub use options::{normalize_option, normalize_options, ChoiceOption};
