//! Request validation for camp and speaker bodies.

mod validation;
pub use validation::{camp_rules, speaker_rules, FieldKind, FieldRule, RequestValidator, ValidationRule};
