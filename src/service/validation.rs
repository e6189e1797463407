//! Request validation against declarative per-field rules.
//!
//! Rules are evaluated on the raw JSON body before it is mapped, so every failing field is
//! reported (keyed by its camelCase wire name) rather than just the first.

use crate::error::{AppError, FieldError, ValidationErrors};
use crate::mapping::end_date;
use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Expected JSON shape of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// `YYYY-MM-DD`.
    Date,
    Integer,
}

#[derive(Clone, Debug)]
pub struct ValidationRule {
    pub kind: FieldKind,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<&'static str>,
    pub minimum: Option<i64>,
}

impl ValidationRule {
    pub fn text() -> Self {
        ValidationRule {
            kind: FieldKind::Text,
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
            minimum: None,
        }
    }

    pub fn date() -> Self {
        ValidationRule {
            kind: FieldKind::Date,
            ..Self::text()
        }
    }

    pub fn integer() -> Self {
        ValidationRule {
            kind: FieldKind::Integer,
            ..Self::text()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, re: &'static str) -> Self {
        self.pattern = Some(re);
        self
    }

    pub fn minimum(mut self, min: i64) -> Self {
        self.minimum = Some(min);
        self
    }
}

/// Rule for one wire field.
#[derive(Clone, Debug)]
pub struct FieldRule {
    pub field: &'static str,
    pub rule: ValidationRule,
}

fn field(field: &'static str, rule: ValidationRule) -> FieldRule {
    FieldRule { field, rule }
}

/// Monikers appear verbatim as a URL path segment.
const MONIKER_PATTERN: &str = r"^[A-Za-z0-9_-]+$";

pub fn camp_rules() -> &'static [FieldRule] {
    static RULES: OnceLock<Vec<FieldRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            field(
                "moniker",
                ValidationRule::text().required().length(3, 20).pattern(MONIKER_PATTERN),
            ),
            field("name", ValidationRule::text().required().length(5, 100)),
            field("description", ValidationRule::text().required().length(25, 4096)),
            field("startDate", ValidationRule::date().required()),
            field("endDate", ValidationRule::date()),
            field("length", ValidationRule::integer().minimum(1)),
            field("locationAddress1", ValidationRule::text().max_length(100)),
            field("locationAddress2", ValidationRule::text().max_length(100)),
            field("locationAddress3", ValidationRule::text().max_length(100)),
            field("locationCityTown", ValidationRule::text().max_length(50)),
            field("locationStateProvince", ValidationRule::text().max_length(50)),
            field("locationPostalCode", ValidationRule::text().max_length(20)),
            field("locationCountry", ValidationRule::text().max_length(50)),
        ]
    })
}

pub fn speaker_rules() -> &'static [FieldRule] {
    static RULES: OnceLock<Vec<FieldRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            field("name", ValidationRule::text().required().length(1, 100)),
            field("bio", ValidationRule::text().max_length(4096)),
            field("companyName", ValidationRule::text().max_length(100)),
            field("phoneNumber", ValidationRule::text().max_length(30)),
            field("websiteUrl", ValidationRule::text().max_length(256)),
            field("twitterName", ValidationRule::text().max_length(50)),
            field("gitHubName", ValidationRule::text().max_length(50)),
            field("headShotUrl", ValidationRule::text().max_length(256)),
        ]
    })
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate body against every rule. Required fields must be present and non-null.
    pub fn validate(body: &Map<String, Value>, rules: &[FieldRule]) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        for FieldRule { field, rule } in rules {
            match body.get(*field) {
                None | Some(Value::Null) if rule.required => {
                    errors.push(FieldError::new(*field, format!("{} is required", field)));
                }
                Some(v) => validate_field(field, v, rule, &mut errors),
                None => {}
            }
        }
        finish(errors)
    }

    /// Validate only the fields present in body (for PATCH). Required is not enforced for
    /// missing fields, but a present required field may not be null.
    pub fn validate_partial(body: &Map<String, Value>, rules: &[FieldRule]) -> Result<(), AppError> {
        let mut errors = ValidationErrors::default();
        for FieldRule { field, rule } in rules {
            match body.get(*field) {
                Some(Value::Null) if rule.required => {
                    errors.push(FieldError::new(*field, format!("{} may not be null", field)));
                }
                Some(v) => validate_field(field, v, rule, &mut errors),
                None => {}
            }
        }
        finish(errors)
    }

    /// The last day of a stored camp must stay a valid `YYYY-MM-DD` date, so that `endDate`
    /// and `length` can always be derived from each other.
    pub fn check_length_span(start: NaiveDate, length: i32) -> Result<(), AppError> {
        if end_date(start, length).is_some() {
            return Ok(());
        }
        let mut errors = ValidationErrors::default();
        errors.push(FieldError::new(
            "length",
            format!("a {} day camp starting {} ends past 9999-12-31", length, start),
        ));
        finish(errors)
    }

    /// An event may not end before it starts.
    pub fn check_date_span(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
        if end < start {
            let mut errors = ValidationErrors::default();
            errors.push(FieldError::new(
                "endDate",
                format!("endDate {} is before startDate {}", end, start),
            ));
            return finish(errors);
        }
        Ok(())
    }
}

fn finish(errors: ValidationErrors) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn validate_field(col: &str, v: &Value, rule: &ValidationRule, errors: &mut ValidationErrors) {
    if v.is_null() {
        return;
    }
    match rule.kind {
        FieldKind::Text => {
            let Some(s) = v.as_str() else {
                errors.push(FieldError::new(col, format!("{} must be a string", col)));
                return;
            };
            let len = s.chars().count();
            if let Some(min) = rule.min_length {
                if len < min {
                    errors.push(FieldError::new(
                        col,
                        format!("{} must be at least {} characters", col, min),
                    ));
                }
            }
            if let Some(max) = rule.max_length {
                if len > max {
                    errors.push(FieldError::new(
                        col,
                        format!("{} must be at most {} characters", col, max),
                    ));
                }
            }
            if let Some(pattern) = rule.pattern {
                match Regex::new(pattern) {
                    Ok(re) if re.is_match(s) => {}
                    Ok(_) => errors.push(FieldError::new(
                        col,
                        format!("{} does not match required pattern", col),
                    )),
                    Err(_) => errors.push(FieldError::new(col, format!("invalid pattern for {}", col))),
                }
            }
        }
        FieldKind::Date => {
            let parsed = v
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
            if parsed.is_none() {
                errors.push(FieldError::new(
                    col,
                    format!("{} must be a date (YYYY-MM-DD)", col),
                ));
            }
        }
        FieldKind::Integer => {
            let Some(n) = v.as_i64().filter(|n| i32::try_from(*n).is_ok()) else {
                errors.push(FieldError::new(col, format!("{} must be an integer", col)));
                return;
            };
            if let Some(min) = rule.minimum {
                if n < min {
                    errors.push(FieldError::new(col, format!("{} must be at least {}", col, min)));
                }
            }
        }
    }
}
