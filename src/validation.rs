//! Validation Support
//!
//! Field-level violations shared by the query validators in
//! [`crate::filtering`] and the JSON body schemas used by the write
//! endpoints. Validators never stop at the first problem: every violation is
//! collected into a [`ValidationErrors`] so a client can fix a request in one
//! round trip.
//!
//! # Example
//!
//! ```rust
//! use harborcrate::validation::{BodyField, BodyMode, BodyRule, BodySchema};
//! use serde_json::json;
//!
//! static TAG: BodySchema = BodySchema::new(&[
//!     BodyField::new("label", BodyRule::Text { min: 2, max: 10 }),
//!     BodyField::new("weight", BodyRule::Integer { min: 0, max: 500 }),
//! ]);
//!
//! let clean = TAG.validate(&json!({"label": "crane", "weight": "40"}), BodyMode::Full).unwrap();
//! assert_eq!(clean["weight"], 40);
//!
//! let errors = TAG.validate(&json!({"label": "x"}), BodyMode::Full).unwrap_err();
//! assert_eq!(errors.len(), 2);
//! ```

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

use crate::errors::ApiError;
use crate::filtering::schema::{is_decimal_literal, parse_date};

/// Class of a single validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Key or value outside the allowed set.
    NotAllowed,
    InvalidType,
    OutOfRange,
    InvalidFormat,
    /// `<field>_min` greater than `<field>_max`.
    InvertedRange,
    Missing,
}

/// Validation error with field name and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// The field (or query key) that failed validation
    pub field: String,
    pub kind: ViolationKind,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_allowed(field: impl Into<String>) -> Self {
        Self::new(field, ViolationKind::NotAllowed, "is not allowed")
    }

    /// A recognised key carrying a value outside its allowed set.
    #[must_use]
    pub fn not_allowed_value(field: impl Into<String>, value: &str) -> Self {
        Self::new(
            field,
            ViolationKind::NotAllowed,
            format!("value '{value}' is not allowed"),
        )
    }

    #[must_use]
    pub fn invalid_type(field: impl Into<String>, expected: &str) -> Self {
        Self::new(field, ViolationKind::InvalidType, format!("must be a {expected}"))
    }

    #[must_use]
    pub fn invalid_format(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, ViolationKind::InvalidFormat, message)
    }

    #[must_use]
    pub fn out_of_range(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, ViolationKind::OutOfRange, message)
    }

    /// Reported against `<base>_min`.
    #[must_use]
    pub fn inverted_range(base: &str) -> Self {
        Self::new(
            format!("{base}_min"),
            ViolationKind::InvertedRange,
            format!("must be less than or equal to {base}_max"),
        )
    }

    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, ViolationKind::Missing, "is required")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new empty validation errors collection
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Convert to Result
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Default for ValidationErrors {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self { errors: vec![error] }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Parses a path identifier: a positive integer written in canonical form.
///
/// `"7"` passes; `"0"`, `"-1"`, `"07"`, `"7.0"`, `"+7"` and `"abc"` do not.
///
/// # Errors
///
/// Returns a 400 `ApiError` with the message "Invalid identifier".
pub fn validate_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0 && id.to_string() == raw)
        .ok_or_else(|| ApiError::bad_request("Invalid identifier"))
}

/// Rule applied to one JSON body field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRule {
    /// String with a character count in `min..=max`.
    Text { min: usize, max: usize },
    /// Whole number, JSON or numeric string.
    Integer { min: i64, max: i64 },
    /// Decimal number, JSON or numeric string.
    Number { min: Option<Decimal>, max: Option<Decimal> },
    /// JSON boolean or `"true"` / `"false"`.
    Boolean,
    /// `YYYY-MM-DD` or RFC 3339 string.
    Date,
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct BodyField {
    pub name: &'static str,
    pub rule: BodyRule,
}

impl BodyField {
    #[must_use]
    pub const fn new(name: &'static str, rule: BodyRule) -> Self {
        Self { name, rule }
    }
}

/// Which fields a body must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Every field required (create, full replace).
    Full,
    /// Every field optional, at least one present (partial update).
    Partial,
}

/// Closed schema for a JSON object body.
///
/// Keys outside the schema are dropped. Accepted values are rewritten into
/// one canonical JSON form per rule so the typed models can deserialize them
/// directly.
#[derive(Debug)]
pub struct BodySchema {
    fields: &'static [BodyField],
}

impl BodySchema {
    #[must_use]
    pub const fn new(fields: &'static [BodyField]) -> Self {
        Self { fields }
    }

    #[must_use]
    pub const fn fields(&self) -> &'static [BodyField] {
        self.fields
    }

    /// # Errors
    ///
    /// Returns every violation found in the body.
    pub fn validate(&self, body: &Value, mode: BodyMode) -> Result<Map<String, Value>, ValidationErrors> {
        let Some(object) = body.as_object() else {
            return Err(ValidationError::invalid_type("body", "JSON object").into());
        };

        let mut errors = ValidationErrors::new();
        let mut clean = Map::new();

        for field in self.fields {
            match object.get(field.name) {
                Some(value) => match check_rule(field.name, field.rule, value) {
                    Ok(value) => {
                        clean.insert(field.name.to_string(), value);
                    }
                    Err(err) => errors.add(err),
                },
                None if mode == BodyMode::Full => errors.add(ValidationError::missing(field.name)),
                None => {}
            }
        }

        let stripped = object.keys().filter(|key| !self.knows(key)).count();
        if stripped > 0 {
            tracing::debug!(stripped, "dropped unknown body keys");
        }

        if mode == BodyMode::Partial && errors.is_empty() && clean.is_empty() {
            let names: Vec<&str> = self.fields.iter().map(|field| field.name).collect();
            errors.add(ValidationError::new(
                "body",
                ViolationKind::Missing,
                format!("must contain at least one of [{}]", names.join(", ")),
            ));
        }

        errors.result()?;
        Ok(clean)
    }

    fn knows(&self, key: &str) -> bool {
        self.fields.iter().any(|field| field.name == key)
    }
}

fn check_rule(name: &str, rule: BodyRule, value: &Value) -> Result<Value, ValidationError> {
    match rule {
        BodyRule::Text { min, max } => {
            let text = value.as_str().ok_or_else(|| ValidationError::invalid_type(name, "string"))?;
            validators::validate_length(name, text, Some(min), Some(max))?;
            Ok(Value::String(text.to_string()))
        }
        BodyRule::Integer { min, max } => {
            let number = integer_value(value).ok_or_else(|| ValidationError::invalid_type(name, "integer"))?;
            validators::validate_range(name, number, Some(min), Some(max))?;
            Ok(Value::Number(Number::from(number)))
        }
        BodyRule::Number { min, max } => {
            let number = decimal_value(value).ok_or_else(|| ValidationError::invalid_type(name, "number"))?;
            validators::validate_range(name, number, min, max)?;
            Ok(Value::String(number.normalize().to_string()))
        }
        BodyRule::Boolean => match value {
            Value::Bool(flag) => Ok(Value::Bool(*flag)),
            Value::String(text) if text.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(text) if text.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            _ => Err(ValidationError::invalid_type(name, "boolean")),
        },
        BodyRule::Date => value
            .as_str()
            .and_then(parse_date)
            .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| ValidationError::invalid_type(name, "valid date")),
        BodyRule::OneOf(allowed) => {
            let text = value.as_str().ok_or_else(|| ValidationError::invalid_type(name, "string"))?;
            if allowed.contains(&text) {
                Ok(Value::String(text.to_string()))
            } else {
                Err(ValidationError::new(
                    name,
                    ViolationKind::NotAllowed,
                    format!("must be one of [{}]", allowed.join(", ")),
                ))
            }
        }
    }
}

fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.fract() == 0.0)
                .and_then(|float| Decimal::from_str(&float.to_string()).ok())
                .and_then(|decimal| decimal.to_i64())
        }),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
}

fn decimal_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => {
            let text = number.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(text) if is_decimal_literal(text) => Decimal::from_str(text).ok(),
        _ => None,
    }
}

/// Helper validators for common patterns
pub mod validators {
    use super::ValidationError;
    use std::fmt;

    /// Validate string length (in characters) is within range
    ///
    /// # Errors
    ///
    /// `OutOfRange` when the length falls outside the bounds.
    pub fn validate_length(
        field: &str,
        value: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Result<(), ValidationError> {
        let len = value.chars().count();

        if let Some(min_len) = min
            && len < min_len
        {
            return Err(ValidationError::out_of_range(
                field,
                format!("must be at least {min_len} characters"),
            ));
        }

        if let Some(max_len) = max
            && len > max_len
        {
            return Err(ValidationError::out_of_range(
                field,
                format!("must be at most {max_len} characters"),
            ));
        }

        Ok(())
    }

    /// Validate number is within range
    ///
    /// # Errors
    ///
    /// `OutOfRange` when the value falls outside the bounds.
    pub fn validate_range<T: PartialOrd + fmt::Display>(
        field: &str,
        value: T,
        min: Option<T>,
        max: Option<T>,
    ) -> Result<(), ValidationError> {
        if let Some(min_val) = min
            && value < min_val
        {
            return Err(ValidationError::out_of_range(
                field,
                format!("must be greater than or equal to {min_val}"),
            ));
        }

        if let Some(max_val) = max
            && value > max_val
        {
            return Err(ValidationError::out_of_range(
                field,
                format!("must be less than or equal to {max_val}"),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static CRANE: BodySchema = BodySchema::new(&[
        BodyField::new("label", BodyRule::Text { min: 2, max: 5 }),
        BodyField::new("lift_t", BodyRule::Integer { min: 0, max: 1000 }),
        BodyField::new(
            "reach_m",
            BodyRule::Number {
                min: Some(Decimal::ZERO),
                max: Some(Decimal::from_parts(9999, 0, 0, false, 2)),
            },
        ),
        BodyField::new("mobile", BodyRule::Boolean),
        BodyField::new("installed", BodyRule::Date),
        BodyField::new("kind", BodyRule::OneOf(&["gantry", "jib"])),
    ]);

    fn full_body() -> Value {
        json!({
            "label": "C1",
            "lift_t": 40,
            "reach_m": 12.5,
            "mobile": true,
            "installed": "2010-05-01",
            "kind": "jib"
        })
    }

    #[test]
    fn test_validation_errors_collection() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add(ValidationError::not_allowed("foo"));
        errors.add(ValidationError::missing("nombre"));
        assert_eq!(errors.len(), 2);
        assert!(errors.result().is_err());
        assert!(ValidationErrors::new().result().is_ok());
    }

    #[test]
    fn test_inverted_range_names_min_key() {
        let err = ValidationError::inverted_range("calado_m");
        assert_eq!(err.field, "calado_m_min");
        assert_eq!(err.kind, ViolationKind::InvertedRange);
    }

    #[test]
    fn test_errors_serialize_as_list() {
        let errors = ValidationErrors::from(ValidationError::not_allowed("foo"));
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            value,
            json!([{"field": "foo", "kind": "not_allowed", "message": "is not allowed"}])
        );
    }

    #[test]
    fn test_validate_id() {
        assert_eq!(validate_id("7").unwrap(), 7);
        assert_eq!(validate_id("2147483647").unwrap(), i32::MAX);
        for raw in ["0", "-1", "07", "7.0", "+7", "abc", "", " 7", "2147483648"] {
            assert!(validate_id(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_full_body_is_canonicalized() {
        let clean = CRANE
            .validate(
                &json!({
                    "label": "C1",
                    "lift_t": "40",
                    "reach_m": "12.50",
                    "mobile": "TRUE",
                    "installed": "2010-05-01T08:00:00Z",
                    "kind": "jib"
                }),
                BodyMode::Full,
            )
            .unwrap();

        assert_eq!(clean["lift_t"], json!(40));
        assert_eq!(clean["reach_m"], json!("12.5"));
        assert_eq!(clean["mobile"], json!(true));
        assert_eq!(clean["installed"], json!("2010-05-01"));
    }

    #[test]
    fn test_unknown_keys_are_stripped() {
        let mut body = full_body();
        body["secret"] = json!("x");
        let clean = CRANE.validate(&body, BodyMode::Full).unwrap();
        assert!(!clean.contains_key("secret"));
        assert_eq!(clean.len(), 6);
    }

    #[test]
    fn test_full_mode_requires_every_field() {
        let errors = CRANE.validate(&json!({"label": "C1"}), BodyMode::Full).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.errors().iter().all(|e| e.kind == ViolationKind::Missing));
    }

    #[test]
    fn test_partial_mode() {
        let clean = CRANE.validate(&json!({"mobile": false}), BodyMode::Partial).unwrap();
        assert_eq!(clean.len(), 1);

        let errors = CRANE.validate(&json!({}), BodyMode::Partial).unwrap_err();
        assert_eq!(errors.errors()[0].field, "body");

        let errors = CRANE.validate(&json!({"other": 1}), BodyMode::Partial).unwrap_err();
        assert_eq!(errors.errors()[0].kind, ViolationKind::Missing);
    }

    #[test]
    fn test_rule_violations_are_aggregated() {
        let errors = CRANE
            .validate(
                &json!({
                    "label": "C",
                    "lift_t": -1,
                    "reach_m": 100.0,
                    "mobile": "yes",
                    "installed": "soon",
                    "kind": "tower"
                }),
                BodyMode::Full,
            )
            .unwrap_err();
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn test_type_mismatches() {
        assert!(CRANE.validate(&json!({"label": 12}), BodyMode::Partial).is_err());
        assert!(CRANE.validate(&json!({"lift_t": 1.5}), BodyMode::Partial).is_err());
        assert!(CRANE.validate(&json!({"lift_t": null}), BodyMode::Partial).is_err());
        assert!(CRANE.validate(&json!({"reach_m": "deep"}), BodyMode::Partial).is_err());
        assert!(CRANE.validate(&json!({"reach_m": "1_2.5"}), BodyMode::Partial).is_err());
        assert!(CRANE.validate(&json!({"reach_m": "12.5"}), BodyMode::Partial).is_ok());
        assert!(CRANE.validate(&json!([1, 2]), BodyMode::Partial).is_err());
    }

    #[test]
    fn test_text_length_counts_characters() {
        assert!(CRANE.validate(&json!({"label": "Cádiz"}), BodyMode::Partial).is_ok());
        assert!(CRANE.validate(&json!({"label": "Cádizz"}), BodyMode::Partial).is_err());
    }

    #[test]
    fn test_validate_range() {
        use validators::validate_range;

        assert!(validate_range("lift_t", 5, Some(10), None).is_err());
        assert!(validate_range("lift_t", 150, None, Some(120)).is_err());
        assert!(validate_range("lift_t", 25, Some(0), Some(120)).is_ok());
    }
}
