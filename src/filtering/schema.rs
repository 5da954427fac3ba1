use chrono::{DateTime, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

use super::QueryParams;
use super::fields::{FieldDescriptor, FieldKind, MAX_SUFFIX, MIN_SUFFIX};
use crate::validation::{ValidationError, ValidationErrors};

const DATE_FORMAT: &str = "%Y-%m-%d";

// `Decimal::from_str` also takes `_` separators.
static DECIMAL_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?[0-9]+(?:\.[0-9]+)?$").expect("decimal literal pattern is valid")
});

/// Plain ASCII decimal text: optional sign, digits, optional fraction.
#[must_use]
pub fn is_decimal_literal(raw: &str) -> bool {
    DECIMAL_LITERAL.is_match(raw)
}

/// Accepted primitive for one schema key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRule {
    Integer,
    Number,
    Boolean,
    Date,
    Text,
}

impl ValueRule {
    #[must_use]
    pub const fn for_kind(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Integer => Self::Integer,
            FieldKind::Decimal => Self::Number,
            FieldKind::Boolean => Self::Boolean,
            FieldKind::Date => Self::Date,
            FieldKind::Text => Self::Text,
        }
    }

    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "valid date",
            Self::Text => "non-empty string",
        }
    }

    /// Parses `raw` under this rule, or returns `None` on a type mismatch.
    #[must_use]
    pub fn parse(self, raw: &str) -> Option<Typed> {
        match self {
            Self::Integer => raw.parse::<i64>().ok().map(Typed::Integer),
            Self::Number => is_decimal_literal(raw)
                .then(|| Decimal::from_str(raw).ok())
                .flatten()
                .map(Typed::Number),
            Self::Boolean => {
                if raw.eq_ignore_ascii_case("true") {
                    Some(Typed::Boolean(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Some(Typed::Boolean(false))
                } else {
                    None
                }
            }
            Self::Date => parse_date(raw).map(Typed::Date),
            Self::Text => (!raw.is_empty()).then(|| Typed::Text(raw.to_string())),
        }
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its calendar date is kept).
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive()))
}

/// A value that passed its rule, kept in its typed form for range checks.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum Typed {
    Integer(i64),
    Number(Decimal),
    Boolean(bool),
    Date(NaiveDate),
    Text(String),
}

impl Typed {
    /// Normalized text handed on to the translator.
    #[must_use]
    pub fn canonical(&self) -> String {
        match self {
            Self::Integer(value) => value.to_string(),
            Self::Number(value) => value.normalize().to_string(),
            Self::Boolean(value) => value.to_string(),
            Self::Date(value) => value.format(DATE_FORMAT).to_string(),
            Self::Text(value) => value.clone(),
        }
    }
}

/// Closed-world validator for the filter keys of one entity type.
///
/// Every declared field accepts its own key; integer, decimal and date fields
/// additionally accept `<field>_min` and `<field>_max`. Any other key, the
/// pagination and ordering keys included, is rejected.
#[derive(Debug, Clone)]
pub struct FilterSchema {
    rules: BTreeMap<String, ValueRule>,
    ranged: Vec<&'static str>,
}

impl FilterSchema {
    #[must_use]
    pub fn build(fields: &[FieldDescriptor]) -> Self {
        let mut rules = BTreeMap::new();
        let mut ranged = Vec::new();

        for field in fields {
            let rule = ValueRule::for_kind(field.kind);
            rules.insert(field.name.to_string(), rule);

            if field.kind.is_ranged() {
                rules.insert(format!("{}{MIN_SUFFIX}", field.name), rule);
                rules.insert(format!("{}{MAX_SUFFIX}", field.name), rule);
                ranged.push(field.name);
            }
        }

        Self { rules, ranged }
    }

    #[must_use]
    pub fn rule(&self, key: &str) -> Option<ValueRule> {
        self.rules.get(key).copied()
    }

    /// All accepted keys with their rules, in key order.
    pub fn keys(&self) -> impl Iterator<Item = (&str, ValueRule)> {
        self.rules.iter().map(|(key, rule)| (key.as_str(), *rule))
    }

    /// Validates a filter-only parameter set.
    ///
    /// # Errors
    ///
    /// Returns every violation found: unknown keys, type mismatches and
    /// inverted `_min`/`_max` pairs.
    pub fn validate(&self, params: &QueryParams) -> Result<QueryParams, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let typed = self.check_entries(params.iter(), &mut errors);
        errors.result()?;

        Ok(typed
            .into_iter()
            .map(|(key, value)| (key, value.canonical()))
            .collect())
    }

    /// Checks each entry and then range coherence, recording violations in
    /// `errors` and returning the entries that passed.
    pub(crate) fn check_entries<'a>(
        &self,
        entries: impl Iterator<Item = (&'a String, &'a String)>,
        errors: &mut ValidationErrors,
    ) -> BTreeMap<String, Typed> {
        let mut typed = BTreeMap::new();

        for (key, raw) in entries {
            let Some(rule) = self.rule(key) else {
                errors.add(ValidationError::not_allowed(key));
                continue;
            };

            match rule.parse(raw) {
                Some(value) => {
                    typed.insert(key.clone(), value);
                }
                None => errors.add(ValidationError::invalid_type(key, rule.type_name())),
            }
        }

        for base in &self.ranged {
            let min_key = format!("{base}{MIN_SUFFIX}");
            let max_key = format!("{base}{MAX_SUFFIX}");
            if let (Some(min), Some(max)) = (typed.get(&min_key), typed.get(&max_key))
                && min > max
            {
                errors.add(ValidationError::inverted_range(base));
            }
        }

        typed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ViolationKind;

    fn port_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("id_puerto", FieldKind::Integer),
            FieldDescriptor::new("nombre", FieldKind::Text),
            FieldDescriptor::new("capacidad_teu", FieldKind::Integer),
            FieldDescriptor::new("activo", FieldKind::Boolean),
            FieldDescriptor::new("fecha_inauguracion", FieldKind::Date),
            FieldDescriptor::new("profundidad_media", FieldKind::Decimal),
        ]
    }

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_build_derives_range_keys_for_ordered_kinds() {
        let schema = FilterSchema::build(&port_fields());

        assert_eq!(schema.rule("capacidad_teu_min"), Some(ValueRule::Integer));
        assert_eq!(schema.rule("profundidad_media_max"), Some(ValueRule::Number));
        assert_eq!(schema.rule("fecha_inauguracion_min"), Some(ValueRule::Date));
        assert_eq!(schema.rule("activo_min"), None);
        assert_eq!(schema.rule("nombre_max"), None);
    }

    #[test]
    fn test_range_keys_rejected_for_boolean_and_text() {
        let schema = FilterSchema::build(&port_fields());

        for key in ["activo_min", "activo_max", "nombre_min", "nombre_max"] {
            let errors = schema.validate(&params(&[(key, "1")])).unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.errors()[0].kind, ViolationKind::NotAllowed, "{key}");
        }
    }

    #[test]
    fn test_reserved_keys_are_unknown_to_filter_schema() {
        let schema = FilterSchema::build(&port_fields());
        let errors = schema
            .validate(&params(&[("limit", "10"), ("offset", "0"), ("order", "nombre:asc")]))
            .unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_type_mismatches() {
        let schema = FilterSchema::build(&port_fields());

        assert!(schema.validate(&params(&[("capacidad_teu", "abc")])).is_err());
        assert!(schema.validate(&params(&[("capacidad_teu", "1.5")])).is_err());
        assert!(schema.validate(&params(&[("profundidad_media", "deep")])).is_err());
        assert!(schema.validate(&params(&[("profundidad_media", "1_4.5")])).is_err());
        assert!(schema.validate(&params(&[("activo", "yes")])).is_err());
        assert!(schema.validate(&params(&[("fecha_inauguracion", "yesterday")])).is_err());
        assert!(schema.validate(&params(&[("nombre", "")])).is_err());
    }

    #[test]
    fn test_valid_values_are_normalized() {
        let schema = FilterSchema::build(&port_fields());
        let sanitized = schema
            .validate(&params(&[
                ("capacidad_teu", "+500"),
                ("activo", "TRUE"),
                ("profundidad_media_min", "12.50"),
                ("fecha_inauguracion_max", "2001-02-03T10:00:00Z"),
                ("nombre", "Valencia"),
            ]))
            .unwrap();

        assert_eq!(sanitized["capacidad_teu"], "500");
        assert_eq!(sanitized["activo"], "true");
        assert_eq!(sanitized["profundidad_media_min"], "12.5");
        assert_eq!(sanitized["fecha_inauguracion_max"], "2001-02-03");
        assert_eq!(sanitized["nombre"], "Valencia");
    }

    #[test]
    fn test_number_rule_takes_plain_decimals_only() {
        for raw in ["14.5", "+14.5", "-3", "0.25", "1000"] {
            assert!(ValueRule::Number.parse(raw).is_some(), "{raw}");
        }
        for raw in ["1_4.5", "1_000", ".5", "5.", "1e3", " 1", "NaN", ""] {
            assert_eq!(ValueRule::Number.parse(raw), None, "{raw}");
        }
    }

    #[test]
    fn test_inverted_range_rejected() {
        let schema = FilterSchema::build(&port_fields());

        let errors = schema
            .validate(&params(&[("capacidad_teu_min", "100"), ("capacidad_teu_max", "10")]))
            .unwrap_err();
        assert_eq!(errors.errors()[0].kind, ViolationKind::InvertedRange);

        assert!(
            schema
                .validate(&params(&[("capacidad_teu_min", "10"), ("capacidad_teu_max", "100")]))
                .is_ok()
        );
        assert!(
            schema
                .validate(&params(&[("capacidad_teu_min", "10"), ("capacidad_teu_max", "10")]))
                .is_ok()
        );
    }

    #[test]
    fn test_inverted_date_and_decimal_ranges() {
        let schema = FilterSchema::build(&port_fields());

        assert!(
            schema
                .validate(&params(&[
                    ("fecha_inauguracion_min", "2020-01-01"),
                    ("fecha_inauguracion_max", "1999-12-31"),
                ]))
                .is_err()
        );
        // 9.5 < 10.25 numerically even though "9.5" > "10.25" as text
        assert!(
            schema
                .validate(&params(&[("profundidad_media_min", "9.5"), ("profundidad_media_max", "10.25")]))
                .is_ok()
        );
    }

    #[test]
    fn test_errors_are_aggregated() {
        let schema = FilterSchema::build(&port_fields());
        let errors = schema
            .validate(&params(&[
                ("foo", "bar"),
                ("capacidad_teu", "abc"),
                ("activo", "maybe"),
                ("profundidad_media_min", "20"),
                ("profundidad_media_max", "10"),
            ]))
            .unwrap_err();

        assert_eq!(errors.len(), 4);
        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"foo"));
        assert!(fields.contains(&"capacidad_teu"));
        assert!(fields.contains(&"activo"));
        assert!(fields.contains(&"profundidad_media_min"));
    }

    #[test]
    fn test_empty_params_pass() {
        let schema = FilterSchema::build(&port_fields());
        assert!(schema.validate(&QueryParams::new()).unwrap().is_empty());
    }
}
