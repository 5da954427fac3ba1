use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

// ASCII digits only; `\d` would also admit other Unicode digits.
static NUMERIC_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[0-9]+(?:\.[0-9]+)?$").expect("numeric literal pattern is valid")
});

/// Best-guess primitive behind a raw query-string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Decimal(Decimal),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Converts a raw string into a boolean, a number or leaves it as text.
///
/// Only the exact literals `true` / `false` become booleans, and only plain
/// signed decimal literals (`-12`, `3.50`) become numbers. Everything else,
/// including `NaN`, `Infinity` and exponent notation, stays text. Never fails.
#[must_use]
pub fn coerce(raw: &str) -> Scalar {
    match raw {
        "true" => return Scalar::Bool(true),
        "false" => return Scalar::Bool(false),
        _ => {}
    }

    if !NUMERIC_LITERAL.is_match(raw) {
        return Scalar::Text(raw.to_string());
    }

    if !raw.contains('.')
        && let Ok(integer) = raw.parse::<i64>()
    {
        return Scalar::Integer(integer);
    }

    Decimal::from_str(raw).map_or_else(|_| Scalar::Text(raw.to_string()), Scalar::Decimal)
}
