use regex::Regex;
use std::sync::LazyLock;

use crate::validation::ValidationError;

pub const ORDER_KEY: &str = "order";

// Direction is matched without Unicode case folding so only ASCII casings pass.
static ORDER_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_]+:(?i-u:asc|desc)$").expect("order directive pattern is valid")
});

/// Validates `field:direction` sort directives against an allowed field set.
#[derive(Debug, Clone)]
pub struct OrderValidator {
    allowed: Vec<&'static str>,
}

impl OrderValidator {
    #[must_use]
    pub fn new(allowed: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn allowed(&self) -> &[&'static str] {
        &self.allowed
    }

    /// Returns the directive unchanged when it is well formed and names an
    /// allowed field.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` for anything not shaped like `field:asc|desc`,
    /// `NotAllowed` when the field is outside the allowed set.
    pub fn validate(&self, raw: &str) -> Result<String, ValidationError> {
        if !ORDER_DIRECTIVE.is_match(raw) {
            return Err(ValidationError::invalid_format(
                ORDER_KEY,
                "must match the pattern <field>:asc|desc",
            ));
        }

        let field = raw.split(':').next().unwrap_or_default();
        if !self.allowed.contains(&field) {
            return Err(ValidationError::not_allowed_value(ORDER_KEY, field));
        }

        Ok(raw.to_string())
    }
}
