use super::QueryParams;
use super::fields::{FieldDescriptor, is_reserved};
use super::order::{ORDER_KEY, OrderValidator};
use super::schema::FilterSchema;
use crate::validation::{ValidationError, ValidationErrors};

pub const LIMIT_KEY: &str = "limit";
pub const OFFSET_KEY: &str = "offset";
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 1000;

/// Full validator for list requests of one entity type: pagination,
/// ordering and filters, with every other key rejected.
///
/// Built once per entity type and shared read-only between requests.
#[derive(Debug, Clone)]
pub struct QuerySchema {
    fields: Vec<FieldDescriptor>,
    filter: FilterSchema,
    order: OrderValidator,
}

impl QuerySchema {
    #[must_use]
    pub fn build(fields: &[FieldDescriptor]) -> Self {
        Self {
            fields: fields.to_vec(),
            filter: FilterSchema::build(fields),
            order: OrderValidator::new(fields.iter().map(|field| field.name)),
        }
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub const fn filter(&self) -> &FilterSchema {
        &self.filter
    }

    #[must_use]
    pub const fn order(&self) -> &OrderValidator {
        &self.order
    }

    /// Validates a raw query string map.
    ///
    /// `limit` and `offset` are optional here; their defaults belong to the
    /// translator.
    ///
    /// # Errors
    ///
    /// Returns all violations at once when any key is unknown, mistyped or
    /// out of bounds.
    pub fn validate(&self, params: &QueryParams) -> Result<QueryParams, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut sanitized = QueryParams::new();

        if let Some(raw) = params.get(LIMIT_KEY) {
            match check_integer(LIMIT_KEY, raw, MIN_LIMIT, Some(MAX_LIMIT)) {
                Ok(limit) => {
                    sanitized.insert(LIMIT_KEY.to_string(), limit.to_string());
                }
                Err(err) => errors.add(err),
            }
        }

        if let Some(raw) = params.get(OFFSET_KEY) {
            match check_integer(OFFSET_KEY, raw, 0, None) {
                Ok(offset) => {
                    sanitized.insert(OFFSET_KEY.to_string(), offset.to_string());
                }
                Err(err) => errors.add(err),
            }
        }

        if let Some(raw) = params.get(ORDER_KEY) {
            match self.order.validate(raw) {
                Ok(order) => {
                    sanitized.insert(ORDER_KEY.to_string(), order);
                }
                Err(err) => errors.add(err),
            }
        }

        let filters = params.iter().filter(|(key, _)| !is_reserved(key));
        let typed = self.filter.check_entries(filters, &mut errors);

        if !errors.is_empty() {
            tracing::debug!(violations = errors.len(), "query validation failed");
            return Err(errors);
        }

        sanitized.extend(typed.into_iter().map(|(key, value)| (key, value.canonical())));
        Ok(sanitized)
    }
}

fn check_integer(key: &str, raw: &str, min: i64, max: Option<i64>) -> Result<i64, ValidationError> {
    let value = raw
        .parse::<i64>()
        .map_err(|_| ValidationError::invalid_type(key, "integer"))?;

    if value < min {
        return Err(ValidationError::out_of_range(
            key,
            format!("must be greater than or equal to {min}"),
        ));
    }
    if let Some(max) = max
        && value > max
    {
        return Err(ValidationError::out_of_range(
            key,
            format!("must be less than or equal to {max}"),
        ));
    }

    Ok(value)
}
