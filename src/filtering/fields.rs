use std::fmt;

/// Query keys handled by pagination and ordering, never treated as filters.
pub const RESERVED_KEYS: [&str; 3] = ["limit", "offset", "order"];

pub const MIN_SUFFIX: &str = "_min";
pub const MAX_SUFFIX: &str = "_max";

/// Semantic type of an entity attribute, as seen by the query layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Integer,
    Decimal,
    Boolean,
    Date,
    Text,
}

impl FieldKind {
    /// Whether `<field>_min` / `<field>_max` keys exist for this kind.
    #[must_use]
    pub const fn is_ranged(self) -> bool {
        matches!(self, Self::Integer | Self::Decimal | Self::Date)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Decimal => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Text => "string",
        };
        f.write_str(name)
    }
}

/// Name and kind of one filterable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

#[must_use]
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Splits `capacidad_teu_min` into `("capacidad_teu", Bound::Min)`.
#[must_use]
pub fn split_range_key(key: &str) -> Option<(&str, Bound)> {
    key.strip_suffix(MIN_SUFFIX)
        .map(|base| (base, Bound::Min))
        .or_else(|| key.strip_suffix(MAX_SUFFIX).map(|base| (base, Bound::Max)))
        .filter(|(base, _)| !base.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

/// Looks up a descriptor by field name.
#[must_use]
pub fn find_field<'a>(fields: &'a [FieldDescriptor], name: &str) -> Option<&'a FieldDescriptor> {
    fields.iter().find(|field| field.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranged_kinds() {
        assert!(FieldKind::Integer.is_ranged());
        assert!(FieldKind::Decimal.is_ranged());
        assert!(FieldKind::Date.is_ranged());
        assert!(!FieldKind::Boolean.is_ranged());
        assert!(!FieldKind::Text.is_ranged());
    }

    #[test]
    fn test_split_range_key() {
        assert_eq!(split_range_key("longitud_m_min"), Some(("longitud_m", Bound::Min)));
        assert_eq!(split_range_key("calado_m_max"), Some(("calado_m", Bound::Max)));
        assert_eq!(split_range_key("nombre"), None);
        assert_eq!(split_range_key("_min"), None);
    }

    #[test]
    fn test_reserved_keys() {
        assert!(is_reserved("limit"));
        assert!(is_reserved("offset"));
        assert!(is_reserved("order"));
        assert!(!is_reserved("nombre"));
    }
}
