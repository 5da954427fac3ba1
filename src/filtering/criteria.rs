use std::collections::BTreeMap;

use super::QueryParams;
use super::coerce::{Scalar, coerce};
use super::fields::{Bound, FieldDescriptor, find_field, is_reserved, split_range_key};
use super::order::ORDER_KEY;
use super::query::{LIMIT_KEY, MAX_LIMIT, OFFSET_KEY};

pub const DEFAULT_LIMIT: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Inclusive bounds on one field. Both set means BETWEEN.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeBounds {
    pub gte: Option<Scalar>,
    pub lte: Option<Scalar>,
}

/// Storage-ready form of a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCriteria {
    pub equals: BTreeMap<String, Scalar>,
    pub ranges: BTreeMap<String, RangeBounds>,
    pub order: Option<SortSpec>,
    pub limit: u64,
    pub offset: u64,
}

impl Default for QueryCriteria {
    fn default() -> Self {
        Self {
            equals: BTreeMap::new(),
            ranges: BTreeMap::new(),
            order: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Translates query parameters into [`QueryCriteria`].
///
/// Normally fed the output of [`QuerySchema::validate`](super::QuerySchema::validate),
/// but it never fails on its own: unparseable `limit`/`offset` fall back to
/// their defaults and keys naming no declared field are ignored.
#[must_use]
pub fn translate(params: &QueryParams, fields: &[FieldDescriptor]) -> QueryCriteria {
    let mut criteria = QueryCriteria {
        limit: parse_limit(params.get(LIMIT_KEY)),
        offset: parse_offset(params.get(OFFSET_KEY)),
        order: params.get(ORDER_KEY).and_then(|raw| parse_order(raw, fields)),
        ..QueryCriteria::default()
    };

    for (key, raw) in params {
        if is_reserved(key) {
            continue;
        }

        if let Some((base, bound)) = split_range_key(key) {
            if find_field(fields, base).is_some() {
                let range = criteria.ranges.entry(base.to_string()).or_default();
                match bound {
                    Bound::Min => range.gte = Some(coerce(raw)),
                    Bound::Max => range.lte = Some(coerce(raw)),
                }
            }
            continue;
        }

        if find_field(fields, key).is_some() {
            criteria.equals.insert(key.clone(), coerce(raw));
        }
    }

    criteria
}

fn parse_limit(raw: Option<&String>) -> u64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|limit| *limit >= 1)
        .map_or(DEFAULT_LIMIT, |limit| limit.min(MAX_LIMIT).unsigned_abs())
}

fn parse_offset(raw: Option<&String>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok()).unwrap_or(0)
}

fn parse_order(raw: &str, fields: &[FieldDescriptor]) -> Option<SortSpec> {
    let (field, direction) = raw.split_once(':').unwrap_or((raw, ""));
    find_field(fields, field)?;

    let direction = if direction.eq_ignore_ascii_case("desc") {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };

    Some(SortSpec {
        field: field.to_string(),
        direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::fields::FieldKind;
    use crate::filtering::query::QuerySchema;
    use rust_decimal::Decimal;

    fn dock_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("nombre", FieldKind::Text),
            FieldDescriptor::new("longitud_m", FieldKind::Decimal),
            FieldDescriptor::new("operativo", FieldKind::Boolean),
            FieldDescriptor::new("id_puerto", FieldKind::Integer),
        ]
    }

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let criteria = translate(&QueryParams::new(), &dock_fields());
        assert_eq!(criteria, QueryCriteria::default());
        assert_eq!(criteria.limit, 100);
        assert_eq!(criteria.offset, 0);
    }

    #[test]
    fn test_limit_is_capped_and_falls_back() {
        let fields = dock_fields();
        assert_eq!(translate(&params(&[("limit", "50")]), &fields).limit, 50);
        assert_eq!(translate(&params(&[("limit", "5000")]), &fields).limit, 1000);
        assert_eq!(translate(&params(&[("limit", "lots")]), &fields).limit, 100);
        assert_eq!(translate(&params(&[("limit", "-3")]), &fields).limit, 100);
        assert_eq!(translate(&params(&[("limit", "0")]), &fields).limit, 100);
    }

    #[test]
    fn test_offset_falls_back() {
        let fields = dock_fields();
        assert_eq!(translate(&params(&[("offset", "20")]), &fields).offset, 20);
        assert_eq!(translate(&params(&[("offset", "-1")]), &fields).offset, 0);
        assert_eq!(translate(&params(&[("offset", "later")]), &fields).offset, 0);
    }

    #[test]
    fn test_order_direction_normalized() {
        let fields = dock_fields();

        let desc = translate(&params(&[("order", "nombre:DESC")]), &fields);
        assert_eq!(
            desc.order,
            Some(SortSpec {
                field: "nombre".to_string(),
                direction: SortDirection::Desc
            })
        );

        let fallback = translate(&params(&[("order", "nombre:sideways")]), &fields);
        assert_eq!(fallback.order.unwrap().direction, SortDirection::Asc);

        let bare = translate(&params(&[("order", "nombre")]), &fields);
        assert_eq!(bare.order.unwrap().direction, SortDirection::Asc);
    }

    #[test]
    fn test_order_on_unknown_field_dropped() {
        let criteria = translate(&params(&[("order", "password:asc")]), &dock_fields());
        assert!(criteria.order.is_none());
    }

    #[test]
    fn test_single_bounds_are_open_ended() {
        let criteria = translate(&params(&[("longitud_m_min", "100")]), &dock_fields());
        assert_eq!(
            criteria.ranges["longitud_m"],
            RangeBounds {
                gte: Some(Scalar::Integer(100)),
                lte: None
            }
        );

        let criteria = translate(&params(&[("longitud_m_max", "7.5")]), &dock_fields());
        assert_eq!(
            criteria.ranges["longitud_m"],
            RangeBounds {
                gte: None,
                lte: Some(Scalar::Decimal(Decimal::new(75, 1)))
            }
        );
    }

    #[test]
    fn test_equality_filters_are_coerced() {
        let criteria = translate(
            &params(&[("nombre", "Muelle A"), ("operativo", "true"), ("id_puerto", "3")]),
            &dock_fields(),
        );

        assert_eq!(criteria.equals["nombre"], Scalar::Text("Muelle A".to_string()));
        assert_eq!(criteria.equals["operativo"], Scalar::Bool(true));
        assert_eq!(criteria.equals["id_puerto"], Scalar::Integer(3));
        assert!(criteria.ranges.is_empty());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let criteria = translate(
            &params(&[("foo", "bar"), ("secret_min", "1"), ("nombre_x", "y")]),
            &dock_fields(),
        );
        assert!(criteria.equals.is_empty());
        assert!(criteria.ranges.is_empty());
    }

    #[test]
    fn test_validated_dock_query_translates() {
        let fields = dock_fields();
        let schema = QuerySchema::build(&fields);

        let rejected = schema.validate(&params(&[("longitud_m_min", "10"), ("longitud_m_max", "5")]));
        assert!(rejected.is_err());

        let validated = schema
            .validate(&params(&[
                ("longitud_m_min", "5"),
                ("longitud_m_max", "10"),
                ("order", "nombre:desc"),
                ("limit", "50"),
            ]))
            .unwrap();
        let criteria = translate(&validated, &fields);

        let mut ranges = BTreeMap::new();
        ranges.insert(
            "longitud_m".to_string(),
            RangeBounds {
                gte: Some(Scalar::Integer(5)),
                lte: Some(Scalar::Integer(10)),
            },
        );
        assert_eq!(
            criteria,
            QueryCriteria {
                equals: BTreeMap::new(),
                ranges,
                order: Some(SortSpec {
                    field: "nombre".to_string(),
                    direction: SortDirection::Desc,
                }),
                limit: 50,
                offset: 0,
            }
        );
    }
}
