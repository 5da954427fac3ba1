//! Query-string validation and translation for list endpoints.
//!
//! Each entity declares its filterable attributes as a list of
//! [`FieldDescriptor`]s. From that list a [`QuerySchema`] is built once and
//! kept in the [`SchemaRegistry`]. A request then goes through two steps:
//!
//! 1. [`QuerySchema::validate`] rejects unknown keys, mistyped values,
//!    out-of-bounds pagination and inverted `_min`/`_max` pairs, reporting
//!    every violation at once.
//! 2. [`translate`] turns the sanitized map into [`QueryCriteria`]:
//!    equality filters, inclusive ranges, an optional sort and a page window.
//!
//! ```text
//! GET /api/muelles?longitud_m_min=5&longitud_m_max=10&order=nombre:desc&limit=50
//!
//! ranges: longitud_m BETWEEN 5 AND 10
//! order:  nombre DESC
//! limit:  50, offset: 0
//! ```

pub mod coerce;
pub mod criteria;
pub mod fields;
pub mod order;
pub mod query;
pub mod registry;
pub mod schema;

use std::collections::BTreeMap;

/// Flat `key -> raw value` view of a query string.
pub type QueryParams = BTreeMap<String, String>;

pub use coerce::{Scalar, coerce};
pub use criteria::{QueryCriteria, RangeBounds, SortDirection, SortSpec, translate};
pub use fields::{FieldDescriptor, FieldKind, RESERVED_KEYS};
pub use order::OrderValidator;
pub use query::QuerySchema;
pub use registry::{EntityKind, SchemaRegistry};
pub use schema::FilterSchema;
