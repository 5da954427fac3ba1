use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::fields::{FieldDescriptor, is_reserved};
use super::query::QuerySchema;

/// Entity types exposed through the query layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Port,
    Dock,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Port => f.write_str("puerto"),
            Self::Dock => f.write_str("muelle"),
        }
    }
}

/// Query schemas built once per entity type and shared between requests.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<EntityKind, Arc<QuerySchema>>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and stores the schema for `kind`, replacing any earlier one.
    pub fn register(&mut self, kind: EntityKind, fields: &[FieldDescriptor]) -> Arc<QuerySchema> {
        for field in fields.iter().filter(|field| is_reserved(field.name)) {
            tracing::warn!(
                entity = %kind,
                field = field.name,
                "field shadows a reserved query key and cannot be filtered"
            );
        }

        let schema = Arc::new(QuerySchema::build(fields));
        self.schemas.insert(kind, Arc::clone(&schema));
        tracing::debug!(entity = %kind, fields = fields.len(), "registered query schema");
        schema
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, kind: EntityKind, fields: &[FieldDescriptor]) -> Self {
        self.register(kind, fields);
        self
    }

    #[must_use]
    pub fn get(&self, kind: EntityKind) -> Option<Arc<QuerySchema>> {
        self.schemas.get(&kind).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
