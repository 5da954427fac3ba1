//! Entities served by the API.

pub mod dock;
pub mod port;

pub use dock::Dock;
pub use port::Port;

use crate::filtering::SchemaRegistry;
use crate::traits::Resource;

/// Registry holding the query schema of every served entity.
#[must_use]
pub fn schema_registry() -> SchemaRegistry {
    SchemaRegistry::new()
        .with(Port::KIND, Port::field_descriptors())
        .with(Dock::KIND, Dock::field_descriptors())
}
