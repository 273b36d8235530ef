//! Relationship resolution between a parent table and an embedded one.

mod cache;
mod descriptor;
mod resolver;

pub use cache::RelationshipCache;
pub use descriptor::{Cardinality, RelationshipDescriptor};
pub use resolver::{resolve_relationship, singularize, RelationshipResolver, PRIMARY_KEY};
