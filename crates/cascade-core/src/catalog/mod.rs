//! Entity schema catalog.
//!
//! Schemas are declared once through [`SchemaBuilder`], validated, and frozen
//! into a [`SchemaRegistry`]. Cascade engines read relation descriptors and
//! property metadata from it; nothing is looked up by reflection at call time.

mod entity;
mod property;
mod registry;
mod relation;

pub use entity::EntitySchema;
pub use property::{DefaultValue, PropertyMetadata};
pub use registry::{SchemaBuilder, SchemaRegistry, SchemaResolver};
pub use relation::{CascadeAction, CascadePolicy, Cardinality, RelationDescriptor, RelationKind};
