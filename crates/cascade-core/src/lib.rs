//! Cascading create and delete over per-entity raw executors.
//!
//! Entity types and their relations are registered once in a
//! [`SchemaRegistry`]. Each type is bound to a [`RawExecutor`] in
//! [`Repositories`], either as cascading (served by a [`CascadeEngine`]) or
//! plain (served by a [`PlainRepository`]).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cascade_core::{
//!     CascadePolicy, DefaultValue, EntitySchema, MemoryStore, PropertyMetadata,
//!     RelationDescriptor, Repositories, SchemaRegistry, SchemaResolver,
//! };
//! use cascade_proto::{CascadeOptions, Entity};
//!
//! # async fn example() -> Result<(), cascade_core::Error> {
//! let registry = Arc::new(
//!     SchemaRegistry::builder()
//!         .entity(
//!             EntitySchema::new("User", "id")
//!                 .with_property(PropertyMetadata::identity("id", DefaultValue::AutoIncrement))
//!                 .with_property(PropertyMetadata::new("username"))
//!                 .with_property(PropertyMetadata::optional("parentId"))
//!                 .with_relation(
//!                     RelationDescriptor::has_many("children", "id", "User", "parentId")
//!                         .with_cascade(CascadePolicy::all()),
//!                 ),
//!         )
//!         .build()?,
//! );
//!
//! let store = MemoryStore::new();
//! let user = registry.entity("User").cloned().ok_or_else(|| {
//!     cascade_core::Error::UnknownEntity("User".into())
//! })?;
//! let repos = Repositories::builder(registry.clone())
//!     .cascading(Arc::new(store.executor(user)))
//!     .build()?;
//!
//! let users = repos.engine("User")?;
//! let parent = Entity::new()
//!     .with("username", "user3")
//!     .with("children", vec![Entity::new().with("username", "c3")]);
//! let created = users.create(&parent, &CascadeOptions::default()).await?;
//! assert_eq!(created.get("children").map(|c| c.entities().count()), Some(1));
//! # Ok(())
//! # }
//! ```

pub mod cascade;
pub mod catalog;
pub mod config;
pub mod error;
pub mod query;
pub mod repository;
pub mod storage;

pub use cascade::CascadeEngine;
pub use catalog::{
    Cardinality, CascadeAction, CascadePolicy, DefaultValue, EntitySchema, PropertyMetadata,
    RelationDescriptor, RelationKind, SchemaBuilder, SchemaRegistry, SchemaResolver,
};
pub use config::{CascadeConfig, FanOut};
pub use error::{Error, SchemaError};
pub use repository::{PlainRepository, Repositories, RepositoriesBuilder, Repository, TargetRepository};
pub use storage::{MemoryExecutor, MemoryStore, RawExecutor};
