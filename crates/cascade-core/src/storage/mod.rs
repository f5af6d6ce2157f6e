//! Raw executors: single-table bulk create, find, and delete.
//!
//! A raw executor is bound to one entity type and knows nothing about
//! relations. It fills identity and default values on insert and must reject
//! records it cannot store with [`crate::Error::Storage`].

mod memory;

use async_trait::async_trait;
use cascade_proto::{Count, Entity, FilterExpr};

use crate::error::Error;

pub use memory::{MemoryExecutor, MemoryStore};

/// Per-entity-type store primitives.
#[async_trait]
pub trait RawExecutor: Send + Sync {
    /// Entity type this executor stores.
    fn entity_type(&self) -> &str;

    /// Insert flat records in one call, returning them with generated values filled.
    async fn create_all(&self, records: Vec<Entity>) -> Result<Vec<Entity>, Error>;

    /// Find rows matching a predicate. `None` matches every row.
    async fn find(&self, filter: Option<&FilterExpr>) -> Result<Vec<Entity>, Error>;

    /// Delete rows matching a predicate. `None` deletes every row.
    async fn delete_all(&self, filter: Option<&FilterExpr>) -> Result<Count, Error>;

    /// Count rows matching a predicate.
    async fn count(&self, filter: Option<&FilterExpr>) -> Result<Count, Error> {
        let rows = self.find(filter).await?;
        Ok(Count::new(rows.len() as u64))
    }
}
