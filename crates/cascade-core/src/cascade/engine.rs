//! The cascading repository for one entity type.

use std::sync::Arc;

use async_trait::async_trait;
use cascade_proto::{CascadeOptions, Count, Entity, FilterExpr, Value};

use crate::catalog::EntitySchema;
use crate::config::CascadeConfig;
use crate::error::Error;
use crate::repository::{Repositories, Repository};
use crate::storage::RawExecutor;

/// Cascading create/delete over one entity type's raw executor.
///
/// Engines are cheap to build. [`Repositories::engine`] creates one per call
/// site, and branches reach their targets through the same registry.
pub struct CascadeEngine {
    pub(super) entity: Arc<EntitySchema>,
    pub(super) executor: Arc<dyn RawExecutor>,
    pub(super) repositories: Arc<Repositories>,
}

impl CascadeEngine {
    /// Create an engine for an entity type.
    pub fn new(
        entity: Arc<EntitySchema>,
        executor: Arc<dyn RawExecutor>,
        repositories: Arc<Repositories>,
    ) -> Self {
        Self {
            entity,
            executor,
            repositories,
        }
    }

    pub(super) fn config(&self) -> &CascadeConfig {
        self.repositories.config()
    }

    /// Equality filter on the identity property.
    pub(super) fn identity_filter(&self, id: Value) -> FilterExpr {
        FilterExpr::eq(self.entity.identity(), id)
    }

    /// Find rows without cascading. The base predicate is ANDed in.
    pub async fn find(
        &self,
        filter: Option<FilterExpr>,
        options: &CascadeOptions,
    ) -> Result<Vec<Entity>, Error> {
        let filter = FilterExpr::conjoin(filter, options.where_clause.clone());
        self.executor.find(filter.as_ref()).await
    }

    /// Find one row by identity.
    pub async fn find_by_id(&self, id: impl Into<Value>) -> Result<Entity, Error> {
        let id = id.into();
        let filter = self.identity_filter(id.clone());
        self.executor
            .find(Some(&filter))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound {
                entity: self.entity.name().to_string(),
                id: display_id(&id),
            })
    }

    /// Count rows without cascading.
    pub async fn count(
        &self,
        filter: Option<FilterExpr>,
        options: &CascadeOptions,
    ) -> Result<Count, Error> {
        let filter = FilterExpr::conjoin(filter, options.where_clause.clone());
        self.executor.count(filter.as_ref()).await
    }
}

/// Render an identity value for error messages.
pub(super) fn display_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_json().to_string(),
    }
}

#[async_trait]
impl Repository for CascadeEngine {
    fn entity_type(&self) -> &str {
        self.entity.name()
    }

    fn supports_cascade(&self) -> bool {
        true
    }

    async fn create_all(
        &self,
        inputs: &[Entity],
        options: &CascadeOptions,
    ) -> Result<Vec<Entity>, Error> {
        CascadeEngine::create_all(self, inputs, options).await
    }

    async fn delete_all(
        &self,
        filter: Option<FilterExpr>,
        options: &CascadeOptions,
    ) -> Result<Count, Error> {
        CascadeEngine::delete_all(self, filter, options).await
    }

    async fn find(
        &self,
        filter: Option<FilterExpr>,
        options: &CascadeOptions,
    ) -> Result<Vec<Entity>, Error> {
        CascadeEngine::find(self, filter, options).await
    }

    async fn count(
        &self,
        filter: Option<FilterExpr>,
        options: &CascadeOptions,
    ) -> Result<Count, Error> {
        CascadeEngine::count(self, filter, options).await
    }
}
