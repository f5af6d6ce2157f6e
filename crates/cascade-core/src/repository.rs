//! Repository trait and the registry that wires entity types to executors.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use cascade_proto::{CascadeOptions, Count, Entity, FilterExpr};
use tracing::debug;

use crate::cascade::{matcher, CascadeEngine};
use crate::catalog::{EntitySchema, SchemaResolver};
use crate::config::CascadeConfig;
use crate::error::Error;
use crate::storage::RawExecutor;

/// Create/find/delete surface shared by cascading and plain repositories.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Entity type this repository manages.
    fn entity_type(&self) -> &str;

    /// Whether creates and deletes cascade into relations.
    fn supports_cascade(&self) -> bool;

    /// Create entities.
    async fn create_all(
        &self,
        inputs: &[Entity],
        options: &CascadeOptions,
    ) -> Result<Vec<Entity>, Error>;

    /// Delete rows matching `filter` ANDed with `options.where_clause`.
    async fn delete_all(
        &self,
        filter: Option<FilterExpr>,
        options: &CascadeOptions,
    ) -> Result<Count, Error>;

    /// Find rows matching `filter` ANDed with `options.where_clause`.
    async fn find(
        &self,
        filter: Option<FilterExpr>,
        options: &CascadeOptions,
    ) -> Result<Vec<Entity>, Error>;

    /// Count rows matching `filter` ANDed with `options.where_clause`.
    async fn count(
        &self,
        filter: Option<FilterExpr>,
        options: &CascadeOptions,
    ) -> Result<Count, Error>;
}

/// Non-cascading repository over a raw executor.
///
/// Relation payloads are stripped before insert and inclusion lists are
/// ignored. The base predicate still applies.
pub struct PlainRepository {
    schema: Arc<EntitySchema>,
    executor: Arc<dyn RawExecutor>,
}

impl PlainRepository {
    /// Wrap a raw executor for an entity type.
    pub fn new(schema: Arc<EntitySchema>, executor: Arc<dyn RawExecutor>) -> Self {
        Self { schema, executor }
    }
}

#[async_trait]
impl Repository for PlainRepository {
    fn entity_type(&self) -> &str {
        self.executor.entity_type()
    }

    fn supports_cascade(&self) -> bool {
        false
    }

    async fn create_all(
        &self,
        inputs: &[Entity],
        _options: &CascadeOptions,
    ) -> Result<Vec<Entity>, Error> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let records = inputs
            .iter()
            .map(|input| matcher::flatten(&matcher::normalize(&self.schema, input)))
            .collect();
        self.executor.create_all(records).await
    }

    async fn delete_all(
        &self,
        filter: Option<FilterExpr>,
        options: &CascadeOptions,
    ) -> Result<Count, Error> {
        let filter = FilterExpr::conjoin(filter, options.where_clause.clone());
        self.executor.delete_all(filter.as_ref()).await
    }

    async fn find(
        &self,
        filter: Option<FilterExpr>,
        options: &CascadeOptions,
    ) -> Result<Vec<Entity>, Error> {
        let filter = FilterExpr::conjoin(filter, options.where_clause.clone());
        self.executor.find(filter.as_ref()).await
    }

    async fn count(
        &self,
        filter: Option<FilterExpr>,
        options: &CascadeOptions,
    ) -> Result<Count, Error> {
        let filter = FilterExpr::conjoin(filter, options.where_clause.clone());
        self.executor.count(filter.as_ref()).await
    }
}

/// The repository bound to a relation's target type.
#[derive(Clone)]
pub struct TargetRepository {
    /// Raw executor of the target type.
    pub executor: Arc<dyn RawExecutor>,
    /// Whether `repository` cascades.
    pub supports_cascade: bool,
    /// Cascading engine or plain repository for the target type.
    pub repository: Arc<dyn Repository>,
}

#[derive(Clone)]
struct Binding {
    executor: Arc<dyn RawExecutor>,
    cascading: bool,
}

/// Builder for [`Repositories`].
pub struct RepositoriesBuilder {
    schema: Arc<dyn SchemaResolver>,
    config: CascadeConfig,
    bindings: Vec<(Binding, String)>,
}

impl RepositoriesBuilder {
    /// Set the cascade configuration.
    pub fn with_config(mut self, config: CascadeConfig) -> Self {
        self.config = config;
        self
    }

    /// Bind an executor whose repository cascades.
    pub fn cascading(mut self, executor: Arc<dyn RawExecutor>) -> Self {
        let name = executor.entity_type().to_string();
        self.bindings.push((
            Binding {
                executor,
                cascading: true,
            },
            name,
        ));
        self
    }

    /// Bind an executor whose repository does not cascade.
    pub fn plain(mut self, executor: Arc<dyn RawExecutor>) -> Self {
        let name = executor.entity_type().to_string();
        self.bindings.push((
            Binding {
                executor,
                cascading: false,
            },
            name,
        ));
        self
    }

    /// Validate the bindings against the schema.
    pub fn build(self) -> Result<Arc<Repositories>, Error> {
        let mut bindings = HashMap::with_capacity(self.bindings.len());
        for (binding, name) in self.bindings {
            if self.schema.entity(&name).is_none() {
                return Err(Error::UnknownEntity(name));
            }
            if bindings.insert(name.clone(), binding).is_some() {
                return Err(Error::Config(format!("entity {name} is bound twice")));
            }
        }

        debug!(bound = bindings.len(), "repositories built");
        Ok(Arc::new(Repositories {
            schema: self.schema,
            config: self.config,
            bindings,
        }))
    }
}

/// Entity types bound to raw executors, plus the shared cascade configuration.
///
/// Lives behind an `Arc` so engines can hand it to the engines of their
/// relation targets.
pub struct Repositories {
    schema: Arc<dyn SchemaResolver>,
    config: CascadeConfig,
    bindings: HashMap<String, Binding>,
}

impl Repositories {
    /// Start binding executors for a schema.
    pub fn builder(schema: Arc<dyn SchemaResolver>) -> RepositoriesBuilder {
        RepositoriesBuilder {
            schema,
            config: CascadeConfig::default(),
            bindings: Vec::new(),
        }
    }

    /// Cascade configuration shared by every engine.
    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    fn binding(&self, entity: &str) -> Result<&Binding, Error> {
        self.bindings
            .get(entity)
            .ok_or_else(|| Error::UnknownEntity(entity.to_string()))
    }

    /// Cascading engine for an entity type.
    pub fn engine(self: &Arc<Self>, entity: &str) -> Result<CascadeEngine, Error> {
        let binding = self.binding(entity)?;
        let schema = self
            .schema
            .entity(entity)
            .cloned()
            .ok_or_else(|| Error::UnknownEntity(entity.to_string()))?;
        Ok(CascadeEngine::new(
            schema,
            binding.executor.clone(),
            Arc::clone(self),
        ))
    }

    /// Repository for an entity type: an engine when bound as cascading.
    pub fn repository(self: &Arc<Self>, entity: &str) -> Result<Arc<dyn Repository>, Error> {
        let binding = self.binding(entity)?;
        if binding.cascading {
            Ok(Arc::new(self.engine(entity)?))
        } else {
            let schema = self
                .schema
                .entity(entity)
                .cloned()
                .ok_or_else(|| Error::UnknownEntity(entity.to_string()))?;
            Ok(Arc::new(PlainRepository::new(schema, binding.executor.clone())))
        }
    }

    /// Repository bound to the target type of a relation declared on `entity`.
    pub fn target(self: &Arc<Self>, entity: &str, relation: &str) -> Result<TargetRepository, Error> {
        let descriptor = self
            .schema
            .relations_of(entity)
            .ok_or_else(|| Error::UnknownEntity(entity.to_string()))?
            .iter()
            .find(|r| r.name == relation)
            .ok_or_else(|| Error::UnknownRelation {
                entity: entity.to_string(),
                relation: relation.to_string(),
            })?;

        let binding = self.binding(&descriptor.target_type)?;
        Ok(TargetRepository {
            executor: binding.executor.clone(),
            supports_cascade: binding.cascading,
            repository: self.repository(&descriptor.target_type)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        CascadePolicy, DefaultValue, EntitySchema, PropertyMetadata, RelationDescriptor,
        SchemaRegistry,
    };
    use crate::storage::MemoryStore;

    fn registry() -> Arc<SchemaRegistry> {
        let registry = SchemaRegistry::builder()
            .entity(
                EntitySchema::new("Post", "id")
                    .with_property(PropertyMetadata::identity("id", DefaultValue::AutoIncrement))
                    .with_property(PropertyMetadata::new("title"))
                    .with_relation(
                        RelationDescriptor::has_many("tags", "id", "Tag", "postId")
                            .with_cascade(CascadePolicy::all()),
                    ),
            )
            .entity(
                EntitySchema::new("Tag", "id")
                    .with_property(PropertyMetadata::identity("id", DefaultValue::AutoIncrement))
                    .with_property(PropertyMetadata::new("label"))
                    .with_property(PropertyMetadata::optional("postId")),
            )
            .build()
            .unwrap();
        Arc::new(registry)
    }

    #[test]
    fn test_target_lookup() {
        let registry = registry();
        let store = MemoryStore::new();
        let repos = Repositories::builder(registry.clone())
            .cascading(Arc::new(store.executor(registry.entity("Post").unwrap().clone())))
            .plain(Arc::new(store.executor(registry.entity("Tag").unwrap().clone())))
            .build()
            .unwrap();

        let target = repos.target("Post", "tags").unwrap();
        assert!(!target.supports_cascade);
        assert_eq!(target.executor.entity_type(), "Tag");
        assert_eq!(target.repository.entity_type(), "Tag");
        assert!(!target.repository.supports_cascade());

        assert!(repos.repository("Post").unwrap().supports_cascade());
        assert!(matches!(
            repos.target("Post", "comments"),
            Err(Error::UnknownRelation { .. })
        ));
        assert!(matches!(repos.engine("Comment"), Err(Error::UnknownEntity(_))));
    }

    #[test]
    fn test_rejects_double_binding() {
        let registry = registry();
        let store = MemoryStore::new();
        let post = registry.entity("Post").unwrap().clone();

        let result = Repositories::builder(registry.clone())
            .cascading(Arc::new(store.executor(post.clone())))
            .plain(Arc::new(store.executor(post)))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_plain_repository_strips_payloads() {
        let registry = registry();
        let store = MemoryStore::new();
        let schema = registry.entity("Tag").unwrap().clone();
        let tags = PlainRepository::new(schema.clone(), Arc::new(store.executor(schema)));

        let created = tags
            .create_all(
                &[Entity::new()
                    .with("label", "rust")
                    .with("post", Entity::new().with("title", "ignored"))],
                &CascadeOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(created.len(), 1);
        assert!(!created[0].contains("post"));

        let scoped = CascadeOptions::new().with_where(FilterExpr::eq("label", "go"));
        assert_eq!(tags.delete_all(None, &scoped).await.unwrap(), Count::new(0));
        assert_eq!(
            tags.count(None, &CascadeOptions::default()).await.unwrap(),
            Count::new(1)
        );
    }
}
