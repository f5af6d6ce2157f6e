//! Cascade scenarios over a `User` parent/children schema.

use std::sync::Arc;

use cascade_core::{
    CascadeAction, CascadeConfig, CascadeEngine, CascadePolicy, DefaultValue, EntitySchema,
    MemoryStore, PropertyMetadata, RelationDescriptor, Repositories, SchemaRegistry,
    SchemaResolver,
};
use cascade_proto::{CascadeOptions, Count, Entity, FilterExpr};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::config::Scenario;
use crate::error::Error;

/// Outcome of one scenario.
#[derive(Debug, Serialize)]
pub struct Report {
    /// Scenario name.
    pub scenario: &'static str,
    /// Entities returned by the create step.
    pub created: Vec<Entity>,
    /// Count returned by the delete step, if the scenario deletes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<Count>,
    /// Rows left in the store afterwards.
    pub remaining: Vec<Entity>,
}

/// `User` with `parent` (belongs-to, delete only) and `children`
/// (has-many, create and delete).
pub fn user_schema() -> Result<SchemaRegistry, Error> {
    let user = EntitySchema::new("User", "id")
        .with_property(PropertyMetadata::identity("id", DefaultValue::AutoIncrement))
        .with_property(PropertyMetadata::new("username"))
        .with_property(PropertyMetadata::optional("parentId"))
        .with_relation(
            RelationDescriptor::belongs_to("parent", "parentId", "User", "id")
                .cascade_on(CascadeAction::Delete),
        )
        .with_relation(
            RelationDescriptor::has_many("children", "id", "User", "parentId")
                .with_cascade(CascadePolicy::all()),
        );

    Ok(SchemaRegistry::builder().entity(user).build()?)
}

/// A fresh store with the `User` schema bound as cascading.
pub struct Demo {
    repos: Arc<Repositories>,
}

impl Demo {
    /// Build the schema and bind it to a new in-memory store.
    pub fn new(config: CascadeConfig) -> Result<Self, Error> {
        let registry = Arc::new(user_schema()?);
        let store = MemoryStore::new();
        let user = registry
            .entity("User")
            .cloned()
            .ok_or_else(|| cascade_core::Error::UnknownEntity("User".to_string()))?;

        let repos = Repositories::builder(registry)
            .with_config(config)
            .cascading(Arc::new(store.executor(user)))
            .build()?;
        Ok(Self { repos })
    }

    fn users(&self) -> Result<CascadeEngine, Error> {
        Ok(self.repos.engine("User")?)
    }
}

fn payload(json: serde_json::Value) -> Result<Vec<Entity>, Error> {
    let items = match json {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    };
    Ok(items
        .into_iter()
        .map(Entity::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

fn username_scope(username: &str) -> CascadeOptions {
    CascadeOptions::new().with_where(FilterExpr::eq("username", username))
}

/// Run one scenario on a fresh store.
pub async fn run(scenario: Scenario, config: &CascadeConfig) -> Result<Report, Error> {
    let demo = Demo::new(config.clone())?;
    let users = demo.users()?;
    let none = CascadeOptions::default();

    let (created, deleted) = match scenario {
        Scenario::Create | Scenario::DeleteAll => {
            let inputs = payload(json!([
                {"username": "user1"},
                {"username": "user2", "parent": {"username": "p2"}},
                {"username": "user3", "children": [{"username": "c3"}]}
            ]))?;
            let created = users.create_all(&inputs, &none).await?;

            let deleted = if scenario == Scenario::DeleteAll {
                let options = CascadeOptions::new().include("parent", username_scope("p2"));
                Some(users.delete_all(None, &options).await?)
            } else {
                None
            };
            (created, deleted)
        }
        Scenario::DeleteById => {
            let inputs = payload(json!([
                {"id": 1, "username": "user1"},
                {"id": 2, "username": "user2", "children": [{"username": "user2Child"}]},
                {"id": 3, "username": "user3"}
            ]))?;
            let created = users.create_all(&inputs, &none).await?;

            let options = CascadeOptions::new().include("children", username_scope("user2Child"));
            let deleted = users.delete_by_id(2i64, &options).await?;
            (created, Some(deleted))
        }
        Scenario::All => {
            return Err(cascade_core::Error::Config(
                "`all` must be expanded before running".to_string(),
            )
            .into());
        }
    };

    let remaining = users.find(None, &none).await?;
    info!(
        scenario = scenario.name(),
        created = created.len(),
        deleted = deleted.map(|c| c.count),
        remaining = remaining.len(),
        "scenario finished"
    );

    Ok(Report {
        scenario: scenario.name(),
        created,
        deleted,
        remaining,
    })
}
