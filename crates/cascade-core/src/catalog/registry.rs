//! Schema registration and lookup.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::entity::EntitySchema;
use super::property::PropertyMetadata;
use super::relation::{CascadeAction, RelationDescriptor, RelationKind};
use crate::error::SchemaError;

/// Read access to entity schemas.
pub trait SchemaResolver: Send + Sync {
    /// Get the schema of an entity type.
    fn entity(&self, name: &str) -> Option<&Arc<EntitySchema>>;

    /// Relations owned by an entity type.
    fn relations_of(&self, name: &str) -> Option<&[RelationDescriptor]> {
        self.entity(name).map(|e| e.relations())
    }

    /// Properties of an entity type.
    fn properties_of(&self, name: &str) -> Option<&[PropertyMetadata]> {
        self.entity(name).map(|e| e.properties())
    }

    /// Identity property of an entity type.
    fn identity_property_of(&self, name: &str) -> Option<&str> {
        self.entity(name).map(|e| e.identity())
    }
}

/// Collects entity schemas and validates them into a [`SchemaRegistry`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    entities: Vec<EntitySchema>,
}

impl SchemaBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity type.
    pub fn entity(mut self, entity: EntitySchema) -> Self {
        self.entities.push(entity);
        self
    }

    /// Validate all registrations and freeze them.
    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        let mut entities = BTreeMap::new();
        for entity in self.entities {
            let name = entity.name().to_string();
            if entities.insert(name.clone(), Arc::new(entity)).is_some() {
                return Err(SchemaError::DuplicateEntity(name));
            }
        }

        for entity in entities.values() {
            validate_entity(entity, &entities)?;
        }

        tracing::debug!(entities = entities.len(), "schema registry built");
        Ok(SchemaRegistry { entities })
    }
}

fn validate_entity(
    entity: &EntitySchema,
    entities: &BTreeMap<String, Arc<EntitySchema>>,
) -> Result<(), SchemaError> {
    if entity.property(entity.identity()).is_none() {
        return Err(SchemaError::MissingIdentity {
            entity: entity.name().to_string(),
            property: entity.identity().to_string(),
        });
    }

    for (i, relation) in entity.relations().iter().enumerate() {
        let relation_error = |property: &str, owner: &str| SchemaError::UnknownProperty {
            entity: owner.to_string(),
            relation: relation.name.clone(),
            property: property.to_string(),
        };

        if entity.relations()[..i].iter().any(|r| r.name == relation.name) {
            return Err(SchemaError::DuplicateRelation {
                entity: entity.name().to_string(),
                relation: relation.name.clone(),
            });
        }
        if entity.property(&relation.name).is_some() {
            return Err(SchemaError::RelationShadowsProperty {
                entity: entity.name().to_string(),
                relation: relation.name.clone(),
            });
        }
        if relation.kind == RelationKind::BelongsTo && relation.cascades(CascadeAction::Create) {
            return Err(SchemaError::BelongsToCascadeCreate {
                entity: entity.name().to_string(),
                relation: relation.name.clone(),
            });
        }

        let target = entities
            .get(&relation.target_type)
            .ok_or_else(|| SchemaError::UnknownEntity {
                entity: entity.name().to_string(),
                relation: relation.name.clone(),
                target: relation.target_type.clone(),
            })?;

        if entity.property(&relation.key_from).is_none() {
            return Err(relation_error(&relation.key_from, entity.name()));
        }
        if target.property(&relation.key_to).is_none() {
            return Err(relation_error(&relation.key_to, target.name()));
        }
    }

    Ok(())
}

/// Immutable set of validated entity schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entities: BTreeMap<String, Arc<EntitySchema>>,
}

impl SchemaRegistry {
    /// Start building a registry.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Number of registered entity types.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check whether no entity type is registered.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl SchemaResolver for SchemaRegistry {
    fn entity(&self, name: &str) -> Option<&Arc<EntitySchema>> {
        self.entities.get(name)
    }
}
