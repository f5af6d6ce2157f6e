//! Core error types.

use thiserror::Error;

/// Cascade repository errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The raw executor rejected a call.
    #[error("storage error on {entity}: {message}")]
    Storage { entity: String, message: String },

    /// An identity-addressed operation matched no row.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: String, id: String },

    /// An entity passed to an identity-addressed operation has no identity value.
    #[error("{entity} has no identity value")]
    MissingIdentity { entity: String },

    /// No schema or repository is registered for an entity type.
    #[error("unknown entity type: {0}")]
    UnknownEntity(String),

    /// A relation is not declared on the entity type.
    #[error("relation {relation} is not declared on {entity}")]
    UnknownRelation { entity: String, relation: String },

    /// Schema registration error.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Payload error.
    #[error("payload error: {0}")]
    Protocol(#[from] cascade_proto::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a storage error for an entity type.
    pub fn storage(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Storage {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Check whether this is a storage failure.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage { .. })
    }

    /// Check whether this is a not-found failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Schema invariant violations detected while building a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Entity type registered twice.
    #[error("entity {0} is registered twice")]
    DuplicateEntity(String),

    /// Relation target type is not registered.
    #[error("relation {entity}.{relation} targets unknown entity {target}")]
    UnknownEntity {
        entity: String,
        relation: String,
        target: String,
    },

    /// A relation key names a property the type does not declare.
    #[error("relation {relation} uses unknown property {entity}.{property}")]
    UnknownProperty {
        entity: String,
        relation: String,
        property: String,
    },

    /// The identity property is not declared.
    #[error("entity {entity} does not declare its identity property {property}")]
    MissingIdentity { entity: String, property: String },

    /// Relation name declared twice on one type.
    #[error("relation {entity}.{relation} is declared twice")]
    DuplicateRelation { entity: String, relation: String },

    /// Relation name collides with a property name.
    #[error("relation {entity}.{relation} shadows a property of the same name")]
    RelationShadowsProperty { entity: String, relation: String },

    /// A belongs-to relation was given the create cascade.
    #[error("belongs-to relation {entity}.{relation} cannot cascade create")]
    BelongsToCascadeCreate { entity: String, relation: String },
}
