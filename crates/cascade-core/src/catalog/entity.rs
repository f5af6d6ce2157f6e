//! Entity type schemas.

use super::property::PropertyMetadata;
use super::relation::{CascadeAction, RelationDescriptor};

/// Schema of one entity type: identity, properties, and owned relations.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySchema {
    name: String,
    identity: String,
    properties: Vec<PropertyMetadata>,
    relations: Vec<RelationDescriptor>,
}

impl EntitySchema {
    /// Create a new entity schema.
    pub fn new(name: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identity: identity.into(),
            properties: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Add a property.
    pub fn with_property(mut self, property: PropertyMetadata) -> Self {
        self.properties.push(property);
        self
    }

    /// Add multiple properties.
    pub fn with_properties(mut self, properties: impl IntoIterator<Item = PropertyMetadata>) -> Self {
        self.properties.extend(properties);
        self
    }

    /// Add a relation owned by this type.
    pub fn with_relation(mut self, relation: RelationDescriptor) -> Self {
        self.relations.push(relation);
        self
    }

    /// Entity type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the identity property.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Declared properties in declaration order.
    pub fn properties(&self) -> &[PropertyMetadata] {
        &self.properties
    }

    /// Declared relations in declaration order.
    pub fn relations(&self) -> &[RelationDescriptor] {
        &self.relations
    }

    /// Get a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyMetadata> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Get a relation by name.
    pub fn relation(&self, name: &str) -> Option<&RelationDescriptor> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Relations that cascade the given action, in declaration order.
    pub fn cascading(&self, action: CascadeAction) -> impl Iterator<Item = &RelationDescriptor> {
        self.relations.iter().filter(move |r| r.cascades(action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CascadePolicy, DefaultValue};

    #[test]
    fn test_entity_builder() {
        let user = EntitySchema::new("User", "id")
            .with_property(PropertyMetadata::identity("id", DefaultValue::AutoUuid))
            .with_property(PropertyMetadata::new("username"))
            .with_property(PropertyMetadata::optional("parentId"))
            .with_relation(
                RelationDescriptor::has_many("children", "id", "User", "parentId")
                    .with_cascade(CascadePolicy::all()),
            )
            .with_relation(
                RelationDescriptor::belongs_to("parent", "parentId", "User", "id")
                    .cascade_on(CascadeAction::Delete),
            );

        assert_eq!(user.name(), "User");
        assert_eq!(user.identity(), "id");
        assert_eq!(user.properties().len(), 3);
        assert!(user.property("username").is_some());
        assert!(user.relation("children").is_some());
        assert!(user.relation("nonexistent").is_none());

        let creating: Vec<_> = user.cascading(CascadeAction::Create).map(|r| r.name.as_str()).collect();
        let deleting: Vec<_> = user.cascading(CascadeAction::Delete).map(|r| r.name.as_str()).collect();
        assert_eq!(creating, vec!["children"]);
        assert_eq!(deleting, vec!["children", "parent"]);
    }
}
