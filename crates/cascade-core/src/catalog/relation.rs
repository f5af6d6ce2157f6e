//! Relation descriptors between entity types.

/// Cardinality of a relation as seen from its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// The owner holds at most one related entity.
    One,
    /// The owner holds a list of related entities.
    Many,
}

/// Which side of the foreign key the owner sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Children carry `key_to` pointing at the owner's `key_from`.
    HasMany,
    /// Like `HasMany`, with at most one child.
    HasOne,
    /// The owner carries `key_from` pointing at the parent's `key_to`.
    BelongsTo,
}

impl RelationKind {
    /// Cardinality implied by the kind.
    pub fn cardinality(self) -> Cardinality {
        match self {
            RelationKind::HasMany => Cardinality::Many,
            RelationKind::HasOne | RelationKind::BelongsTo => Cardinality::One,
        }
    }
}

/// An operation a relation may cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeAction {
    /// Create nested payloads along with the owner.
    Create,
    /// Delete related rows named by an inclusion entry.
    Delete,
}

/// Set of cascade actions enabled on a relation. Empty by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadePolicy {
    create: bool,
    delete: bool,
}

impl CascadePolicy {
    /// No cascading; the relation is orphaned on delete and ignored on create.
    pub fn none() -> Self {
        Self::default()
    }

    /// Cascade both create and delete.
    pub fn all() -> Self {
        Self {
            create: true,
            delete: true,
        }
    }

    /// Enable one action.
    pub fn with(mut self, action: CascadeAction) -> Self {
        match action {
            CascadeAction::Create => self.create = true,
            CascadeAction::Delete => self.delete = true,
        }
        self
    }

    /// Check whether an action is enabled.
    pub fn contains(&self, action: CascadeAction) -> bool {
        match action {
            CascadeAction::Create => self.create,
            CascadeAction::Delete => self.delete,
        }
    }

    /// Check whether no action is enabled.
    pub fn is_empty(&self) -> bool {
        !self.create && !self.delete
    }
}

impl FromIterator<CascadeAction> for CascadePolicy {
    fn from_iter<I: IntoIterator<Item = CascadeAction>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), Self::with)
    }
}

/// A relation declared on an owning entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationDescriptor {
    /// Relation name, also the payload property holding related entities.
    pub name: String,
    /// Side of the foreign key.
    pub kind: RelationKind,
    /// Cardinality as seen from the owner.
    pub cardinality: Cardinality,
    /// Key property on the owning type.
    pub key_from: String,
    /// Key property on the target type.
    pub key_to: String,
    /// Target entity type.
    pub target_type: String,
    /// Enabled cascade actions.
    pub cascade: CascadePolicy,
}

impl RelationDescriptor {
    fn with_kind(
        kind: RelationKind,
        name: impl Into<String>,
        key_from: impl Into<String>,
        target_type: impl Into<String>,
        key_to: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            cardinality: kind.cardinality(),
            key_from: key_from.into(),
            key_to: key_to.into(),
            target_type: target_type.into(),
            cascade: CascadePolicy::none(),
        }
    }

    /// Create a has-many relation: `target.key_to` references `owner.key_from`.
    pub fn has_many(
        name: impl Into<String>,
        key_from: impl Into<String>,
        target_type: impl Into<String>,
        key_to: impl Into<String>,
    ) -> Self {
        Self::with_kind(RelationKind::HasMany, name, key_from, target_type, key_to)
    }

    /// Create a has-one relation: `target.key_to` references `owner.key_from`.
    pub fn has_one(
        name: impl Into<String>,
        key_from: impl Into<String>,
        target_type: impl Into<String>,
        key_to: impl Into<String>,
    ) -> Self {
        Self::with_kind(RelationKind::HasOne, name, key_from, target_type, key_to)
    }

    /// Create a belongs-to relation: `owner.key_from` references `target.key_to`.
    pub fn belongs_to(
        name: impl Into<String>,
        key_from: impl Into<String>,
        target_type: impl Into<String>,
        key_to: impl Into<String>,
    ) -> Self {
        Self::with_kind(RelationKind::BelongsTo, name, key_from, target_type, key_to)
    }

    /// Set the cascade policy.
    pub fn with_cascade(mut self, cascade: CascadePolicy) -> Self {
        self.cascade = cascade;
        self
    }

    /// Enable one cascade action.
    pub fn cascade_on(mut self, action: CascadeAction) -> Self {
        self.cascade = self.cascade.with(action);
        self
    }

    /// Check whether the relation cascades an action.
    pub fn cascades(&self, action: CascadeAction) -> bool {
        self.cascade.contains(action)
    }
}
