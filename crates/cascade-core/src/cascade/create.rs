//! Cascading create.

use cascade_proto::{CascadeOptions, Entity, FieldValue};
use tracing::{debug, info, instrument, warn};

use super::engine::CascadeEngine;
use super::{first_error, matcher, settle};
use crate::catalog::{CascadeAction, Cardinality, RelationDescriptor};
use crate::error::Error;

impl CascadeEngine {
    /// Create entities along with the nested payloads of create-cascading relations.
    ///
    /// Parents are inserted in one raw call, then each cascading relation
    /// gets one bulk create on its target. Returned parents carry their
    /// persisted children at the relation name: an array for to-many
    /// relations, the single child (or nothing) for to-one relations.
    ///
    /// Writes are not atomic. When a branch fails the parents and any
    /// sibling branches stay persisted and the first failure is returned.
    #[instrument(skip(self, inputs, options), fields(entity = %self.entity.name(), inputs = inputs.len()))]
    pub async fn create_all(
        &self,
        inputs: &[Entity],
        options: &CascadeOptions,
    ) -> Result<Vec<Entity>, Error> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let inputs: Vec<Entity> = inputs
            .iter()
            .map(|input| matcher::normalize(&self.entity, input))
            .collect();
        let records = inputs.iter().map(matcher::flatten).collect();
        let created = self.executor.create_all(records).await?;
        let mut rows: Vec<Entity> = created
            .into_iter()
            .map(|row| self.rebind(row, &inputs))
            .collect();

        let relations: Vec<&RelationDescriptor> =
            self.entity.cascading(CascadeAction::Create).collect();
        let branches = relations
            .iter()
            .map(|relation| self.create_branch(relation, &rows, options))
            .collect();
        let (outcomes, error) = first_error(settle(self.config(), branches).await);

        if let Some(e) = error {
            warn!(entity = self.entity.name(), error = %e, "cascade create failed");
            return Err(e);
        }

        let mut children_created = 0;
        for (relation, children) in relations.into_iter().zip(outcomes) {
            if let Some(Some(children)) = children {
                children_created += children.len();
                attach(relation, &mut rows, &children);
            }
        }

        info!(
            entity = self.entity.name(),
            rows = rows.len(),
            children = children_created,
            "cascade create complete"
        );
        Ok(rows)
    }

    /// Create one entity. See [`CascadeEngine::create_all`].
    pub async fn create(&self, input: &Entity, options: &CascadeOptions) -> Result<Entity, Error> {
        self.create_all(std::slice::from_ref(input), options)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::storage(self.entity.name(), "create returned no row")
            })
    }

    fn rebind(&self, row: Entity, inputs: &[Entity]) -> Entity {
        let (row, origin) = matcher::match_created(&self.entity, row, inputs);
        if self.config().log_matches {
            debug!(entity = self.entity.name(), row = %row, origin = ?origin, "matched created row");
        }
        row
    }

    /// Create the children of one relation. `None` means nothing was sent.
    async fn create_branch(
        &self,
        relation: &RelationDescriptor,
        parents: &[Entity],
        options: &CascadeOptions,
    ) -> Result<Option<Vec<Entity>>, Error> {
        let target = self
            .repositories
            .target(self.entity.name(), &relation.name)?;

        let mut children = matcher::relation_payload(relation, parents);
        if !target.supports_cascade {
            children = children.iter().map(matcher::flatten).collect();
        }
        if children.is_empty() {
            debug!(relation = %relation.name, "no children to create");
            return Ok(None);
        }

        debug!(
            relation = %relation.name,
            target = %relation.target_type,
            children = children.len(),
            "creating related rows"
        );
        let created = target.repository.create_all(&children, options).await?;
        Ok(Some(created))
    }
}

/// Attach persisted children to the parents whose key they carry.
fn attach(relation: &RelationDescriptor, parents: &mut [Entity], children: &[Entity]) {
    for parent in parents.iter_mut() {
        let Some(key) = matcher::parent_key(relation, parent).cloned() else {
            continue;
        };
        let mut group = matcher::children_of(relation, &key, children).cloned();
        match relation.cardinality {
            Cardinality::Many => parent.set(relation.name.clone(), FieldValue::Entities(group.collect())),
            Cardinality::One => match group.next() {
                Some(child) => parent.set(relation.name.clone(), child),
                None => {
                    parent.remove(&relation.name);
                }
            },
        }
    }
}
