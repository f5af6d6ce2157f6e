//! Cascading delete.

use cascade_proto::{CascadeOptions, Count, Entity, FilterExpr, Value};
use tracing::{debug, info, instrument, warn};

use super::engine::{display_id, CascadeEngine};
use super::{first_error, inclusion, matcher, settle};
use crate::catalog::{CascadeAction, RelationDescriptor};
use crate::error::Error;
use crate::query::FilterEvaluator;

/// Rows removed by one delete call.
#[derive(Debug, Clone, Copy, Default)]
struct Deleted {
    /// Rows of the addressed entity type.
    parents: Count,
    /// Parents plus every cascaded row.
    total: Count,
}

impl CascadeEngine {
    /// Delete matching rows, cascading into the relations named in `options.include`.
    ///
    /// `filter` is ANDed with `options.where_clause`. Each included relation
    /// that cascades deletes receives `key_to IN {parent key_from values}`
    /// with the inclusion entry's scope as its options. The returned count
    /// sums parents and every cascaded row.
    #[instrument(skip(self, filter, options), fields(entity = %self.entity.name()))]
    pub async fn delete_all(
        &self,
        filter: Option<FilterExpr>,
        options: &CascadeOptions,
    ) -> Result<Count, Error> {
        self.delete_matching(filter, options)
            .await
            .map(|deleted| deleted.total)
    }

    /// Delete one entity by its identity value.
    pub async fn delete(&self, entity: &Entity, options: &CascadeOptions) -> Result<Count, Error> {
        let id = entity
            .value(self.entity.identity())
            .filter(|id| !id.is_null())
            .cloned()
            .ok_or_else(|| Error::MissingIdentity {
                entity: self.entity.name().to_string(),
            })?;
        self.delete_by_id(id, options).await
    }

    /// Delete one entity by identity. Fails with [`Error::NotFound`] when no row matched.
    pub async fn delete_by_id(
        &self,
        id: impl Into<Value>,
        options: &CascadeOptions,
    ) -> Result<Count, Error> {
        let id = id.into();
        let deleted = self
            .delete_matching(Some(self.identity_filter(id.clone())), options)
            .await?;

        if deleted.parents.count == 0 {
            return Err(Error::NotFound {
                entity: self.entity.name().to_string(),
                id: display_id(&id),
            });
        }
        Ok(deleted.total)
    }

    async fn delete_matching(
        &self,
        filter: Option<FilterExpr>,
        options: &CascadeOptions,
    ) -> Result<Deleted, Error> {
        let filter = FilterExpr::conjoin(filter, options.where_clause.clone());

        if !options.has_inclusions() {
            let parents = self.executor.delete_all(filter.as_ref()).await?;
            debug!(entity = self.entity.name(), count = parents.count, "no inclusions");
            return Ok(Deleted {
                parents,
                total: parents,
            });
        }

        // Relation keys are gone once the parents are deleted
        let snapshot = self.executor.find(filter.as_ref()).await?;
        let parents = self.executor.delete_all(filter.as_ref()).await?;
        let mut deleted = Deleted {
            parents,
            total: parents,
        };

        if snapshot.is_empty() {
            debug!(entity = self.entity.name(), "nothing matched");
            return Ok(deleted);
        }

        for entry in inclusion::undeclared(&self.entity, &options.include) {
            warn!(
                entity = self.entity.name(),
                relation = %entry.relation,
                "inclusion names an undeclared relation"
            );
        }

        let branches = self
            .entity
            .cascading(CascadeAction::Delete)
            .filter_map(|relation| {
                inclusion::resolve(&relation.name, &options.include)
                    .map(|scope| self.delete_branch(relation, scope, &snapshot))
            })
            .collect();
        let (outcomes, error) = first_error(settle(self.config(), branches).await);

        if let Some(e) = error {
            warn!(entity = self.entity.name(), error = %e, "cascade delete failed");
            return Err(e);
        }

        deleted.total += outcomes.into_iter().flatten().sum::<Count>();
        info!(
            entity = self.entity.name(),
            parents = deleted.parents.count,
            count = deleted.total.count,
            "cascade delete complete"
        );
        Ok(deleted)
    }

    async fn delete_branch(
        &self,
        relation: &RelationDescriptor,
        scope: &CascadeOptions,
        snapshot: &[Entity],
    ) -> Result<Count, Error> {
        let keys = distinct_keys(relation, snapshot);
        if keys.is_empty() {
            debug!(relation = %relation.name, "no parent keys to cascade");
            return Ok(Count::default());
        }

        let target = self
            .repositories
            .target(self.entity.name(), &relation.name)?;
        let children_where = FilterExpr::in_values(relation.key_to.clone(), keys);
        let count = target
            .repository
            .delete_all(Some(children_where), scope)
            .await?;

        debug!(
            relation = %relation.name,
            target = %relation.target_type,
            count = count.count,
            "deleted related rows"
        );
        Ok(count)
    }
}

/// Non-null `key_from` values of the snapshot, first occurrence order.
fn distinct_keys(relation: &RelationDescriptor, snapshot: &[Entity]) -> Vec<Value> {
    let mut keys: Vec<Value> = Vec::new();
    for key in snapshot.iter().filter_map(|row| matcher::parent_key(relation, row)) {
        if !keys.iter().any(|k| FilterEvaluator::values_equal(k, key)) {
            keys.push(key.clone());
        }
    }
    keys
}
