//! Inclusion list lookups for delete cascades.

use cascade_proto::{CascadeOptions, Inclusion};

use crate::catalog::EntitySchema;

/// Resolve the scope the caller gave a relation.
///
/// Entries are folded in order, so when a relation is named more than once
/// the last entry wins. Returns `None` when no entry names the relation.
pub fn resolve<'a>(relation: &str, include: &'a [Inclusion]) -> Option<&'a CascadeOptions> {
    include
        .iter()
        .filter(|entry| entry.relation == relation)
        .fold(None, |_, entry| Some(&entry.scope))
}

/// Entries naming relations the entity type does not declare.
pub fn undeclared<'a>(
    schema: &'a EntitySchema,
    include: &'a [Inclusion],
) -> impl Iterator<Item = &'a Inclusion> + 'a {
    include
        .iter()
        .filter(move |entry| schema.relation(&entry.relation).is_none())
}
