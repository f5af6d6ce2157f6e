//! Flat records and matching inserted rows back to their inputs.
//!
//! A raw executor only returns flat rows, so relation payloads have to be
//! recovered from the inputs by structural equality over the type's declared
//! properties. Matching is a heuristic: when two inputs share the same flat
//! projection the last one wins.

use cascade_proto::{Entity, FieldValue, Value};

use crate::catalog::{EntitySchema, RelationDescriptor};
use crate::query::FilterEvaluator;

/// Copy an entity with every relation-shaped property removed.
pub fn flatten(entity: &Entity) -> Entity {
    entity
        .iter()
        .filter(|(_, value)| !value.is_relation())
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// Read declared properties holding an empty array as scalar values.
///
/// An empty JSON array carries no element type and first parses as an empty
/// relation list. A declared property never holds a relation, so the value
/// is kept as an empty scalar array and survives flattening.
pub fn normalize(schema: &EntitySchema, entity: &Entity) -> Entity {
    entity
        .iter()
        .map(|(name, value)| {
            let value = match value {
                FieldValue::Entities(items)
                    if items.is_empty() && schema.property(name).is_some() =>
                {
                    FieldValue::Value(Value::StringArray(Vec::new()))
                }
                other => other.clone(),
            };
            (name.to_string(), value)
        })
        .collect()
}

/// Check whether an inserted row could have come from a candidate input.
///
/// A property the candidate sets must equal the row's value. A property the
/// candidate leaves out matches when the store may have filled it, or when
/// the row holds no value for it either.
pub fn properties_match(schema: &EntitySchema, row: &Entity, candidate: &Entity) -> bool {
    schema.properties().iter().all(|property| {
        let stored = row.value(&property.name);
        match candidate.get(&property.name) {
            Some(FieldValue::Value(Value::Null)) => stored.map_or(true, Value::is_null),
            Some(FieldValue::Value(given)) => {
                stored.is_some_and(|stored| FilterEvaluator::values_equal(stored, given))
            }
            Some(_) => false,
            None if property.has_default_or_generator() => true,
            None => stored.map_or(true, Value::is_null),
        }
    })
}

/// Index of the input an inserted row came from. Last match wins.
pub fn find_origin(schema: &EntitySchema, row: &Entity, inputs: &[Entity]) -> Option<usize> {
    inputs
        .iter()
        .rposition(|candidate| properties_match(schema, row, candidate))
}

/// Overlay a candidate's relation payloads onto an inserted row.
///
/// Scalar values always come from the row.
pub fn merge(row: Entity, candidate: &Entity) -> Entity {
    candidate
        .iter()
        .filter(|(_, value)| value.is_relation())
        .fold(row, |mut merged, (name, value)| {
            merged.set(name, value.clone());
            merged
        })
}

/// Match an inserted row to its input and reattach that input's relation payloads.
///
/// Returns the row with the matched input's index. An unmatched row is
/// returned unchanged.
pub fn match_created(
    schema: &EntitySchema,
    row: Entity,
    inputs: &[Entity],
) -> (Entity, Option<usize>) {
    match find_origin(schema, &row, inputs) {
        Some(index) => (merge(row, &inputs[index]), Some(index)),
        None => (row, None),
    }
}

/// Parent key a relation stamps onto its children, if the parent holds one.
pub fn parent_key<'a>(relation: &RelationDescriptor, parent: &'a Entity) -> Option<&'a Value> {
    parent
        .value(&relation.key_from)
        .filter(|value| !value.is_null())
}

/// Collect the children held at a relation across all parents.
///
/// Arrays are flattened and each child is stamped with its parent's key.
/// Parents without a key value contribute nothing.
pub fn relation_payload(relation: &RelationDescriptor, parents: &[Entity]) -> Vec<Entity> {
    parents
        .iter()
        .filter_map(|parent| {
            let key = parent_key(relation, parent)?;
            let children = parent.get(&relation.name)?;
            Some(children.entities().map(move |child| {
                child.clone().with(relation.key_to.clone(), key.clone())
            }))
        })
        .flatten()
        .collect()
}

/// Children whose `key_to` value equals the given parent key.
pub fn children_of<'a>(
    relation: &'a RelationDescriptor,
    key: &'a Value,
    children: &'a [Entity],
) -> impl Iterator<Item = &'a Entity> + 'a {
    children.iter().filter(move |child| {
        child
            .value(&relation.key_to)
            .is_some_and(|value| FilterEvaluator::values_equal(value, key))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CascadePolicy, DefaultValue, PropertyMetadata};

    fn user() -> EntitySchema {
        EntitySchema::new("User", "id")
            .with_property(PropertyMetadata::identity("id", DefaultValue::AutoIncrement))
            .with_property(PropertyMetadata::new("username"))
            .with_property(PropertyMetadata::optional("parentId"))
            .with_property(
                PropertyMetadata::new("role").with_default(DefaultValue::String("member".into())),
            )
            .with_relation(
                RelationDescriptor::has_many("children", "id", "User", "parentId")
                    .with_cascade(CascadePolicy::all()),
            )
    }

    fn children() -> RelationDescriptor {
        RelationDescriptor::has_many("children", "id", "User", "parentId")
    }

    fn row(id: i64, username: &str) -> Entity {
        Entity::new()
            .with("id", id)
            .with("username", username)
            .with("role", "member")
    }

    #[test]
    fn test_flatten_strips_relations() {
        let input = Entity::new()
            .with("username", "user3")
            .with("children", vec![Entity::new().with("username", "c3")])
            .with("parent", Entity::new().with("username", "p3"));

        let flat = flatten(&input);
        assert_eq!(flat, Entity::new().with("username", "user3"));
        // Input untouched
        assert_eq!(input.len(), 3);
    }

    #[test]
    fn test_match_reattaches_payload() {
        let schema = user();
        let inputs = vec![
            Entity::new().with("username", "a"),
            Entity::new()
                .with("username", "b")
                .with("children", vec![Entity::new().with("username", "b1")]),
        ];

        let (merged, origin) = match_created(&schema, row(2, "b"), &inputs);
        assert_eq!(origin, Some(1));
        assert_eq!(merged.value("id"), Some(&Value::Int64(2)));
        assert_eq!(merged.get("children").unwrap().entities().count(), 1);

        let (merged, origin) = match_created(&schema, row(1, "a"), &inputs);
        assert_eq!(origin, Some(0));
        assert!(!merged.contains("children"));
    }

    #[test]
    fn test_absent_optional_property() {
        let schema = user();
        let input = Entity::new().with("username", "a");

        assert!(properties_match(&schema, &row(1, "a"), &input));
        assert!(properties_match(&schema, &row(1, "a").with("parentId", Value::Null), &input));
        assert!(!properties_match(&schema, &row(1, "a").with("parentId", 9i64), &input));
    }

    #[test]
    fn test_given_values_must_equal() {
        let schema = user();
        let input = Entity::new().with("username", "a").with("role", "admin");

        assert!(!properties_match(&schema, &row(1, "a"), &input));
        assert!(properties_match(&schema, &row(1, "a").with("role", "admin"), &input));
        assert!(!properties_match(&schema, &row(1, "b"), &Entity::new().with("username", "a")));
    }

    #[test]
    fn test_last_match_wins() {
        let schema = user();
        let inputs = vec![
            Entity::new()
                .with("username", "same")
                .with("children", vec![Entity::new().with("username", "first")]),
            Entity::new()
                .with("username", "same")
                .with("children", vec![Entity::new().with("username", "second")]),
        ];

        assert_eq!(find_origin(&schema, &row(1, "same"), &inputs), Some(1));
        let (merged, _) = match_created(&schema, row(1, "same"), &inputs);
        let child = merged.get("children").unwrap().entities().next().unwrap();
        assert_eq!(child.value("username"), Some(&Value::from("second")));
    }

    #[test]
    fn test_unmatched_row_unchanged() {
        let schema = user();
        let inputs = vec![Entity::new()
            .with("username", "other")
            .with("children", Vec::<Entity>::new())];

        let created = row(1, "a");
        assert_eq!(match_created(&schema, created.clone(), &inputs), (created, None));
    }

    #[test]
    fn test_normalize_keeps_empty_scalar_arrays() {
        let schema = user().with_property(PropertyMetadata::optional("tags"));
        let input = Entity::new()
            .with("username", "a")
            .with("tags", Vec::<Entity>::new())
            .with("children", Vec::<Entity>::new());

        let normalized = normalize(&schema, &input);
        assert_eq!(
            normalized.get("tags"),
            Some(&FieldValue::Value(Value::StringArray(Vec::new())))
        );
        assert!(normalized.get("children").unwrap().is_relation());

        let flat = flatten(&normalized);
        assert!(flat.contains("tags"));
        let stored = row(1, "a").with("tags", Value::StringArray(Vec::new()));
        assert!(properties_match(&schema, &stored, &normalized));
        assert!(!properties_match(&schema, &stored, &input));
    }

    #[test]
    fn test_relation_payload_stamps_keys() {
        let relation = children();
        let parents = vec![
            row(1, "a").with(
                "children",
                vec![
                    Entity::new().with("username", "a1"),
                    Entity::new().with("username", "a2"),
                ],
            ),
            row(2, "b"),
            Entity::new()
                .with("username", "keyless")
                .with("children", vec![Entity::new().with("username", "x")]),
            row(3, "c").with("children", vec![Entity::new().with("username", "c1")]),
        ];

        let payload = relation_payload(&relation, &parents);
        let keys: Vec<_> = payload
            .iter()
            .map(|child| child.value("parentId").cloned())
            .collect();
        assert_eq!(
            keys,
            vec![
                Some(Value::Int64(1)),
                Some(Value::Int64(1)),
                Some(Value::Int64(3))
            ]
        );
    }

    #[test]
    fn test_children_of_groups_by_key() {
        let relation = children();
        let created = vec![
            Entity::new().with("id", 10i64).with("parentId", 1i64),
            Entity::new().with("id", 11i64).with("parentId", 2i64),
            Entity::new().with("id", 12i64).with("parentId", 1i64),
        ];

        let key = Value::Int64(1);
        let ids: Vec<_> = children_of(&relation, &key, &created)
            .filter_map(|child| child.value("id").and_then(Value::as_i64))
            .collect();
        assert_eq!(ids, vec![10, 12]);
    }
}
