//! Entity payloads: ordered property lists whose values may nest entities.

use std::fmt;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::value::Value;

/// The value held by one entity property.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A scalar value, stored as-is by a raw executor.
    Value(Value),
    /// A single nested entity (one-cardinality relation payload).
    Entity(Entity),
    /// A list of nested entities (many-cardinality relation payload).
    Entities(Vec<Entity>),
}

impl FieldValue {
    /// Check whether this value is relation-shaped (a nested entity or entity list).
    pub fn is_relation(&self) -> bool {
        matches!(self, FieldValue::Entity(_) | FieldValue::Entities(_))
    }

    /// Get the scalar value, if this is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldValue::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Iterate the nested entities of a relation-shaped value.
    ///
    /// A single entity yields itself; a scalar yields nothing.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        let slice: &[Entity] = match self {
            FieldValue::Entity(entity) => std::slice::from_ref(entity),
            FieldValue::Entities(entities) => entities,
            FieldValue::Value(_) => &[],
        };
        slice.iter()
    }

    /// Convert to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Value(v) => v.to_json(),
            FieldValue::Entity(entity) => entity.to_json(),
            FieldValue::Entities(entities) => {
                serde_json::Value::Array(entities.iter().map(Entity::to_json).collect())
            }
        }
    }

    /// Convert a JSON value into a field value.
    ///
    /// Objects become nested entities and arrays of objects become entity
    /// lists. An empty array is treated as an empty entity list.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, Error> {
        match json {
            serde_json::Value::Object(_) => Ok(FieldValue::Entity(Entity::from_json(json)?)),
            serde_json::Value::Array(items)
                if items.is_empty() || items.iter().all(serde_json::Value::is_object) =>
            {
                items
                    .iter()
                    .map(Entity::from_json)
                    .collect::<Result<Vec<_>, _>>()
                    .map(FieldValue::Entities)
            }
            other => Value::from_json(other).map(FieldValue::Value),
        }
    }
}

macro_rules! scalar_field_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(v: $ty) -> Self {
                    FieldValue::Value(v.into())
                }
            }
        )*
    };
}

scalar_field_value!(Value, bool, i32, i64, f64, String, &str, [u8; 16], Vec<String>);

impl From<Entity> for FieldValue {
    fn from(entity: Entity) -> Self {
        FieldValue::Entity(entity)
    }
}

impl From<Vec<Entity>> for FieldValue {
    fn from(entities: Vec<Entity>) -> Self {
        FieldValue::Entities(entities)
    }
}

/// An entity payload: an ordered list of named properties.
///
/// Setting an existing property replaces its value in place, so property
/// order follows first insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    fields: Vec<(String, FieldValue)>,
}

impl Entity {
    /// Create an empty entity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style property setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a property, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Get a property.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get a scalar property.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(FieldValue::as_value)
    }

    /// Check whether a property is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove a property, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let pos = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(pos).1)
    }

    /// Iterate properties in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether the entity has no properties.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert to a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(n, v)| (n.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Convert a JSON object into an entity.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, Error> {
        let object = json
            .as_object()
            .ok_or_else(|| Error::InvalidPayload(format!("expected an object, got {json}")))?;

        let mut entity = Entity::new();
        for (name, value) in object {
            let value = FieldValue::from_json(value)
                .map_err(|e| Error::InvalidPayload(format!("property `{name}`: {e}")))?;
            entity.set(name.clone(), value);
        }
        Ok(entity)
    }
}

impl FromIterator<(String, FieldValue)> for Entity {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut entity = Entity::new();
        for (name, value) in iter {
            entity.set(name, value);
        }
        entity
    }
}

impl TryFrom<serde_json::Value> for Entity {
    type Error = Error;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        Entity::from_json(&json)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, &value.to_json())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Entity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Entity::from_json(&json).map_err(serde::de::Error::custom)
    }
}
