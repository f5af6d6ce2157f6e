//! Filter evaluation for raw executors.
//!
//! This module provides the `FilterEvaluator` that evaluates where-clause
//! predicates against the scalar properties of a stored row.

use std::collections::HashSet;

use cascade_proto::{Entity, FilterExpr, Value};

/// Extract all field names referenced in a filter expression.
pub fn extract_filter_fields(filter: &FilterExpr) -> HashSet<String> {
    let mut fields = HashSet::new();
    extract_filter_fields_inner(filter, &mut fields);
    fields
}

fn extract_filter_fields_inner(filter: &FilterExpr, fields: &mut HashSet<String>) {
    match filter {
        FilterExpr::Eq { field, .. }
        | FilterExpr::Ne { field, .. }
        | FilterExpr::Lt { field, .. }
        | FilterExpr::Le { field, .. }
        | FilterExpr::Gt { field, .. }
        | FilterExpr::Ge { field, .. }
        | FilterExpr::In { field, .. }
        | FilterExpr::NotIn { field, .. }
        | FilterExpr::IsNull { field }
        | FilterExpr::IsNotNull { field }
        | FilterExpr::Like { field, .. }
        | FilterExpr::NotLike { field, .. } => {
            fields.insert(field.clone());
        }
        FilterExpr::And(exprs) | FilterExpr::Or(exprs) => {
            for expr in exprs {
                extract_filter_fields_inner(expr, fields);
            }
        }
    }
}

/// Evaluates filter expressions against entity data.
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Evaluate an optional filter against an entity. `None` matches every row.
    pub fn matches(filter: Option<&FilterExpr>, entity: &Entity) -> bool {
        filter.map_or(true, |f| Self::evaluate(f, entity))
    }

    /// Evaluate a filter expression against an entity's scalar properties.
    pub fn evaluate(filter: &FilterExpr, entity: &Entity) -> bool {
        match filter {
            FilterExpr::Eq { field, value } => {
                Self::compare_field(entity, field, value, Self::values_equal)
            }
            FilterExpr::Ne { field, value } => {
                Self::compare_field(entity, field, value, |a, b| !Self::values_equal(a, b))
            }
            FilterExpr::Lt { field, value } => Self::compare_field(entity, field, value, |a, b| {
                Self::compare_values(a, b).is_some_and(|ord| ord.is_lt())
            }),
            FilterExpr::Le { field, value } => Self::compare_field(entity, field, value, |a, b| {
                Self::compare_values(a, b).is_some_and(|ord| ord.is_le())
            }),
            FilterExpr::Gt { field, value } => Self::compare_field(entity, field, value, |a, b| {
                Self::compare_values(a, b).is_some_and(|ord| ord.is_gt())
            }),
            FilterExpr::Ge { field, value } => Self::compare_field(entity, field, value, |a, b| {
                Self::compare_values(a, b).is_some_and(|ord| ord.is_ge())
            }),
            FilterExpr::In { field, values } => match entity.value(field) {
                Some(fv) => values.iter().any(|v| Self::values_equal(fv, v)),
                None => false,
            },
            FilterExpr::NotIn { field, values } => match entity.value(field) {
                Some(fv) => !values.iter().any(|v| Self::values_equal(fv, v)),
                None => true, // NULL is not in any set
            },
            FilterExpr::IsNull { field } => {
                matches!(entity.value(field), None | Some(Value::Null))
            }
            FilterExpr::IsNotNull { field } => {
                !matches!(entity.value(field), None | Some(Value::Null))
            }
            FilterExpr::Like { field, pattern } => match entity.value(field) {
                Some(Value::String(s)) => Self::like_match(s, pattern),
                _ => false,
            },
            FilterExpr::NotLike { field, pattern } => match entity.value(field) {
                Some(Value::String(s)) => !Self::like_match(s, pattern),
                _ => true,
            },
            FilterExpr::And(exprs) => exprs.iter().all(|expr| Self::evaluate(expr, entity)),
            FilterExpr::Or(exprs) => exprs.iter().any(|expr| Self::evaluate(expr, entity)),
        }
    }

    /// Compare a field value with a comparator function.
    fn compare_field<F>(entity: &Entity, field: &str, value: &Value, comparator: F) -> bool
    where
        F: FnOnce(&Value, &Value) -> bool,
    {
        match entity.value(field) {
            Some(fv) => comparator(fv, value),
            None => false, // Missing field doesn't match
        }
    }

    /// Check if two values are equal, widening integers and floats.
    pub fn values_equal(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Int32(a), Value::Int64(b)) => (*a as i64) == *b,
            (Value::Int64(a), Value::Int32(b)) => *a == (*b as i64),
            (Value::Float32(a), Value::Float64(b)) => (*a as f64) == *b,
            (Value::Float64(a), Value::Float32(b)) => *a == (*b as f64),
            (a, b) => a == b,
        }
    }

    /// Compare two values, returning their ordering if comparable.
    fn compare_values(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
        match (a, b) {
            (Value::Int32(a), Value::Int32(b)) => Some(a.cmp(b)),
            (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
            (Value::Int32(a), Value::Int64(b)) => Some((*a as i64).cmp(b)),
            (Value::Int64(a), Value::Int32(b)) => Some(a.cmp(&(*b as i64))),
            (Value::Float32(a), Value::Float32(b)) => a.partial_cmp(b),
            (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
            (Value::Float32(a), Value::Float64(b)) => (*a as f64).partial_cmp(b),
            (Value::Float64(a), Value::Float32(b)) => a.partial_cmp(&(*b as f64)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            _ => None, // Incompatible types
        }
    }

    /// Match a string against a SQL LIKE pattern.
    ///
    /// Supports:
    /// - `%` matches zero or more characters
    /// - `_` matches exactly one character
    /// - `\\%` matches literal `%`
    /// - `\\_` matches literal `_`
    pub fn like_match(value: &str, pattern: &str) -> bool {
        let value: Vec<char> = value.chars().collect();
        let pattern: Vec<char> = pattern.chars().collect();
        Self::like_match_from(&value, &pattern)
    }

    fn like_match_from(value: &[char], pattern: &[char]) -> bool {
        match pattern.split_first() {
            None => value.is_empty(),
            Some(('%', rest)) => (0..=value.len()).any(|skip| Self::like_match_from(&value[skip..], rest)),
            Some(('_', rest)) => !value.is_empty() && Self::like_match_from(&value[1..], rest),
            Some(('\\', rest)) => match (rest.split_first(), value.split_first()) {
                (Some((p, rest)), Some((c, tail))) if p == c => Self::like_match_from(tail, rest),
                _ => false,
            },
            Some((p, rest)) => match value.split_first() {
                Some((c, tail)) if c == p => Self::like_match_from(tail, rest),
                _ => false,
            },
        }
    }
}
