//! Cascade call options and results.

use serde::{Deserialize, Serialize};

use crate::filter::FilterExpr;

/// Options passed to cascading create/delete calls.
///
/// `where_clause` is ANDed with the caller's predicate. `include` names the
/// relations a delete cascades into; each entry's scope becomes the options
/// of the recursive call on the relation's target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CascadeOptions {
    /// Base predicate.
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<FilterExpr>,
    /// Relations to cascade into, in caller order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<Inclusion>,
}

impl CascadeOptions {
    /// Options with no base predicate and no inclusions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base predicate.
    pub fn with_where(mut self, where_clause: FilterExpr) -> Self {
        self.where_clause = Some(where_clause);
        self
    }

    /// Add an inclusion entry with the given scope.
    pub fn include(mut self, relation: impl Into<String>, scope: CascadeOptions) -> Self {
        self.include.push(Inclusion::new(relation).with_scope(scope));
        self
    }

    /// Add an inclusion entry with an unrestricted scope.
    pub fn include_all(mut self, relation: impl Into<String>) -> Self {
        self.include.push(Inclusion::new(relation));
        self
    }

    /// Check whether any inclusion entry is present.
    pub fn has_inclusions(&self) -> bool {
        !self.include.is_empty()
    }
}

/// One inclusion entry: a relation name and the sub-filter for its rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inclusion {
    /// Relation name on the entity type the options are applied to.
    pub relation: String,
    /// Sub-filter for the relation's target rows.
    #[serde(default)]
    pub scope: CascadeOptions,
}

impl Inclusion {
    /// Include a relation without restricting its rows.
    pub fn new(relation: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            scope: CascadeOptions::default(),
        }
    }

    /// Set the scope.
    pub fn with_scope(mut self, scope: CascadeOptions) -> Self {
        self.scope = scope;
        self
    }
}

/// Number of rows affected by a delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    /// Affected row count.
    pub count: u64,
}

impl Count {
    /// Create a count.
    pub fn new(count: u64) -> Self {
        Self { count }
    }
}

impl std::ops::Add for Count {
    type Output = Count;

    fn add(self, other: Count) -> Count {
        Count::new(self.count + other.count)
    }
}

impl std::ops::AddAssign for Count {
    fn add_assign(&mut self, other: Count) {
        self.count += other.count;
    }
}

impl std::iter::Sum for Count {
    fn sum<I: Iterator<Item = Count>>(iter: I) -> Count {
        iter.fold(Count::default(), |acc, c| acc + c)
    }
}
