//! Where-clause predicates.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Filter expression for selecting entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterExpr {
    /// Field equals value.
    Eq { field: String, value: Value },
    /// Field not equals value.
    Ne { field: String, value: Value },
    /// Field less than value.
    Lt { field: String, value: Value },
    /// Field less than or equal to value.
    Le { field: String, value: Value },
    /// Field greater than value.
    Gt { field: String, value: Value },
    /// Field greater than or equal to value.
    Ge { field: String, value: Value },
    /// Field is in a set of values.
    In { field: String, values: Vec<Value> },
    /// Field is not in a set of values.
    NotIn { field: String, values: Vec<Value> },
    /// Field is null.
    IsNull { field: String },
    /// Field is not null.
    IsNotNull { field: String },
    /// Field matches a LIKE pattern.
    Like { field: String, pattern: String },
    /// Field does not match a LIKE pattern.
    NotLike { field: String, pattern: String },
    /// All conditions must be true.
    And(Vec<FilterExpr>),
    /// At least one condition must be true.
    Or(Vec<FilterExpr>),
}

impl FilterExpr {
    /// Create an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a not-equal filter.
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Ne {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a less-than filter.
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Lt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a less-than-or-equal filter.
    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Le {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a greater-than filter.
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Gt {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a greater-than-or-equal filter.
    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Ge {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an IN filter.
    pub fn in_values(field: impl Into<String>, values: Vec<Value>) -> Self {
        FilterExpr::In {
            field: field.into(),
            values,
        }
    }

    /// Create a NOT IN filter.
    pub fn not_in_values(field: impl Into<String>, values: Vec<Value>) -> Self {
        FilterExpr::NotIn {
            field: field.into(),
            values,
        }
    }

    /// Create an IS NULL filter.
    pub fn is_null(field: impl Into<String>) -> Self {
        FilterExpr::IsNull {
            field: field.into(),
        }
    }

    /// Create an IS NOT NULL filter.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        FilterExpr::IsNotNull {
            field: field.into(),
        }
    }

    /// Create a LIKE filter.
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        FilterExpr::Like {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    /// Create an AND filter.
    pub fn and(exprs: Vec<FilterExpr>) -> Self {
        FilterExpr::And(exprs)
    }

    /// Create an OR filter.
    pub fn or(exprs: Vec<FilterExpr>) -> Self {
        FilterExpr::Or(exprs)
    }

    /// AND two optional predicates, where `None` matches everything.
    ///
    /// Nested `And` lists are flattened so repeated conjoining stays one level deep.
    pub fn conjoin(left: Option<FilterExpr>, right: Option<FilterExpr>) -> Option<FilterExpr> {
        match (left, right) {
            (None, None) => None,
            (Some(expr), None) | (None, Some(expr)) => Some(expr),
            (Some(left), Some(right)) => {
                let mut exprs = Vec::new();
                for expr in [left, right] {
                    match expr {
                        FilterExpr::And(inner) => exprs.extend(inner),
                        other => exprs.push(other),
                    }
                }
                Some(FilterExpr::And(exprs))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conjoin_absent_sides() {
        let expr = FilterExpr::eq("username", "user1");

        assert_eq!(FilterExpr::conjoin(None, None), None);
        assert_eq!(
            FilterExpr::conjoin(Some(expr.clone()), None),
            Some(expr.clone())
        );
        assert_eq!(FilterExpr::conjoin(None, Some(expr.clone())), Some(expr));
    }

    #[test]
    fn test_conjoin_flattens() {
        let left = FilterExpr::and(vec![
            FilterExpr::eq("a", 1i64),
            FilterExpr::eq("b", 2i64),
        ]);
        let right = FilterExpr::is_not_null("c");

        match FilterExpr::conjoin(Some(left), Some(right)) {
            Some(FilterExpr::And(exprs)) => assert_eq!(exprs.len(), 3),
            other => panic!("Expected flat And filter, got {other:?}"),
        }
    }
}
