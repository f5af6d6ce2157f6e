//! Predicate evaluation.

mod filter;

pub use filter::{extract_filter_fields, FilterEvaluator};
