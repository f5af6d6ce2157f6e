//! Cascade-repo payload types.
//!
//! This crate defines the data that flows through a cascading repository:
//!
//! - [`value`] - Scalar runtime values
//! - [`entity`] - Entity payloads whose properties may nest related entities
//! - [`filter`] - Where-clause predicates
//! - [`options`] - Cascade options, inclusion trees, and delete counts
//! - [`error`] - Payload error types
//!
//! Payloads convert to and from `serde_json::Value`, which keeps fixtures short:
//!
//! ```
//! use cascade_proto::{Entity, FieldValue};
//! use serde_json::json;
//!
//! let user = Entity::from_json(&json!({
//!     "username": "user3",
//!     "children": [{"username": "c3"}]
//! }))
//! .unwrap();
//!
//! assert!(matches!(user.get("children"), Some(FieldValue::Entities(c)) if c.len() == 1));
//! ```

pub mod entity;
pub mod error;
pub mod filter;
pub mod options;
pub mod value;

pub use entity::{Entity, FieldValue};
pub use error::Error;
pub use filter::FilterExpr;
pub use options::{CascadeOptions, Count, Inclusion};
pub use value::Value;
