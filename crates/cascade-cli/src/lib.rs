//! Demo runner for cascading create and delete.
//!
//! Builds a `User` schema with a `parent`/`children` self-relation on the
//! in-memory store and runs the documented cascade scenarios.

pub mod config;
pub mod error;
pub mod scenario;

pub use config::{Args, CliConfig, Scenario};
pub use error::Error;
pub use scenario::{run, Demo, Report};
