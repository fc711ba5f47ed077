//! Runtime orchestrator: runs the query-synthesis pipeline.
//!
//! Exposes the verbs the HTTP layer calls: build, resolve_geography and
//! resolve_context.

pub mod orchestrator;
pub mod types;

pub use orchestrator::{new_request_id, Orchestrator};
pub use types::*;
