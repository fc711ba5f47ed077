//! Post-processing and diversity scoring.
//!
//! Cleans a generated batch, drops structural duplicates, enforces
//! include/exclude terms and scores how much ground the final list covers.

pub mod pipeline;
pub mod scoring;
pub mod types;

pub use pipeline::{apply_excludes, PostProcessor};
pub use scoring::DiversityScorer;
pub use types::*;
