//! Prospector Core: shared types, configuration and errors.

pub mod config;
pub mod error;
pub mod signature;
pub mod types;

pub use config::{
    CacheSettings, CoverageWeights, ProspectorConfig, RequestLimits, DEFAULT_TOP_K,
    EMAIL_PROVIDERS, MAX_TOP_K,
};
pub use error::{Error, Result};
pub use signature::{PatternSignature, ProviderClass, SEARCH_OPERATORS};
pub use types::*;
