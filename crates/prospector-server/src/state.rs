//! Shared application state.

use chrono::{DateTime, Utc};
use prospector_core::ProspectorConfig;
use prospector_runtime::Orchestrator;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: ProspectorConfig,
    pub orchestrator: Orchestrator,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ProspectorConfig, orchestrator: Orchestrator) -> Self {
        Self {
            config,
            orchestrator,
            started_at: Utc::now(),
        }
    }
}
