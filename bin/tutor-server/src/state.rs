//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::upstream::CompletionBackend;

/// State shared across all HTTP handlers. Immutable after startup.
pub struct AppState {
    /// Server configuration (env-derived), including the upstream credential.
    pub config: Arc<Config>,
    /// Upstream completion backend selected by `TUTOR_UPSTREAM_MODE`.
    pub backend: Arc<dyn CompletionBackend>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("backend", &self.backend.name())
            .finish()
    }
}
