use std::sync::Arc;

use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Read-only after startup. Each layout request builds its own grid, so nothing
/// here is mutated per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}
