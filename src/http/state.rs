use crate::config::Config;
use crate::inspect::InspectStore;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub inspect: Arc<InspectStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            inspect: Arc::new(InspectStore::new()),
        }
    }
}
