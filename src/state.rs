//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::store::RecordStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pub config: Config,
    pub store: RecordStore,
}

impl AppState {
    /// Create a new application state around an already opened store
    pub fn new(config: Config, store: RecordStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the record store
    pub fn store(&self) -> &RecordStore {
        &self.inner.store
    }
}
