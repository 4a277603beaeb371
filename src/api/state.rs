//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::items::ItemStore;
use crate::shell::Shell;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Uploaded items
    pub items: Arc<ItemStore>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Built client served alongside the API (production only)
    pub client: Option<Arc<Shell>>,
}

impl AppState {
    /// Create a new AppState serving only the API
    pub fn new(items: Arc<ItemStore>, config: ApiConfig) -> Self {
        Self {
            items,
            config: Arc::new(config),
            start_time: Instant::now(),
            client: None,
        }
    }

    /// Create AppState that also serves the built client
    pub fn with_client(items: Arc<ItemStore>, config: ApiConfig, client: Shell) -> Self {
        Self {
            client: Some(Arc::new(client)),
            ..Self::new(items, config)
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
