//! Application state shared across handlers.

use std::sync::Arc;

use crate::claude::ClaudeClient;
use crate::config::ServerConfig;
use crate::store::DataStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// data store handle, the optional narration client and the configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Arc<dyn DataStore>,
    claude: Option<ClaudeClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The narration client is constructed only when the configuration
    /// carries a Claude API key; without one, `summarize_insights` reports
    /// a degraded narration field.
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<dyn DataStore>) -> Self {
        let claude = config.claude().map(ClaudeClient::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                claude,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a cloned handle to the data store.
    ///
    /// Cloned so callers can move it into blocking tasks for file reads.
    #[must_use]
    pub fn store(&self) -> Arc<dyn DataStore> {
        Arc::clone(&self.inner.store)
    }

    /// Get a reference to the Claude client, when narration is configured.
    #[must_use]
    pub fn claude(&self) -> Option<&ClaudeClient> {
        self.inner.claude.as_ref()
    }
}
