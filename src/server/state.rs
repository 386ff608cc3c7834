//! Shared application state

use crate::auth::AuthService;
use crate::config::Config;
use crate::server::middleware::RateLimitStore;
use crate::services::email::{EmailNotifier, LogEmailNotifier};
use crate::storage::{AccountStore, MemoryAccountStore};
use std::sync::Arc;

/// State shared across all workers
pub struct AppState {
    /// Validated service configuration
    pub config: Arc<Config>,
    /// Authentication flows
    pub auth: Arc<AuthService>,
    /// Account persistence
    pub store: Arc<dyn AccountStore>,
    /// Rate limiter counters, one store per server instance
    pub rate_limits: Arc<RateLimitStore>,
}

impl AppState {
    /// Build state with the default collaborators
    pub fn new(config: Config) -> Self {
        Self::with_collaborators(
            config,
            Arc::new(MemoryAccountStore::new()),
            Arc::new(LogEmailNotifier),
        )
    }

    /// Build state with injected collaborators (used by tests)
    pub fn with_collaborators(
        config: Config,
        store: Arc<dyn AccountStore>,
        email: Arc<dyn EmailNotifier>,
    ) -> Self {
        let auth = Arc::new(AuthService::new(&config.auth, store.clone(), email));
        Self {
            config: Arc::new(config),
            auth,
            store,
            rate_limits: Arc::new(RateLimitStore::new()),
        }
    }
}
