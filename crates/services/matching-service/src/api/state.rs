//! Application state - Dependency injection container.

use std::sync::Arc;

use common::JwtConfig;

use crate::infra::{Database, Persistence};
use crate::service::{AuthService, Authenticator, MatchingEngine, MatchingService};

/// Application state containing all services.
#[derive(Clone)]
pub struct AppState {
    /// Registration, login and session resolution
    pub auth_service: Arc<dyn AuthService>,
    /// Request/donation state machine
    pub matching_service: Arc<dyn MatchingService>,
    /// Database handle, for health checks
    pub database: Arc<Database>,
}

impl AppState {
    /// Wire the services over one shared unit of work.
    pub fn from_config(database: Arc<Database>, jwt: JwtConfig) -> Self {
        let uow = Arc::new(Persistence::new(database.get_connection()));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), jwt)),
            matching_service: Arc::new(MatchingEngine::new(uow)),
            database,
        }
    }

    /// Create application state with manually injected services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        matching_service: Arc<dyn MatchingService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            matching_service,
            database,
        }
    }
}
