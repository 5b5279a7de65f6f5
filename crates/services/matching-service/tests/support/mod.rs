//! Shared fixtures: SQLite stores with the real migrations.

#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use common::{DatabaseConfig, JwtConfig};
use domain::{NewFoodRequest, Role, User};
use matching_service_lib::infra::{Database, Persistence};
use matching_service_lib::service::{
    AuthService, Authenticator, MatchingEngine, MatchingService, Registration,
};

pub const PASSWORD: &str = "correct-horse-battery";

/// One pooled connection: every connection to `sqlite::memory:` is its own
/// database.
pub async fn test_database() -> Arc<Database> {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    };
    Arc::new(
        Database::connect(&config)
            .await
            .expect("in-memory database should migrate"),
    )
}

/// A file-backed store behind `connections` pooled connections, so
/// transactions really interleave. The store lives as long as the returned
/// directory.
pub async fn shared_test_database(connections: u32) -> (Arc<Database>, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("matching.db").display()),
        max_connections: connections,
        min_connections: 1,
    };
    let database = Database::connect(&config)
        .await
        .expect("file database should migrate");

    (Arc::new(database), dir)
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-at-least-32-chars".to_string(),
        expiration_hours: 1,
    }
}

/// Services wired over one store, as the server wires them.
pub struct TestApp {
    pub database: Arc<Database>,
    pub auth: Authenticator<Persistence>,
    pub matching: Arc<MatchingEngine<Persistence>>,
    _dir: Option<TempDir>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::over(test_database().await, None)
    }

    /// Services over a store with several connections
    pub async fn shared(connections: u32) -> Self {
        let (database, dir) = shared_test_database(connections).await;
        Self::over(database, Some(dir))
    }

    fn over(database: Arc<Database>, dir: Option<TempDir>) -> Self {
        let uow = Arc::new(Persistence::new(database.get_connection()));

        Self {
            auth: Authenticator::new(uow.clone(), jwt_config()),
            matching: Arc::new(MatchingEngine::new(uow)),
            database,
            _dir: dir,
        }
    }

    pub async fn register(&self, name: &str, role: Role) -> User {
        self.auth
            .register(Registration {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password: PASSWORD.to_string(),
                role,
                organization_name: None,
                location: "Springfield".to_string(),
            })
            .await
            .expect("registration should succeed")
    }

    pub async fn post_request(&self, receiver: &User, food_type: &str, location: &str) -> i32 {
        self.matching
            .submit_request(
                receiver.actor(),
                NewFoodRequest {
                    food_type: food_type.to_string(),
                    quantity: 5,
                    location: location.to_string(),
                    description: String::new(),
                },
            )
            .await
            .expect("request should be created")
            .id
    }
}
