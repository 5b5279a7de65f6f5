//! Food donation matching service library.
//!
//! Receivers post food requests, donors claim them with a donation, and the
//! receiver confirms delivery. The HTTP surface, the matching state machine
//! and the storage layer live here; pure rules live in the `domain` crate.

pub mod api;
pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::infra::Database;

/// Run the HTTP server, overriding the configured bind address.
pub async fn run_server(
    mut config: Config,
    host: String,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    config.server.host = host;
    config.server.port = port;
    info!(service = %config.server.service_name, "Starting server");

    let database = Arc::new(Database::connect(&config.database).await?);
    let state = AppState::from_config(database, config.jwt);
    let app = create_router(state);

    let addr: SocketAddr = config.server.addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    config: Config,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Resolve on Ctrl+C (and SIGTERM on Unix).
async fn shutdown_signal() {
    let ctrl_c = until_signal(tokio::signal::ctrl_c(), "Ctrl+C");

    #[cfg(unix)]
    let terminate = until_signal(
        async {
            let mut signal =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
            signal.recv().await;
            Ok::<(), std::io::Error>(())
        },
        "SIGTERM",
    );

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Wait for a signal listener. A listener that could not be installed
/// never resolves, so the server keeps running on the remaining ones.
async fn until_signal<F>(listener: F, name: &str)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(e) = listener.await {
        tracing::error!("Failed to install {} handler: {}", name, e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn test_failed_signal_listener_never_resolves() {
        let failed = until_signal(
            async { Err::<(), _>(io::Error::new(io::ErrorKind::Other, "signals unavailable")) },
            "test",
        );
        assert!(timeout(Duration::from_millis(50), failed).await.is_err());
    }

    #[tokio::test]
    async fn test_delivered_signal_resolves() {
        let delivered = until_signal(async { Ok::<(), io::Error>(()) }, "test");
        assert!(timeout(Duration::from_millis(50), delivered).await.is_ok());
    }
}
