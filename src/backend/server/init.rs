/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including state creation, database loading, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Connect to PostgreSQL and run migrations, if a database is configured
 * 2. Pick the store and directory: PostgreSQL-backed, or in-memory
 * 3. Wire `AppState` around them
 * 4. Start the periodic cleanup task
 * 5. Create the router
 *
 * # In-Memory Mode
 *
 * Without a database the server keeps messages in process memory and uses
 * an open directory that accepts any participant named by a valid token.
 */

use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::backend::auth::{InMemoryDirectory, PgDirectory};
use crate::backend::chat::store::{InMemoryStore, PgMessageStore};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;

/// Build the application state for `config`
pub async fn build_state(config: ServerConfig) -> AppState {
    match load_database(&config).await {
        Some(pool) => {
            tracing::info!("[Server] Using PostgreSQL message store");
            AppState::new(
                config,
                Arc::new(PgMessageStore::new(pool.clone())),
                Arc::new(PgDirectory::new(pool.clone())),
            )
            .with_db_pool(pool)
        }
        None => {
            tracing::warn!("[Server] Using in-memory message store, messages are lost on restart");
            AppState::new(
                config,
                Arc::new(InMemoryStore::new()),
                Arc::new(InMemoryDirectory::open()),
            )
        }
    }
}

/// Create and configure the Axum application
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
///
/// # Error Handling
///
/// The function is designed to be resilient:
/// - Missing database: Server continues on the in-memory store
/// - Migration failures: Logged but don't prevent startup
pub async fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!("[Server] Initializing marketchat backend");

    let state = build_state(config).await;
    spawn_cleanup_task(&state);

    let app = create_router(state);
    tracing::info!("[Server] Router configured with periodic cleanup task");
    app
}

/// Periodically reclaim notification channels without consumers and
/// conversation locks nobody holds
pub fn spawn_cleanup_task(state: &AppState) -> JoinHandle<()> {
    let notifications = state.notifications.clone();
    let locks = state.locks.clone();
    let period = Duration::from_secs(state.config.cleanup_interval_secs);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let channels = notifications.cleanup_inactive_channels();
            let idle_locks = locks.cleanup_idle();
            tracing::debug!(
                "[Server] Cleanup removed {} notification channels and {} conversation locks",
                channels,
                idle_locks
            );
        }
    })
}
