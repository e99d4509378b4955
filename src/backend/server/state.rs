/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct is the one place the server's long-lived
 * components are owned:
 * - The message store and participant directory (in-memory or PostgreSQL)
 * - The identity resolver shared by the gateway and REST endpoints
 * - The fan-out registry and per-conversation locks
 * - The notification hub
 * - The connection limit
 *
 * Everything is behind `Arc` or is itself a cheap handle, so cloning the
 * state per request costs only reference count bumps.
 */

use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::backend::auth::{IdentityResolver, JwtIdentityResolver, ParticipantDirectory};
use crate::backend::chat::gateway::ChatGateway;
use crate::backend::chat::locks::ConversationLocks;
use crate::backend::chat::registry::FanoutRegistry;
use crate::backend::chat::store::MessageStore;
use crate::backend::chat::threads::ThreadService;
use crate::backend::notify::NotificationHub;
use crate::backend::server::config::ServerConfig;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,

    /// Durable message log
    pub store: Arc<dyn MessageStore>,

    /// Participant existence and display names
    pub directory: Arc<dyn ParticipantDirectory>,

    /// Bearer credential resolution
    pub resolver: Arc<dyn IdentityResolver>,

    /// Live connections per conversation
    pub registry: Arc<FanoutRegistry>,

    /// Relay serialisation per conversation
    pub locks: Arc<ConversationLocks>,

    pub gateway: ChatGateway,

    pub threads: ThreadService,

    /// Notification bridge channels
    pub notifications: NotificationHub,

    /// Permits for open chat connections
    pub connection_limit: Arc<Semaphore>,

    /// Database connection pool
    ///
    /// This is `None` when the server runs on the in-memory store.
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// Wire the components around a store and directory
    ///
    /// The identity resolver is a `JwtIdentityResolver` built from the
    /// configured secret and missing-kind policy.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn MessageStore>,
        directory: Arc<dyn ParticipantDirectory>,
    ) -> Self {
        let resolver: Arc<dyn IdentityResolver> = Arc::new(JwtIdentityResolver::new(
            config.jwt_secret.clone(),
            config.missing_kind_policy,
            directory.clone(),
        ));
        Self::with_resolver(config, store, directory, resolver)
    }

    pub fn with_resolver(
        config: ServerConfig,
        store: Arc<dyn MessageStore>,
        directory: Arc<dyn ParticipantDirectory>,
        resolver: Arc<dyn IdentityResolver>,
    ) -> Self {
        let registry = Arc::new(FanoutRegistry::new());
        let locks = Arc::new(ConversationLocks::new());
        let gateway = ChatGateway::new(
            resolver.clone(),
            directory.clone(),
            store.clone(),
            registry.clone(),
            locks.clone(),
            config.max_message_length,
        );
        let threads = ThreadService::new(store.clone(), directory.clone());

        Self {
            connection_limit: Arc::new(Semaphore::new(config.max_connections)),
            config: Arc::new(config),
            store,
            directory,
            resolver,
            registry,
            locks,
            gateway,
            threads,
            notifications: NotificationHub::new(),
            db_pool: None,
        }
    }

    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

impl FromRef<AppState> for ChatGateway {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.gateway.clone()
    }
}

impl FromRef<AppState> for ThreadService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.threads.clone()
    }
}

impl FromRef<AppState> for NotificationHub {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.notifications.clone()
    }
}

/// Implement FromRef for Option<PgPool>
impl FromRef<AppState> for Option<PgPool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}
