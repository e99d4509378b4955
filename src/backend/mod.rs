//! Backend Module
//!
//! This module contains all server-side code for the marketplace chat
//! server: an Axum HTTP server with a WebSocket chat gateway, REST
//! endpoints over the message log, and a notification bridge.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - JWT tokens, identity resolution, participant directory
//! - **`middleware`** - Bearer-token extractor for REST endpoints
//! - **`chat`** - Message store, fan-out registry, gateway, thread aggregation
//! - **`notify`** - Notification bridge (SSE consumers, publish endpoint, client)
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication
//! ├── middleware/     - Request extractors
//! ├── chat/           - Chat subsystem
//! ├── notify/         - Notification bridge
//! └── error/          - Error types
//! ```
//!
//! # Concurrency
//!
//! Each live connection runs on its own task. The store, registry and
//! notification hub are shared by all of them; registry and hub state sits
//! behind short-lived `std::sync::Mutex` sections that never span an
//! `.await`. Relays within one conversation are serialised by a
//! per-conversation async lock, so different conversations never wait on
//! each other.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Chat subsystem
pub mod chat;

/// Notification bridge
pub mod notify;

/// Backend error types
pub mod error;

/// Authentication and identity
pub mod auth;

/// Request extractors
pub mod middleware;

/// Re-export commonly used types
pub use error::BackendError;
pub use server::{create_app, AppState, ServerConfig};
