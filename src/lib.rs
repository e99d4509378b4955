//! Marketchat - Main Library
//!
//! Real-time messaging between the two participant kinds of a services
//! marketplace: individual customers and provider organizations.
//!
//! # Overview
//!
//! This library provides:
//! - Deterministic, order-independent conversation addressing
//! - A durable, ordered message log with unread bookkeeping
//! - Live fan-out of persisted messages over WebSockets
//! - Per-participant conversation summaries
//! - A notification bridge for workflow status events
//!
//! # Module Structure
//!
//! - **`shared`** - Transport-agnostic types
//!   - Participants, conversation keys, messages, frames, events
//!   - Error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server, WebSocket gateway, SSE notification stream
//!   - JWT identity resolution
//!   - In-memory and PostgreSQL message stores
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the `backend` module and the server binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use marketchat::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(ServerConfig::load()?).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types used by the server and its clients
pub mod shared;

/// Server-side code
#[cfg(feature = "ssr")]
pub mod backend;
