//! Chat Backend Module
//!
//! This module contains all server-side chat functionality.
//!
//! # Architecture
//!
//! The chat module is organized into focused submodules:
//!
//! - **`store`** - Durable message log (in-memory and PostgreSQL)
//! - **`registry`** - Fan-out of live frames to subscribed connections
//! - **`locks`** - Per-conversation append serialisation
//! - **`gateway`** - Live connection state machine and WebSocket driver
//! - **`threads`** - Per-participant conversation summaries
//! - **`handlers`** - REST endpoints for threads, history and read state
//!
//! # Data Flow
//!
//! ```text
//! client --ws--> gateway --append--> store
//!                   |
//!                   +----broadcast--> registry --> every subscribed connection
//! ```

/// Message store trait and implementations
pub mod store;

/// Fan-out registry
pub mod registry;

/// Per-conversation locks
pub mod locks;

/// Connection gateway
pub mod gateway;

/// Thread aggregation
pub mod threads;

/// REST handlers
pub mod handlers;

/// Re-export commonly used types
pub use gateway::{ChatGateway, ChatSession, GatewayError};
pub use registry::FanoutRegistry;
pub use store::{InMemoryStore, MessageStore, PgMessageStore, StoreError, ThreadRow};
pub use threads::ThreadService;
