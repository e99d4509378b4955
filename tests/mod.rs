//! Test suite for marketchat
//!
//! - **`common`** - fixtures and assertion macros
//! - **`integration`** - REST endpoints and the notification bridge through the router
//! - **`e2e`** - live WebSocket connections against a served router
//! - **`property`** - property-based tests over addressing and the message log

mod common;
mod integration;
