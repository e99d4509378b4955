//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! ├── chat_routes.rs  - WebSocket and notification bridge routes
//! └── api_routes.rs   - REST chat endpoints
//! ```

pub mod api_routes;
pub mod chat_routes;
pub mod router;

pub use router::create_router;
