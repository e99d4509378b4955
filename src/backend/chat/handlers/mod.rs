//! Chat Handlers Module
//!
//! Request/response endpoints over the message store. Live delivery goes
//! through the gateway instead.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── threads.rs  - GET /api/chat/threads
//! └── history.rs  - GET /api/chat/history/{id}, POST /api/chat/mark-read/{id}
//! ```
//!
//! Every handler authenticates with the `AuthParticipant` extractor.

pub mod history;
pub mod threads;

pub use history::{get_history, mark_read};
pub use threads::list_threads;
