//! Connection Gateway
//!
//! - **`session`** - the per-connection state machine and the relay path
//! - **`socket`** - the axum WebSocket driver for `/ws/chat`

pub mod session;
pub mod socket;

pub use session::{ChatGateway, ChatSession, GatewayError, SessionState};
pub use socket::handle_chat_socket;
