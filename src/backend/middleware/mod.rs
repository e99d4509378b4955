//! Middleware Module
//!
//! Request processing shared by the HTTP handlers.
//!
//! - **`auth`** - Bearer-token extractor for protected routes

pub mod auth;

pub use auth::{bearer_token, AuthParticipant};
