//! Notification Bridge
//!
//! A side channel, independent of chat, that pushes discrete status events
//! to a participant. Nothing here is persisted.
//!
//! - **`hub`** - per-participant broadcast channels
//! - **`subscription`** - SSE stream for bridge consumers
//! - **`handlers`** - publish endpoint for workflow components
//! - **`client`** - HTTP publisher for components outside this process

pub mod client;
pub mod handlers;
pub mod hub;
pub mod subscription;

pub use client::NotificationClient;
pub use handlers::publish_notification;
pub use hub::NotificationHub;
pub use subscription::handle_notification_stream;
