//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the server and its clients. These types are used for serialization over
//! the chat WebSocket, the REST endpoints and the notification bridge.
//!
//! # Overview
//!
//! The shared module provides transport-agnostic types that can be used
//! in both server and client code:
//!
//! - **`participant`** - Customer/provider identities
//! - **`conversation`** - Conversation addressing and thread summaries
//! - **`message`** - Persisted messages and live chat frames
//! - **`event`** - Notification bridge events
//! - **`error`** - Validation and serialization errors

/// Participant identities
pub mod participant;

/// Conversation addressing
pub mod conversation;

/// Message data structure and chat frames
pub mod message;

/// Notification bridge events
pub mod event;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use participant::{Participant, ParticipantId, ParticipantKind, ParticipantProfile};
pub use conversation::{ConversationKey, ConversationSummary};
pub use message::{BroadcastFrame, ErrorFrame, InboundFrame, Message, MessageId, OutboundFrame};
pub use event::{NotificationEvent, PublishRequest, PublishResponse};
pub use error::SharedError;
