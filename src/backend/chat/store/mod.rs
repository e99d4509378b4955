//! Message Store
//!
//! The durable, append-only log of chat messages, keyed by
//! [`ConversationKey`]. The store exclusively owns persistence and ordering:
//! ids are assigned here, timestamps are assigned here, and the only
//! mutation a stored message ever sees is its read flag being set.
//!
//! Two implementations ship with the server:
//!
//! - **`memory`** - process-local store used for tests and when no database
//!   is configured
//! - **`postgres`** - PostgreSQL store backed by the `chat_messages` table

use async_trait::async_trait;
use thiserror::Error;

use crate::shared::conversation::ConversationKey;
use crate::shared::message::Message;
use crate::shared::participant::Participant;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgMessageStore;

/// Storage-layer failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store cannot be reached
    #[error("message store unavailable: {0}")]
    Unavailable(String),

    /// The database rejected or failed a query
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One row of the per-participant thread aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRow {
    pub key: ConversationKey,
    pub last_message: Message,
    /// Messages in the conversation addressed to the viewer with `is_read == false`
    pub unread_count: u64,
}

/// Durable message log
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message, assigning its id and timestamp
    ///
    /// # Panics
    ///
    /// When `sender` and `receiver` do not address `key`.
    async fn append(
        &self,
        key: ConversationKey,
        sender: Participant,
        receiver: Participant,
        body: &str,
    ) -> Result<Message, StoreError>;

    /// Every message of the conversation, oldest first
    async fn history(&self, key: ConversationKey) -> Result<Vec<Message>, StoreError>;

    /// Mark every unread message addressed to `reader` as read
    ///
    /// Returns how many messages changed. Calling it again with nothing
    /// unread is a no-op that returns 0.
    async fn mark_read(&self, key: ConversationKey, reader: Participant) -> Result<u64, StoreError>;

    /// One row per conversation `participant` appears in, most recently
    /// active first
    async fn threads(&self, participant: Participant) -> Result<Vec<ThreadRow>, StoreError>;
}

/// Fail fast on a sender/receiver pair that does not address `key`
pub(crate) fn assert_addressing(key: ConversationKey, sender: Participant, receiver: Participant) {
    match ConversationKey::between(sender, receiver) {
        Ok(derived) if derived == key => {}
        _ => panic!(
            "message from {} to {} cannot be stored under conversation {}",
            sender, receiver, key
        ),
    }
}
