//! Thread Aggregation Service
//!
//! Builds each participant's conversation list straight from the message
//! store on every call. Nothing is cached, so unread counts can never lag
//! behind the log.

use std::sync::Arc;

use crate::backend::auth::ParticipantDirectory;
use crate::backend::chat::store::{MessageStore, StoreError};
use crate::shared::conversation::ConversationSummary;
use crate::shared::participant::Participant;

#[derive(Clone)]
pub struct ThreadService {
    store: Arc<dyn MessageStore>,
    directory: Arc<dyn ParticipantDirectory>,
}

impl ThreadService {
    pub fn new(store: Arc<dyn MessageStore>, directory: Arc<dyn ParticipantDirectory>) -> Self {
        Self { store, directory }
    }

    /// Conversations `participant` appears in, most recently active first
    pub async fn list_threads(&self, participant: Participant) -> Result<Vec<ConversationSummary>, StoreError> {
        let rows = self.store.threads(participant).await?;
        let mut summaries = Vec::with_capacity(rows.len());

        for row in rows {
            let Some(counterpart) = row.key.other_side(participant) else {
                tracing::error!("[Threads] Store returned {} for unrelated {}", row.key, participant);
                continue;
            };

            // a missing name is not worth failing the whole list over
            let counterpart_name = match self.directory.lookup(counterpart).await {
                Ok(profile) => profile.and_then(|p| p.display_name),
                Err(e) => {
                    tracing::warn!("[Threads] Could not look up {}: {}", counterpart, e);
                    None
                }
            };

            summaries.push(ConversationSummary {
                key: row.key,
                counterpart,
                counterpart_name,
                last_message_at: row.last_message.created_at,
                last_message: row.last_message,
                unread_count: row.unread_count,
            });
        }

        Ok(summaries)
    }
}
