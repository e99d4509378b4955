/**
 * In-Memory Message Store
 *
 * Process-local implementation of `MessageStore`. Used by the test suite
 * and as the fallback when no database is configured. Messages live only
 * as long as the process.
 *
 * # Ordering
 *
 * A single mutex guards id assignment and insertion, so ids are strictly
 * increasing across the whole store. Timestamps are clamped so they never
 * go backwards even if the wall clock does.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{assert_addressing, MessageStore, StoreError, ThreadRow};
use crate::shared::conversation::ConversationKey;
use crate::shared::message::{Message, MessageId};
use crate::shared::participant::Participant;

#[derive(Debug, Default)]
struct Log {
    last_id: MessageId,
    last_created_at: Option<DateTime<Utc>>,
    conversations: HashMap<ConversationKey, Vec<Message>>,
}

/// In-memory message log
#[derive(Debug, Default)]
pub struct InMemoryStore {
    log: Mutex<Log>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Log> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Total number of stored messages
    pub fn len(&self) -> usize {
        self.log().conversations.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn append(
        &self,
        key: ConversationKey,
        sender: Participant,
        receiver: Participant,
        body: &str,
    ) -> Result<Message, StoreError> {
        assert_addressing(key, sender, receiver);

        let mut log = self.log();
        let now = Utc::now();
        let created_at = match log.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        log.last_id += 1;
        log.last_created_at = Some(created_at);

        let message = Message {
            id: log.last_id,
            conversation: key,
            sender,
            receiver,
            body: body.to_string(),
            created_at,
            is_read: false,
        };
        log.conversations.entry(key).or_default().push(message.clone());

        tracing::debug!("[Store] Appended message {} to {}", message.id, key);
        Ok(message)
    }

    async fn history(&self, key: ConversationKey) -> Result<Vec<Message>, StoreError> {
        Ok(self.log().conversations.get(&key).cloned().unwrap_or_default())
    }

    async fn mark_read(&self, key: ConversationKey, reader: Participant) -> Result<u64, StoreError> {
        let mut log = self.log();
        let Some(messages) = log.conversations.get_mut(&key) else {
            return Ok(0);
        };

        let mut changed = 0;
        for message in messages.iter_mut().filter(|m| m.is_unread_for(reader)) {
            message.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn threads(&self, participant: Participant) -> Result<Vec<ThreadRow>, StoreError> {
        let log = self.log();
        let mut rows: Vec<ThreadRow> = log
            .conversations
            .iter()
            .filter(|(key, _)| key.involves(participant))
            .filter_map(|(key, messages)| {
                let last_message = messages.last()?.clone();
                let unread_count = messages.iter().filter(|m| m.is_unread_for(participant)).count();
                Some(ThreadRow {
                    key: *key,
                    last_message,
                    unread_count: unread_count as u64,
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            b.last_message
                .created_at
                .cmp(&a.last_message.created_at)
                .then(b.last_message.id.cmp(&a.last_message.id))
        });
        Ok(rows)
    }
}
