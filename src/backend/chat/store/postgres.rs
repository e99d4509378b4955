/**
 * PostgreSQL Message Store
 *
 * Persists chat messages to the `chat_messages` table. The sender is
 * stored as a kind column next to the conversation's two ids, so the
 * receiver is always derivable and a row can never name two senders or
 * none.
 *
 * # Schema
 *
 * See `migrations/` for the table definition. Ids come from a BIGSERIAL
 * sequence, which keeps concurrent appends from ever sharing an id.
 */

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{assert_addressing, MessageStore, StoreError, ThreadRow};
use crate::shared::conversation::ConversationKey;
use crate::shared::message::Message;
use crate::shared::participant::{Participant, ParticipantKind};

const MESSAGE_COLUMNS: &str = "id, customer_id, provider_id, sender_kind, body, created_at, is_read";

/// Message store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Decode a `chat_messages` row
///
/// # Panics
///
/// When `sender_kind` holds a value outside the two kinds. The column has
/// a CHECK constraint, so this only happens on a corrupted schema.
fn message_from_row(row: &PgRow) -> Result<Message, sqlx::Error> {
    let key = ConversationKey::new(row.try_get("customer_id")?, row.try_get("provider_id")?);
    let sender_kind: String = row.try_get("sender_kind")?;
    let sender_kind: ParticipantKind = sender_kind
        .parse()
        .unwrap_or_else(|e| panic!("chat_messages row holds an invalid sender kind: {}", e));

    let (sender, receiver) = match sender_kind {
        ParticipantKind::Customer => (key.customer(), key.provider()),
        ParticipantKind::Provider => (key.provider(), key.customer()),
    };

    Ok(Message {
        id: row.try_get("id")?,
        conversation: key,
        sender,
        receiver,
        body: row.try_get("body")?,
        created_at: row.try_get("created_at")?,
        is_read: row.try_get("is_read")?,
    })
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn append(
        &self,
        key: ConversationKey,
        sender: Participant,
        receiver: Participant,
        body: &str,
    ) -> Result<Message, StoreError> {
        assert_addressing(key, sender, receiver);

        // created_at is clamped to the conversation's latest timestamp so the
        // log stays non-decreasing
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO chat_messages (customer_id, provider_id, sender_kind, body, created_at)
            VALUES ($1, $2, $3, $4, GREATEST(
                clock_timestamp(),
                COALESCE(
                    (SELECT MAX(created_at) FROM chat_messages WHERE customer_id = $1 AND provider_id = $2),
                    '-infinity'::timestamptz
                )
            ))
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(key.customer_id())
        .bind(key.provider_id())
        .bind(sender.kind().as_str())
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        let message = message_from_row(&row)?;
        tracing::debug!("[Store] Appended message {} to {}", message.id, key);
        Ok(message)
    }

    async fn history(&self, key: ConversationKey) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM chat_messages
            WHERE customer_id = $1 AND provider_id = $2
            ORDER BY created_at ASC, id ASC
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(key.customer_id())
        .bind(key.provider_id())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(message_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn mark_read(&self, key: ConversationKey, reader: Participant) -> Result<u64, StoreError> {
        if !key.involves(reader) {
            return Ok(0);
        }

        // messages addressed to the reader are the ones the other kind sent
        let result = sqlx::query(
            r#"
            UPDATE chat_messages
            SET is_read = TRUE
            WHERE customer_id = $1 AND provider_id = $2
              AND sender_kind <> $3
              AND is_read = FALSE
            "#,
        )
        .bind(key.customer_id())
        .bind(key.provider_id())
        .bind(reader.kind().as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn threads(&self, participant: Participant) -> Result<Vec<ThreadRow>, StoreError> {
        let own_column = match participant.kind() {
            ParticipantKind::Customer => "customer_id",
            ParticipantKind::Provider => "provider_id",
        };

        let rows = sqlx::query(&format!(
            r#"
            SELECT * FROM (
                SELECT DISTINCT ON (m.customer_id, m.provider_id)
                    m.id, m.customer_id, m.provider_id, m.sender_kind, m.body, m.created_at, m.is_read,
                    (
                        SELECT COUNT(*)
                        FROM chat_messages u
                        WHERE u.customer_id = m.customer_id
                          AND u.provider_id = m.provider_id
                          AND u.sender_kind <> $2
                          AND u.is_read = FALSE
                    ) AS unread_count
                FROM chat_messages m
                WHERE m.{} = $1
                ORDER BY m.customer_id, m.provider_id, m.created_at DESC, m.id DESC
            ) latest
            ORDER BY created_at DESC, id DESC
            "#,
            own_column
        ))
        .bind(participant.id())
        .bind(participant.kind().as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let last_message = message_from_row(row)?;
                let unread_count: i64 = row.try_get("unread_count")?;
                Ok(ThreadRow {
                    key: last_message.conversation,
                    last_message,
                    unread_count: unread_count.max(0) as u64,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::from)
    }
}
