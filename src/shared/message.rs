/**
 * Message Data Structures
 *
 * This module defines the persisted chat `Message` and the frames exchanged
 * with clients over a live chat connection.
 *
 * # Frames
 *
 * Client to server:
 * ```json
 * {"message": "Hello", "temporaryId": "t1", "counterpartId": 7}
 * ```
 *
 * Server to every subscriber of the conversation:
 * ```json
 * {"message": "Hello", "senderId": 1, "senderType": "customer",
 *  "timestamp": "2024-01-01T00:00:00Z", "messageId": 42, "temporaryId": "t1"}
 * ```
 *
 * Server to the sending connection only, when a relay fails:
 * ```json
 * {"error": "message could not be stored", "temporaryId": "t1"}
 * ```
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::conversation::ConversationKey;
use crate::shared::error::SharedError;
use crate::shared::participant::{Participant, ParticipantId, ParticipantKind};

/// Server-assigned, monotonically increasing message id
pub type MessageId = i64;

/// A persisted chat message
///
/// Created exactly once by the store on a successful append. The only
/// mutation it ever sees is `is_read` flipping from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub conversation: ConversationKey,
    pub sender: Participant,
    pub receiver: Participant,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl Message {
    /// Whether `participant` is the receiving side of this message
    pub fn is_addressed_to(&self, participant: Participant) -> bool {
        self.receiver == participant
    }

    /// Whether this message still counts towards `participant`'s unread total
    pub fn is_unread_for(&self, participant: Participant) -> bool {
        !self.is_read && self.is_addressed_to(participant)
    }
}

/// Inbound chat frame (client to server)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundFrame {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporary_id: Option<String>,
    /// Names the other side when the connection has not joined a
    /// conversation yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterpart_id: Option<ParticipantId>,
}

impl InboundFrame {
    /// Parse and validate a raw text frame
    ///
    /// The body is trimmed. Unparseable JSON, an empty body, or a body
    /// longer than `max_len` bytes is rejected.
    pub fn parse(text: &str, max_len: usize) -> Result<Self, SharedError> {
        let mut frame: InboundFrame = serde_json::from_str(text)?;
        let trimmed = frame.message.trim();
        if trimmed.is_empty() {
            return Err(SharedError::validation("message", "message body cannot be empty"));
        }
        if trimmed.len() > max_len {
            return Err(SharedError::validation(
                "message",
                format!("message body exceeds {} bytes", max_len),
            ));
        }
        frame.message = trimmed.to_string();
        Ok(frame)
    }
}

/// Outbound broadcast frame (server to all subscribers)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastFrame {
    pub message: String,
    pub sender_id: ParticipantId,
    pub sender_type: ParticipantKind,
    pub timestamp: DateTime<Utc>,
    pub message_id: MessageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporary_id: Option<String>,
}

impl BroadcastFrame {
    /// Build the frame for a persisted message, echoing the client's
    /// temporary id unchanged
    pub fn from_message(message: &Message, temporary_id: Option<String>) -> Self {
        Self {
            message: message.body.clone(),
            sender_id: message.sender.id(),
            sender_type: message.sender.kind(),
            timestamp: message.created_at,
            message_id: message.id,
            temporary_id,
        }
    }
}

/// Error frame sent only to the connection whose frame failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorFrame {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporary_id: Option<String>,
}

/// Anything the server writes to a live chat connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundFrame {
    Message(BroadcastFrame),
    Error(ErrorFrame),
}

impl OutboundFrame {
    pub fn error(error: impl Into<String>, temporary_id: Option<String>) -> Self {
        Self::Error(ErrorFrame {
            error: error.into(),
            temporary_id,
        })
    }

    pub fn to_json(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}
