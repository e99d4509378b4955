//! Conversation Addressing
//!
//! Every conversation is strictly two-party: one customer and one provider.
//! [`ConversationKey`] is the canonical address of that pair. It can only be
//! built from the two ids (never parsed from a display string), and it is
//! the same value whichever order the pair is given in.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::error::SharedError;
use crate::shared::message::Message;
use crate::shared::participant::{Participant, ParticipantId};

/// Canonical, order-independent address of a customer/provider conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationKey {
    customer_id: ParticipantId,
    provider_id: ParticipantId,
}

impl ConversationKey {
    /// Address the conversation between a customer and a provider
    pub fn new(customer_id: ParticipantId, provider_id: ParticipantId) -> Self {
        Self {
            customer_id,
            provider_id,
        }
    }

    /// Address the conversation between two participants, in either order
    ///
    /// Fails when both participants are of the same kind, since no
    /// conversation can exist between them.
    pub fn between(a: Participant, b: Participant) -> Result<Self, SharedError> {
        match (a, b) {
            (Participant::Customer(c), Participant::Provider(p))
            | (Participant::Provider(p), Participant::Customer(c)) => Ok(Self::new(c, p)),
            _ => Err(SharedError::validation(
                "participants",
                format!("no conversation can exist between {} and {}", a, b),
            )),
        }
    }

    pub fn customer(&self) -> Participant {
        Participant::Customer(self.customer_id)
    }

    pub fn provider(&self) -> Participant {
        Participant::Provider(self.provider_id)
    }

    pub fn customer_id(&self) -> ParticipantId {
        self.customer_id
    }

    pub fn provider_id(&self) -> ParticipantId {
        self.provider_id
    }

    /// Whether the participant is one of the two sides
    pub fn involves(&self, participant: Participant) -> bool {
        participant == self.customer() || participant == self.provider()
    }

    /// The side that is not `participant`, if `participant` is a side at all
    pub fn other_side(&self, participant: Participant) -> Option<Participant> {
        if participant == self.customer() {
            Some(self.provider())
        } else if participant == self.provider() {
            Some(self.customer())
        } else {
            None
        }
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.customer(), self.provider())
    }
}

/// Per-participant view of one conversation, derived from the message log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub key: ConversationKey,
    pub counterpart: Participant,
    /// Display name of the counterpart, when the directory knows one
    pub counterpart_name: Option<String>,
    pub last_message: Message,
    pub last_message_at: chrono::DateTime<chrono::Utc>,
    /// Messages addressed to the viewer that are still unread
    pub unread_count: u64,
}
