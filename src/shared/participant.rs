//! Participant Identity
//!
//! A participant is either an individual customer or a provider
//! organization. Both kinds draw ids from independent namespaces, so an id
//! is only meaningful together with its kind.
//!
//! # Wire Format
//!
//! Participants serialize as a tagged object:
//!
//! ```json
//! { "type": "customer", "id": 1 }
//! { "type": "provider", "id": 7 }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::SharedError;

/// Numeric participant id, scoped by [`ParticipantKind`].
pub type ParticipantId = i64;

/// The two kinds of chat participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    /// Individual customer
    Customer,
    /// Service-provider organization
    Provider,
}

impl ParticipantKind {
    /// The kind on the other side of a conversation
    pub fn opposite(self) -> Self {
        match self {
            Self::Customer => Self::Provider,
            Self::Provider => Self::Customer,
        }
    }

    /// Stable lowercase name, used for storage columns and claims
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Provider => "provider",
        }
    }
}

impl fmt::Display for ParticipantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantKind {
    type Err = SharedError;

    /// Accepts the current names and the legacy `user` / `workshop` tags.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" | "user" => Ok(Self::Customer),
            "provider" | "workshop" => Ok(Self::Provider),
            other => Err(SharedError::validation(
                "type",
                format!("unknown participant kind '{}'", other),
            )),
        }
    }
}

/// A chat participant: exactly one of customer or provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum Participant {
    Customer(ParticipantId),
    Provider(ParticipantId),
}

impl Participant {
    pub fn new(kind: ParticipantKind, id: ParticipantId) -> Self {
        match kind {
            ParticipantKind::Customer => Self::Customer(id),
            ParticipantKind::Provider => Self::Provider(id),
        }
    }

    pub fn kind(&self) -> ParticipantKind {
        match self {
            Self::Customer(_) => ParticipantKind::Customer,
            Self::Provider(_) => ParticipantKind::Provider,
        }
    }

    pub fn id(&self) -> ParticipantId {
        match self {
            Self::Customer(id) | Self::Provider(id) => *id,
        }
    }

    /// The participant of the opposite kind with the given id
    pub fn counterpart(&self, id: ParticipantId) -> Self {
        Self::new(self.kind().opposite(), id)
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Directory entry for a participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantProfile {
    pub participant: Participant,
    pub display_name: Option<String>,
}

impl ParticipantProfile {
    pub fn new(participant: Participant) -> Self {
        Self {
            participant,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}
