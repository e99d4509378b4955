/**
 * Notification Events
 *
 * This module defines the discrete status events pushed over the
 * notification bridge. They are independent of chat: a workflow component
 * publishes one to a participant, and every bridge consumer currently
 * connected for that participant receives it.
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;
use crate::shared::participant::Participant;

/// Event delivered to bridge consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub message: String,
}

impl NotificationEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Publish request sent by workflow components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    pub participant: Participant,
    pub message: String,
}

impl PublishRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.message.trim().is_empty() {
            return Err(SharedError::validation("message", "notification message cannot be empty"));
        }
        Ok(())
    }
}

/// Publish outcome; `delivered == 0` means nobody was listening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponse {
    pub delivered: usize,
}
