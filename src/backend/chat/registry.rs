/**
 * Fan-out Registry
 *
 * Maps each conversation to the live connections currently subscribed to
 * it. One registry exists per server process and is injected into the
 * gateway through `AppState`.
 *
 * # Delivery
 *
 * Every connection owns a bounded outbound queue. `broadcast` pushes into
 * each queue with `try_send`, so a slow or dead connection can never stall
 * delivery to the others or the relaying task. A full queue drops the
 * frame for that connection only; a closed queue also removes the stale
 * handle. Missed live frames are recovered from history.
 */

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::shared::conversation::ConversationKey;
use crate::shared::message::OutboundFrame;

/// Identifier of one live connection
pub type ConnectionId = Uuid;

/// Sending half of a connection's outbound queue
pub type ConnectionHandle = mpsc::Sender<OutboundFrame>;

/// Result of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub dropped: usize,
}

type Groups = HashMap<ConversationKey, HashMap<ConnectionId, ConnectionHandle>>;

/// Conversation to live-connection mapping
#[derive(Debug, Default)]
pub struct FanoutRegistry {
    groups: Mutex<Groups>,
}

impl FanoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn groups(&self) -> MutexGuard<'_, Groups> {
        self.groups.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn join(&self, key: ConversationKey, connection: ConnectionId, handle: ConnectionHandle) {
        let count = {
            let mut groups = self.groups();
            let group = groups.entry(key).or_default();
            group.insert(connection, handle);
            group.len()
        };
        tracing::info!("[Registry] Connection {} joined {} ({} subscribers)", connection, key, count);
    }

    /// Remove a connection; returns whether it was registered
    pub fn leave(&self, key: ConversationKey, connection: ConnectionId) -> bool {
        let mut groups = self.groups();
        let Some(group) = groups.get_mut(&key) else {
            return false;
        };
        let removed = group.remove(&connection).is_some();
        if group.is_empty() {
            groups.remove(&key);
        }
        drop(groups);

        if removed {
            tracing::info!("[Registry] Connection {} left {}", connection, key);
        }
        removed
    }

    /// Deliver `frame` to every connection joined to `key` right now
    pub fn broadcast(&self, key: ConversationKey, frame: &OutboundFrame) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let mut groups = self.groups();
        let Some(group) = groups.get_mut(&key) else {
            return report;
        };

        group.retain(|connection, handle| match handle.try_send(frame.clone()) {
            Ok(()) => {
                report.delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!("[Registry] Outbound queue full for {}, frame dropped", connection);
                report.dropped += 1;
                true
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!("[Registry] Connection {} is gone, removing it from {}", connection, key);
                report.dropped += 1;
                false
            }
        });
        if group.is_empty() {
            groups.remove(&key);
        }

        report
    }

    pub fn subscriber_count(&self, key: ConversationKey) -> usize {
        self.groups().get(&key).map_or(0, HashMap::len)
    }

    /// Whether `connection` is registered under any conversation
    pub fn contains(&self, connection: ConnectionId) -> bool {
        self.groups().values().any(|group| group.contains_key(&connection))
    }

    /// Total number of registered connections
    pub fn connection_count(&self) -> usize {
        self.groups().values().map(HashMap::len).sum()
    }

    /// Number of conversations with at least one connection
    pub fn conversation_count(&self) -> usize {
        self.groups().len()
    }
}
