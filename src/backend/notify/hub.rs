/**
 * Notification Hub
 *
 * Per-participant broadcast channels for the notification bridge. Each
 * participant with at least one connected bridge consumer has a
 * `tokio::sync::broadcast` channel; every consumer holds a receiver.
 *
 * # Delivery Guarantee
 *
 * Fire-and-forget. An event published to a participant nobody is
 * listening for is dropped and `publish` returns 0. This is the expected
 * outcome, not an error: callers that need the status durably read it from
 * their own state.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

use crate::shared::event::NotificationEvent;
use crate::shared::participant::Participant;

/// Events buffered per participant before slow consumers start lagging
const CHANNEL_CAPACITY: usize = 100;

type Channels = HashMap<Participant, broadcast::Sender<NotificationEvent>>;

#[derive(Clone, Default)]
pub struct NotificationHub {
    channels: Arc<Mutex<Channels>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn channels(&self) -> MutexGuard<'_, Channels> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start receiving events addressed to `participant`
    pub fn subscribe(&self, participant: Participant) -> broadcast::Receiver<NotificationEvent> {
        self.channels()
            .entry(participant)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Push an event to every consumer connected for `participant`
    ///
    /// Returns the number of consumers that received it.
    pub fn publish(&self, participant: Participant, event: NotificationEvent) -> usize {
        let sender = self.channels().get(&participant).cloned();
        let delivered = match sender.map(|sender| sender.send(event)) {
            Some(Ok(count)) => count,
            Some(Err(_)) | None => 0,
        };

        if delivered == 0 {
            tracing::debug!("[Notify] No consumer connected for {}, event dropped", participant);
        } else {
            tracing::info!("[Notify] Event delivered to {} consumers of {}", delivered, participant);
        }
        delivered
    }

    /// Drop channels whose consumers have all gone; returns how many went
    pub fn cleanup_inactive_channels(&self) -> usize {
        let mut channels = self.channels();
        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        before - channels.len()
    }

    pub fn subscriber_count(&self, participant: Participant) -> usize {
        self.channels()
            .get(&participant)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    pub fn channel_count(&self) -> usize {
        self.channels().len()
    }
}
