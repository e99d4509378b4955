/**
 * Chat Session State Machine
 *
 * A `ChatSession` is the server side of one live connection. It moves
 * through these states:
 *
 * ```text
 * Connecting --resolve ok--> Authenticated --join--> Subscribed --close--> Closed
 *     |                                                                      ^
 *     +----------------------------resolve failed----------------------------+
 * ```
 *
 * `Connecting` is the span of `ChatGateway::connect`: a session value only
 * exists once the credential has resolved, so a refused credential never
 * produces one. A subscribed session belongs to exactly one conversation.
 *
 * # Relay
 *
 * An inbound frame is appended to the store and the persisted message is
 * broadcast to every connection joined to the conversation, the sender's
 * own included. Both steps run under the conversation's append lock. If
 * the append fails nothing is broadcast; only the sending connection gets
 * an error frame.
 */

use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::backend::auth::{AuthError, IdentityResolver, ParticipantDirectory};
use crate::backend::chat::locks::ConversationLocks;
use crate::backend::chat::registry::{ConnectionHandle, ConnectionId, FanoutRegistry};
use crate::backend::chat::store::{MessageStore, StoreError};
use crate::shared::conversation::ConversationKey;
use crate::shared::error::SharedError;
use crate::shared::message::{BroadcastFrame, InboundFrame, Message, OutboundFrame};
use crate::shared::participant::{Participant, ParticipantId};

/// Failures while handling a live connection
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] SharedError),

    #[error("connection has not joined a conversation")]
    NotSubscribed,

    #[error("counterpart {0} not found")]
    CounterpartNotFound(Participant),

    #[error("connection already joined {0}")]
    AlreadySubscribed(ConversationKey),

    #[error("message could not be stored: {0}")]
    Storage(#[from] StoreError),

    #[error("connection is closed")]
    Closed,
}

impl GatewayError {
    /// Text sent to the client in an error frame
    pub fn client_message(&self) -> String {
        match self {
            Self::Storage(_) => "message could not be stored".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Authenticated,
    Subscribed(ConversationKey),
    Closed,
}

/// Shared entry point for live connections
#[derive(Clone)]
pub struct ChatGateway {
    resolver: Arc<dyn IdentityResolver>,
    directory: Arc<dyn ParticipantDirectory>,
    store: Arc<dyn MessageStore>,
    registry: Arc<FanoutRegistry>,
    locks: Arc<ConversationLocks>,
    max_message_length: usize,
}

impl ChatGateway {
    pub fn new(
        resolver: Arc<dyn IdentityResolver>,
        directory: Arc<dyn ParticipantDirectory>,
        store: Arc<dyn MessageStore>,
        registry: Arc<FanoutRegistry>,
        locks: Arc<ConversationLocks>,
        max_message_length: usize,
    ) -> Self {
        Self {
            resolver,
            directory,
            store,
            registry,
            locks,
            max_message_length,
        }
    }

    pub fn registry(&self) -> &Arc<FanoutRegistry> {
        &self.registry
    }

    /// Resolve the credential and open an authenticated session
    pub async fn connect(
        &self,
        credential: &str,
        outbound: ConnectionHandle,
    ) -> Result<ChatSession, AuthError> {
        let participant = self.resolver.resolve(credential).await.map_err(|e| {
            tracing::warn!("[Gateway] Refusing connection: {}", e);
            e
        })?;
        Ok(self.open(participant, outbound))
    }

    /// Open a session for an already resolved participant
    pub fn open(&self, participant: Participant, outbound: ConnectionHandle) -> ChatSession {
        let session = ChatSession {
            id: Uuid::new_v4(),
            participant,
            state: SessionState::Authenticated,
            outbound,
            gateway: self.clone(),
        };
        tracing::info!("[Gateway] Connection {} authenticated as {}", session.id, participant);
        session
    }

    /// Append then broadcast, serialised per conversation
    pub async fn relay(
        &self,
        key: ConversationKey,
        sender: Participant,
        receiver: Participant,
        body: &str,
        temporary_id: Option<String>,
    ) -> Result<Message, GatewayError> {
        let lock = self.locks.lock_for(key);
        let _guard = lock.lock().await;

        let message = self.store.append(key, sender, receiver, body).await.map_err(|e| {
            tracing::error!("[Gateway] Failed to store message from {} in {}: {}", sender, key, e);
            GatewayError::Storage(e)
        })?;

        let frame = OutboundFrame::Message(BroadcastFrame::from_message(&message, temporary_id));
        let report = self.registry.broadcast(key, &frame);
        tracing::debug!(
            "[Gateway] Relayed message {} in {} to {} connections ({} dropped)",
            message.id,
            key,
            report.delivered,
            report.dropped
        );

        Ok(message)
    }
}

/// One live connection
pub struct ChatSession {
    id: ConnectionId,
    participant: Participant,
    state: SessionState,
    outbound: ConnectionHandle,
    gateway: ChatGateway,
}

impl ChatSession {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn participant(&self) -> Participant {
        self.participant
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn conversation(&self) -> Option<ConversationKey> {
        match self.state {
            SessionState::Subscribed(key) => Some(key),
            _ => None,
        }
    }

    /// Join the conversation with the counterpart of the given id
    ///
    /// The counterpart's kind is the opposite of this session's. Joining
    /// the conversation the session is already in is a no-op.
    pub async fn subscribe(&mut self, counterpart_id: ParticipantId) -> Result<ConversationKey, GatewayError> {
        let counterpart = self.participant.counterpart(counterpart_id);
        let key = ConversationKey::between(self.participant, counterpart)?;

        match self.state {
            SessionState::Closed => return Err(GatewayError::Closed),
            SessionState::Subscribed(current) if current == key => return Ok(key),
            SessionState::Subscribed(current) => return Err(GatewayError::AlreadySubscribed(current)),
            SessionState::Authenticated => {}
        }

        if !self.gateway.directory.exists(counterpart).await? {
            tracing::warn!("[Gateway] {} asked for unknown counterpart {}", self.participant, counterpart);
            return Err(GatewayError::CounterpartNotFound(counterpart));
        }

        self.gateway.registry.join(key, self.id, self.outbound.clone());
        self.state = SessionState::Subscribed(key);
        Ok(key)
    }

    /// Handle one inbound text frame
    ///
    /// On failure an error frame goes to this connection only and the
    /// session stays open.
    pub async fn handle_text(&mut self, text: &str) -> Result<Message, GatewayError> {
        let frame = match InboundFrame::parse(text, self.gateway.max_message_length) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!("[Gateway] Discarding malformed frame on {}: {}", self.id, e);
                let error = GatewayError::Malformed(e);
                self.reply_error(&error, None);
                return Err(error);
            }
        };

        let temporary_id = frame.temporary_id.clone();
        match self.relay_frame(frame).await {
            Ok(message) => Ok(message),
            Err(error) => {
                self.reply_error(&error, temporary_id);
                Err(error)
            }
        }
    }

    async fn relay_frame(&mut self, frame: InboundFrame) -> Result<Message, GatewayError> {
        let key = match (self.state, frame.counterpart_id) {
            (SessionState::Closed, _) => return Err(GatewayError::Closed),
            (SessionState::Authenticated, None) => return Err(GatewayError::NotSubscribed),
            (SessionState::Authenticated, Some(id)) => self.subscribe(id).await?,
            (SessionState::Subscribed(key), None) => key,
            (SessionState::Subscribed(key), Some(id)) => {
                if key.other_side(self.participant) != Some(self.participant.counterpart(id)) {
                    return Err(GatewayError::Malformed(SharedError::validation(
                        "counterpartId",
                        "connection is joined to a different conversation",
                    )));
                }
                key
            }
        };

        let receiver = key.other_side(self.participant).ok_or(GatewayError::NotSubscribed)?;
        self.gateway
            .relay(key, self.participant, receiver, &frame.message, frame.temporary_id)
            .await
    }

    fn reply_error(&self, error: &GatewayError, temporary_id: Option<String>) {
        let frame = OutboundFrame::error(error.client_message(), temporary_id);
        if self.outbound.try_send(frame).is_err() {
            tracing::warn!("[Gateway] Could not queue error frame for {}", self.id);
        }
    }

    /// Leave the registry and move to `Closed`
    pub fn close(&mut self) {
        if let SessionState::Subscribed(key) = self.state {
            self.gateway.registry.leave(key, self.id);
        }
        if self.state != SessionState::Closed {
            tracing::info!("[Gateway] Connection {} closed", self.id);
        }
        self.state = SessionState::Closed;
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.close();
    }
}
