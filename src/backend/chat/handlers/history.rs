/**
 * Conversation History and Read-State Handlers
 *
 * Both endpoints address the conversation by the counterpart's id; the
 * counterpart's kind is the opposite of the caller's, and the key is
 * derived from the pair exactly as the gateway derives it.
 *
 * # Routes
 *
 * - `GET /api/chat/history/{counterpart_id}` - full message list, oldest first
 * - `POST /api/chat/mark-read/{counterpart_id}` - mark messages addressed to
 *   the caller as read; 204 with no body
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthParticipant;
use crate::backend::server::state::AppState;
use crate::shared::conversation::ConversationKey;
use crate::shared::message::Message;
use crate::shared::participant::{Participant, ParticipantId};

/// Key of the caller's conversation with `counterpart_id`
///
/// Fails with 404 when the counterpart does not exist.
pub(crate) async fn conversation_with(
    state: &AppState,
    caller: Participant,
    counterpart_id: ParticipantId,
) -> Result<ConversationKey, BackendError> {
    let counterpart = caller.counterpart(counterpart_id);
    if !state.directory.exists(counterpart).await? {
        tracing::warn!("[Chat] {} asked for unknown counterpart {}", caller, counterpart);
        return Err(BackendError::NotFound(counterpart));
    }
    Ok(ConversationKey::between(caller, counterpart)?)
}

/// Handle history request (GET /api/chat/history/{counterpart_id})
///
/// # Errors
///
/// * `401 Unauthorized` - missing or invalid bearer token
/// * `404 Not Found` - unknown counterpart
/// * `503 Service Unavailable` - the message store failed
pub async fn get_history(
    State(state): State<AppState>,
    AuthParticipant(caller): AuthParticipant,
    Path(counterpart_id): Path<ParticipantId>,
) -> Result<Json<Vec<Message>>, BackendError> {
    let key = conversation_with(&state, caller, counterpart_id).await?;
    let messages = state.store.history(key).await?;
    tracing::debug!("[Chat] {} loaded {} messages of {}", caller, messages.len(), key);
    Ok(Json(messages))
}

/// Handle mark-read request (POST /api/chat/mark-read/{counterpart_id})
///
/// Idempotent: with nothing unread it still answers 204.
pub async fn mark_read(
    State(state): State<AppState>,
    AuthParticipant(caller): AuthParticipant,
    Path(counterpart_id): Path<ParticipantId>,
) -> Result<StatusCode, BackendError> {
    let key = conversation_with(&state, caller, counterpart_id).await?;
    let changed = state.store.mark_read(key, caller).await?;
    tracing::debug!("[Chat] {} marked {} messages of {} as read", caller, changed, key);
    Ok(StatusCode::NO_CONTENT)
}
