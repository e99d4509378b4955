use axum::{extract::State, Json};

use crate::backend::chat::threads::ThreadService;
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthParticipant;
use crate::shared::conversation::ConversationSummary;

/// Handle thread-list request (GET /api/chat/threads)
///
/// Returns the caller's conversations, most recently active first.
pub async fn list_threads(
    State(threads): State<ThreadService>,
    AuthParticipant(caller): AuthParticipant,
) -> Result<Json<Vec<ConversationSummary>>, BackendError> {
    Ok(Json(threads.list_threads(caller).await?))
}
