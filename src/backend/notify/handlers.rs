/**
 * Notification Publish Handler
 *
 * `POST /notifications` is how workflow components push a status event to
 * a participant.
 *
 * # Example Request
 *
 * ```http
 * POST /notifications HTTP/1.1
 * X-Bridge-Key: <shared secret>
 * Content-Type: application/json
 *
 * {"participant": {"type": "provider", "id": 7}, "message": "Booking accepted"}
 * ```
 *
 * The answer is always `202 Accepted` with `{"delivered": n}` once the
 * request is valid; `n == 0` means nobody was listening.
 */

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::event::{NotificationEvent, PublishRequest, PublishResponse};

/// Header carrying the bridge's shared secret
pub const BRIDGE_KEY_HEADER: &str = "x-bridge-key";

/// Handle publish request (POST /notifications)
///
/// # Errors
///
/// * `401 Unauthorized` - a bridge key is configured and the header does not match
/// * `400 Bad Request` - empty message
pub async fn publish_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PublishRequest>,
) -> Result<(StatusCode, Json<PublishResponse>), BackendError> {
    if let Some(expected) = state.config.bridge_key.as_deref() {
        let presented = headers.get(BRIDGE_KEY_HEADER).and_then(|v| v.to_str().ok());
        if presented != Some(expected) {
            tracing::warn!("[Notify] Publish refused: bad or missing bridge key");
            return Err(BackendError::handler(StatusCode::UNAUTHORIZED, "invalid bridge key"));
        }
    }

    request.validate()?;

    let delivered = state
        .notifications
        .publish(request.participant, NotificationEvent::new(request.message));

    Ok((StatusCode::ACCEPTED, Json(PublishResponse { delivered })))
}
