/**
 * Notification Subscription Handler
 *
 * Server-Sent Events stream for `GET /notifications/stream`. The consumer
 * authenticates with a `token` query parameter (browsers' EventSource
 * cannot set headers) and then receives one `notification` event per
 * payload published to its participant.
 *
 * # Example Response
 *
 * ```http
 * HTTP/1.1 200 OK
 * Content-Type: text/event-stream
 *
 * event: notification
 * data: {"message":"Booking accepted"}
 * ```
 *
 * Keep-alive comments hold the connection open between events. Lagging
 * consumers skip the events they missed instead of being disconnected.
 */

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream;
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use crate::backend::auth::AuthError;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StreamParams {
    pub token: Option<String>,
}

/// Handle notification subscription (GET /notifications/stream)
///
/// # Errors
///
/// * `401 Unauthorized` - missing or invalid token
pub async fn handle_notification_stream(
    State(state): State<AppState>,
    Query(params): Query<StreamParams>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>>, BackendError> {
    let token = params
        .token
        .as_deref()
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::Invalid("missing token query parameter".to_string()))?;
    let participant = state.resolver.resolve(token).await?;

    let receiver = state.notifications.subscribe(participant);
    tracing::info!("[Notify] Bridge consumer connected for {}", participant);

    let stream = stream::unfold(receiver, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let sse_event = Event::default().event("notification").json_data(&event);
                    return Some((sse_event, rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Notify] Consumer for {} lagged, skipped {} events", participant, skipped);
                    continue;
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("[Notify] Channel for {} closed, ending stream", participant);
                    return None;
                }
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
