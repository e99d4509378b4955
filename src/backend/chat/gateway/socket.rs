/**
 * WebSocket Connection Handler
 *
 * Drives a `ChatSession` over an axum WebSocket at `GET /ws/chat`.
 *
 * # Handshake
 *
 * ```http
 * GET /ws/chat?token=<jwt>&counterpart=7 HTTP/1.1
 * Upgrade: websocket
 * ```
 *
 * The credential is resolved before the upgrade is accepted, so a refused
 * credential answers with a plain 401 and no live connection ever exists.
 * `counterpart` is optional; without it the first frame must carry
 * `counterpartId`.
 *
 * # Tasks
 *
 * Each connection runs a reader loop on the request task and a writer task
 * draining the connection's bounded outbound queue into the socket.
 */

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{mpsc, OwnedSemaphorePermit};

use super::session::ChatSession;
use crate::backend::auth::AuthError;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::message::OutboundFrame;
use crate::shared::participant::ParticipantId;

/// Handshake query parameters
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
    pub counterpart: Option<ParticipantId>,
}

/// Handle a chat connection request (GET /ws/chat)
///
/// # Errors
///
/// * `401 Unauthorized` - missing, invalid or expired token, or unknown participant
/// * `404 Not Found` - `counterpart` names a participant that does not exist
/// * `503 Service Unavailable` - the connection limit is reached
pub async fn handle_chat_socket(
    State(state): State<AppState>,
    Query(params): Query<ConnectParams>,
    ws: WebSocketUpgrade,
) -> Result<Response, BackendError> {
    let permit = state.connection_limit.clone().try_acquire_owned().map_err(|_| {
        tracing::warn!("[Gateway] Connection limit reached, refusing upgrade");
        BackendError::unavailable("too many open chat connections")
    })?;

    let token = params
        .token
        .as_deref()
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::Invalid("missing token query parameter".to_string()))?;

    let (outbound_tx, outbound_rx) = mpsc::channel(state.config.outbound_buffer);
    let mut session = state.gateway.connect(token, outbound_tx).await?;

    if let Some(counterpart) = params.counterpart {
        session.subscribe(counterpart).await?;
    }

    Ok(ws.on_upgrade(move |socket| drive_session(socket, session, outbound_rx, permit)))
}

async fn drive_session(
    socket: WebSocket,
    mut session: ChatSession,
    mut outbound: mpsc::Receiver<OutboundFrame>,
    _permit: OwnedSemaphorePermit,
) {
    let connection = session.id();
    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            let text = match frame.to_json() {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("[Gateway] Failed to serialize frame for {}: {}", connection, e);
                    continue;
                }
            };
            if sink.send(WsMessage::Text(text.into())).await.is_err() {
                tracing::debug!("[Gateway] Socket for {} stopped accepting frames", connection);
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(incoming) = stream.next().await {
        match incoming {
            Ok(WsMessage::Text(text)) => {
                if let Err(e) = session.handle_text(text.as_str()).await {
                    tracing::debug!("[Gateway] Frame on {} rejected: {}", connection, e);
                }
            }
            Ok(WsMessage::Close(_)) => break,
            Ok(WsMessage::Binary(_)) => {
                tracing::debug!("[Gateway] Ignoring binary frame on {}", connection);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("[Gateway] Read error on {}: {}", connection, e);
                break;
            }
        }
    }

    // leaving the registry drops the last queue senders, which ends the writer
    session.close();
    drop(session);
    if let Err(e) = writer.await {
        tracing::warn!("[Gateway] Writer task for {} failed: {}", connection, e);
    }
}
