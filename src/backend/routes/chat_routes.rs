/**
 * Live Route Configuration
 *
 * Long-lived connections.
 *
 * # Routes
 *
 * - `GET /ws/chat?token=...&counterpart=...` - chat WebSocket
 * - `GET /notifications/stream?token=...` - notification bridge (SSE)
 * - `POST /notifications` - publish to the notification bridge
 */

use axum::routing::{get, post};
use axum::Router;

use crate::backend::chat::gateway::handle_chat_socket;
use crate::backend::notify::{handle_notification_stream, publish_notification};
use crate::backend::server::state::AppState;

/// Configure chat and notification routes
pub fn configure_chat_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/ws/chat", get(handle_chat_socket))
        .route("/notifications/stream", get(handle_notification_stream))
        .route("/notifications", post(publish_notification))
}
