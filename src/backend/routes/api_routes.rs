/**
 * API Route Configuration
 *
 * Request/response chat endpoints. All of them require an
 * `Authorization: Bearer <jwt>` header.
 *
 * # Routes
 *
 * - `GET /api/chat/threads` - conversation summaries for the caller
 * - `GET /api/chat/history/{counterpart_id}` - ordered message list
 * - `POST /api/chat/mark-read/{counterpart_id}` - mark messages as read
 */

use axum::routing::{get, post};
use axum::Router;

use crate::backend::chat::handlers::{get_history, list_threads, mark_read};
use crate::backend::server::state::AppState;

/// Configure API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/chat/threads", get(list_threads))
        .route("/api/chat/history/{counterpart_id}", get(get_history))
        .route("/api/chat/mark-read/{counterpart_id}", post(mark_read))
}
