/**
 * Authentication Extractor
 *
 * Protects request/response endpoints. The bearer token from the
 * `Authorization` header is resolved with the same `IdentityResolver` the
 * chat gateway uses, and the participant is handed to the handler.
 *
 * # Example
 *
 * ```rust,no_run
 * use marketchat::backend::middleware::auth::AuthParticipant;
 *
 * async fn handler(AuthParticipant(participant): AuthParticipant) -> String {
 *     participant.to_string()
 * }
 * ```
 */

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::backend::auth::AuthError;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::participant::Participant;

/// The bearer token of a request, if the header is well-formed
pub fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AuthError::Invalid("missing Authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::Invalid("Authorization header is not a bearer token".to_string()))
}

/// Axum extractor for the authenticated participant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthParticipant(pub Participant);

impl FromRequestParts<AppState> for AuthParticipant {
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).map_err(|e| {
            tracing::warn!("[Auth] {}", e);
            e
        })?;

        let participant = state.resolver.resolve(token).await?;
        Ok(AuthParticipant(participant))
    }
}
