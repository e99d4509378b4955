/**
 * Backend Error Types
 *
 * This module defines the umbrella error returned by HTTP handlers. Layer
 * errors convert into it with `?`, and it converts into an HTTP response.
 *
 * # Error Categories
 *
 * ## Authentication
 *
 * Missing, malformed, expired or forged credentials and unknown
 * participants. Always 401, except when the directory itself could not be
 * reached (503).
 *
 * ## Storage
 *
 * The message store or directory is unavailable. Surfaced as 503 so
 * clients can retry.
 *
 * ## Addressing
 *
 * A counterpart that does not exist is 404; the server never fabricates an
 * empty conversation for it.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::auth::AuthError;
use crate::backend::chat::gateway::GatewayError;
use crate::backend::chat::store::StoreError;
use crate::shared::participant::Participant;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use marketchat::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::FORBIDDEN, "Bad bridge key");
/// assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., missing headers, invalid request)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Credential refused
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Message store or directory failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Live connection setup failure
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The named participant does not exist
    #[error("participant {0} not found")]
    NotFound(Participant),

    /// Shared error (from shared module)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Shorthand for a 503 handler error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `Auth` - 401, or 503 when the directory was unavailable
    /// - `Store` - 503 Service Unavailable
    /// - `Gateway` - 400 / 404 / 409 / 503 depending on the failure
    /// - `NotFound` - 404 Not Found
    /// - `SharedError` - 400 for validation, 500 for serialization
    /// - `SerializationError` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Auth(AuthError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Gateway(err) => match err {
                GatewayError::Malformed(_) | GatewayError::NotSubscribed => StatusCode::BAD_REQUEST,
                GatewayError::CounterpartNotFound(_) => StatusCode::NOT_FOUND,
                GatewayError::AlreadySubscribed(_) => StatusCode::CONFLICT,
                GatewayError::Storage(_) | GatewayError::Closed => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message
    ///
    /// Storage failures are reported without database details.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Store(_) | Self::Gateway(GatewayError::Storage(_)) => {
                "message store unavailable".to_string()
            }
            other => other.to_string(),
        }
    }
}
