/**
 * Identity Resolver
 *
 * Turns a bearer credential into the participant it identifies. Both the
 * chat gateway and the request/response endpoints authenticate through
 * this one seam, so a credential is accepted or refused the same way
 * everywhere.
 *
 * # Failure Modes
 *
 * - `AuthError::Invalid` - malformed, expired, forged, or carrying an
 *   unusable kind tag
 * - `AuthError::NotFound` - well-formed, but the participant no longer exists
 * - `AuthError::Unavailable` - the directory could not be consulted
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use super::directory::ParticipantDirectory;
use super::sessions::verify_token;
use crate::shared::participant::{Participant, ParticipantId, ParticipantKind};

/// Authentication failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credential: {0}")]
    Invalid(String),

    #[error("participant {0} not found")]
    NotFound(Participant),

    #[error("identity lookup unavailable: {0}")]
    Unavailable(String),
}

/// Handling of credentials that carry no kind tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingKindPolicy {
    /// Treat the credential as a customer's
    #[default]
    Customer,
    /// Refuse the credential
    Reject,
}

impl FromStr for MissingKindPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "reject" => Ok(Self::Reject),
            other => Err(format!("expected 'customer' or 'reject', got '{}'", other)),
        }
    }
}

/// Resolves bearer credentials to participants
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, credential: &str) -> Result<Participant, AuthError>;

    /// Same as [`IdentityResolver::resolve`], split into id and kind
    async fn resolve_parts(&self, credential: &str) -> Result<(ParticipantId, ParticipantKind), AuthError> {
        let participant = self.resolve(credential).await?;
        Ok((participant.id(), participant.kind()))
    }
}

/// HS256 JWT resolver checked against a participant directory
pub struct JwtIdentityResolver {
    secret: String,
    policy: MissingKindPolicy,
    directory: Arc<dyn ParticipantDirectory>,
}

impl JwtIdentityResolver {
    pub fn new(
        secret: impl Into<String>,
        policy: MissingKindPolicy,
        directory: Arc<dyn ParticipantDirectory>,
    ) -> Self {
        Self {
            secret: secret.into(),
            policy,
            directory,
        }
    }

    fn kind_from_tag(&self, tag: Option<&str>) -> Result<ParticipantKind, AuthError> {
        match tag {
            Some(tag) => tag
                .parse::<ParticipantKind>()
                .map_err(|e| AuthError::Invalid(e.to_string())),
            None => match self.policy {
                MissingKindPolicy::Customer => Ok(ParticipantKind::Customer),
                MissingKindPolicy::Reject => {
                    Err(AuthError::Invalid("credential carries no participant kind".to_string()))
                }
            },
        }
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(&self, credential: &str) -> Result<Participant, AuthError> {
        let claims = verify_token(credential, &self.secret).map_err(|e| {
            tracing::warn!("[Auth] Token verification failed: {}", e);
            AuthError::Invalid(e.to_string())
        })?;

        let kind = self.kind_from_tag(claims.kind.as_deref())?;
        let participant = Participant::new(kind, claims.user_id);

        let exists = self.directory.exists(participant).await.map_err(|e| {
            tracing::error!("[Auth] Directory lookup for {} failed: {}", participant, e);
            AuthError::Unavailable(e.to_string())
        })?;
        if !exists {
            tracing::warn!("[Auth] Token names unknown participant {}", participant);
            return Err(AuthError::NotFound(participant));
        }

        tracing::debug!("[Auth] Resolved credential to {}", participant);
        Ok(participant)
    }
}
