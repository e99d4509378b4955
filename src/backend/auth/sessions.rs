/**
 * Participant Tokens
 *
 * This module handles JWT generation and validation for chat participants.
 * Tokens are issued by the identity service; the server only needs to
 * verify them, but issuing lives here too so tests and local tooling can
 * mint credentials with the same claim layout.
 *
 * # Claims
 *
 * ```json
 * {"user_id": 12, "type": "provider", "exp": 1700000000, "iat": 1699990000}
 * ```
 *
 * `type` is optional. Older tokens carry `user` or `workshop` instead of
 * `customer` / `provider`, or no tag at all.
 */

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::shared::participant::{Participant, ParticipantId};

/// Default lifetime of issued tokens
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Participant id, scoped by `kind`
    pub user_id: ParticipantId,
    /// Participant kind tag (optional for backwards compatibility)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

impl Claims {
    /// Claims for `participant`, valid for `ttl` from now
    pub fn for_participant(participant: Participant, ttl: Duration) -> Self {
        let now = unix_now();
        Self {
            user_id: participant.id(),
            kind: Some(participant.kind().as_str().to_string()),
            exp: now + ttl.as_secs(),
            iat: now,
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Encode arbitrary claims
pub fn encode_claims(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &key)
}

/// Create a JWT token for a participant
///
/// # Arguments
/// * `participant` - The participant the token identifies
/// * `ttl` - How long the token stays valid
/// * `secret` - HS256 signing secret
///
/// # Returns
/// JWT token string
pub fn create_token(
    participant: Participant,
    ttl: Duration,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode_claims(&Claims::for_participant(participant, ttl), secret)
}

/// Verify and decode a JWT token
///
/// Signature and expiry are both checked.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims)
}
