/**
 * Participant Directory
 *
 * Answers whether a participant still exists and what it is called. The
 * identity resolver uses it to refuse tokens for deleted participants,
 * the gateway and history endpoints use it to report unknown
 * counterparts, and thread summaries use it for display names.
 */

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::backend::chat::store::StoreError;
use crate::shared::participant::{Participant, ParticipantKind, ParticipantProfile};

/// Lookup of participant profiles
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    /// The participant's profile, or `None` if it does not exist
    async fn lookup(&self, participant: Participant) -> Result<Option<ParticipantProfile>, StoreError>;

    async fn exists(&self, participant: Participant) -> Result<bool, StoreError> {
        Ok(self.lookup(participant).await?.is_some())
    }
}

/// Directory held in process memory
///
/// A strict directory only knows the participants registered with
/// [`InMemoryDirectory::insert`]. An open directory additionally treats
/// every other participant as existing, without a display name; it backs
/// servers that run without a database.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    profiles: RwLock<HashMap<Participant, ParticipantProfile>>,
    open: bool,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open() -> Self {
        Self {
            profiles: RwLock::default(),
            open: true,
        }
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = ParticipantProfile>) -> Self {
        let directory = Self::new();
        for profile in profiles {
            directory.insert(profile);
        }
        directory
    }

    pub fn insert(&self, profile: ParticipantProfile) {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(profile.participant, profile);
    }

    pub fn remove(&self, participant: Participant) -> Option<ParticipantProfile> {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&participant)
    }
}

#[async_trait]
impl ParticipantDirectory for InMemoryDirectory {
    async fn lookup(&self, participant: Participant) -> Result<Option<ParticipantProfile>, StoreError> {
        let known = self
            .profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&participant)
            .cloned();

        Ok(match known {
            Some(profile) => Some(profile),
            None if self.open => Some(ParticipantProfile::new(participant)),
            None => None,
        })
    }
}

/// Directory backed by the `customers` and `providers` tables
#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantDirectory for PgDirectory {
    async fn lookup(&self, participant: Participant) -> Result<Option<ParticipantProfile>, StoreError> {
        let query = match participant.kind() {
            ParticipantKind::Customer => "SELECT display_name FROM customers WHERE id = $1",
            ParticipantKind::Provider => "SELECT display_name FROM providers WHERE id = $1",
        };

        let row: Option<(Option<String>,)> = sqlx::query_as(query)
            .bind(participant.id())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(display_name,)| ParticipantProfile {
            participant,
            display_name,
        }))
    }
}
