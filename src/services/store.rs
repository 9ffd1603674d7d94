use crate::models::{Match, MatchRecord, Participant, ParticipantId, Snapshot};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by a pairing store
///
/// Kept apart from input violations: a store failure says nothing about the
/// preference data itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Seed data error: {0}")]
    SeedError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Collaborator that owns participants, preferences and the match set
///
/// Implementations must make `snapshot` a consistent read and
/// `replace_matches` an all-or-nothing replacement.
#[async_trait]
pub trait PairingStore: Send + Sync {
    /// Participants in their natural listing order
    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError>;

    /// Preference lists keyed by owner, most-preferred first
    async fn list_preferences(&self) -> Result<HashMap<ParticipantId, Vec<ParticipantId>>, StoreError>;

    /// Participants and preferences read together
    async fn snapshot(&self) -> Result<Snapshot, StoreError>;

    /// Delete the previous match set and store `matches` in its place
    async fn replace_matches(&self, matches: &[Match]) -> Result<(), StoreError>;

    /// Replace one participant's preference list
    async fn save_preferences(&self, owner: &ParticipantId, ranked: &[ParticipantId]) -> Result<(), StoreError>;

    /// Persisted matches involving `participant`, best score first
    async fn matches_for(&self, participant: &ParticipantId) -> Result<Vec<MatchRecord>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
