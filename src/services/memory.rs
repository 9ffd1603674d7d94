use crate::models::{Match, MatchRecord, Participant, ParticipantId, Snapshot};
use crate::services::store::{PairingStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredMatch {
    id: uuid::Uuid,
    pair: Match,
    matched_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    participants: Vec<Participant>,
    preferences: HashMap<ParticipantId, Vec<ParticipantId>>,
    matches: Vec<StoredMatch>,
}

/// In-process pairing store
///
/// All state sits behind one lock, so a snapshot never observes a
/// half-applied write. Used for development and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                participants: snapshot.participants,
                preferences: snapshot.preferences,
                matches: Vec::new(),
            }),
        }
    }

    /// Load participants and preferences from a JSON file
    ///
    /// Format: `{"participants": [{"id": "...", "displayName": "..."}],
    /// "preferences": {"<owner>": ["<id>", ...]}}`
    pub fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::SeedError(format!("{}: {}", path.display(), e)))?;
        let snapshot: Snapshot = serde_json::from_str(&raw)
            .map_err(|e| StoreError::SeedError(format!("{}: {}", path.display(), e)))?;

        tracing::info!(
            "Seeded memory store from {} ({} participants, {} preference lists)",
            path.display(),
            snapshot.participants.len(),
            snapshot.preferences.len()
        );

        Ok(Self::from_snapshot(snapshot))
    }

    /// Add or rename a participant
    pub async fn upsert_participant(&self, participant: Participant) {
        let mut state = self.state.write().await;
        match state.participants.iter_mut().find(|p| p.id == participant.id) {
            Some(existing) => existing.display_name = participant.display_name,
            None => state.participants.push(participant),
        }
    }

    /// Current match set, in insertion order
    pub async fn current_matches(&self) -> Vec<Match> {
        let state = self.state.read().await;
        state.matches.iter().map(|m| m.pair.clone()).collect()
    }
}

#[async_trait]
impl PairingStore for MemoryStore {
    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError> {
        Ok(self.state.read().await.participants.clone())
    }

    async fn list_preferences(&self) -> Result<HashMap<ParticipantId, Vec<ParticipantId>>, StoreError> {
        Ok(self.state.read().await.preferences.clone())
    }

    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let state = self.state.read().await;
        Ok(Snapshot::new(state.participants.clone(), state.preferences.clone()))
    }

    async fn replace_matches(&self, matches: &[Match]) -> Result<(), StoreError> {
        let matched_at = chrono::Utc::now();
        let fresh: Vec<StoredMatch> = matches
            .iter()
            .map(|pair| StoredMatch {
                id: uuid::Uuid::new_v4(),
                pair: pair.clone(),
                matched_at,
            })
            .collect();

        let mut state = self.state.write().await;
        let previous = std::mem::replace(&mut state.matches, fresh);

        tracing::debug!(
            "Replaced {} stored matches with {}",
            previous.len(),
            state.matches.len()
        );

        Ok(())
    }

    async fn save_preferences(&self, owner: &ParticipantId, ranked: &[ParticipantId]) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if !state.participants.iter().any(|p| &p.id == owner) {
            return Err(StoreError::NotFound(format!("participant {}", owner)));
        }
        state.preferences.insert(owner.clone(), ranked.to_vec());
        Ok(())
    }

    async fn matches_for(&self, participant: &ParticipantId) -> Result<Vec<MatchRecord>, StoreError> {
        let state = self.state.read().await;
        let by_id: HashMap<&ParticipantId, &Participant> =
            state.participants.iter().map(|p| (&p.id, p)).collect();

        let mut records: Vec<MatchRecord> = state
            .matches
            .iter()
            .filter_map(|stored| {
                let partner = stored.pair.partner_of(participant)?;
                Some(MatchRecord {
                    id: stored.id,
                    partner: (*by_id.get(partner)?).clone(),
                    score: stored.pair.score,
                    matched_at: stored.matched_at,
                })
            })
            .collect();

        records.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(records)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
