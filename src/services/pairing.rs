use crate::core::{validate_list, InputViolation, MatchRun, Matcher, MatchingStrategy, StableMatching};
use crate::models::{MatchRecord, Participant, ParticipantId, PreferenceList, ScoredCandidate};
use crate::services::store::{PairingStore, StoreError};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors surfaced by the pairing service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid preferences: {0}")]
    Input(#[from] InputViolation),

    #[error("Unknown participant: {0}")]
    UnknownParticipant(ParticipantId),
}

/// Boundary between the matching core and its collaborators
///
/// Every computation works on a fresh snapshot from the store. Runs that
/// persist a match set are serialized so one replacement fully supersedes
/// the other.
pub struct PairingService {
    store: Arc<dyn PairingStore>,
    matcher: Matcher,
    default_strategy: MatchingStrategy,
    run_lock: Mutex<()>,
}

impl PairingService {
    pub fn new(store: Arc<dyn PairingStore>, matcher: Matcher, default_strategy: MatchingStrategy) -> Self {
        Self {
            store,
            matcher,
            default_strategy,
            run_lock: Mutex::new(()),
        }
    }

    pub fn default_strategy(&self) -> MatchingStrategy {
        self.default_strategy
    }

    pub async fn list_participants(&self) -> Result<Vec<Participant>, ServiceError> {
        Ok(self.store.list_participants().await?)
    }

    /// Mutual scores for everyone `viewer` has listed
    pub async fn compute_pairwise_scores(
        &self,
        viewer: &ParticipantId,
    ) -> Result<Vec<ScoredCandidate>, ServiceError> {
        let snapshot = self.store.snapshot().await?;
        if !snapshot.contains(viewer) {
            return Err(ServiceError::UnknownParticipant(viewer.clone()));
        }

        Ok(self.matcher.score_for(&snapshot, viewer)?)
    }

    /// Greedy match set, not persisted
    pub async fn compute_greedy_matches(&self) -> Result<MatchRun, ServiceError> {
        let snapshot = self.store.snapshot().await?;
        Ok(self.matcher.greedy(&snapshot))
    }

    /// Deferred-acceptance pairing, not persisted
    pub async fn compute_stable_matches(
        &self,
    ) -> Result<(StableMatching, Vec<InputViolation>), ServiceError> {
        let snapshot = self.store.snapshot().await?;
        Ok(self.matcher.stable(&snapshot))
    }

    /// Compute a match set and replace the stored one with it
    pub async fn run_matching(&self, strategy: Option<MatchingStrategy>) -> Result<MatchRun, ServiceError> {
        let strategy = strategy.unwrap_or(self.default_strategy);
        let _guard = self.run_lock.lock().await;

        let snapshot = self.store.snapshot().await?;
        tracing::info!(
            "Running {} matching over {} participants",
            strategy,
            snapshot.participants.len()
        );

        let run = self.matcher.run(strategy, &snapshot);
        for violation in &run.violations {
            tracing::warn!("Skipped during {} run: {}", strategy, violation);
        }

        self.store.replace_matches(&run.matches).await.map_err(|e| {
            tracing::error!("Failed to save matches: {}", e);
            e
        })?;

        Ok(run)
    }

    /// Validate and store a participant's preference list
    ///
    /// Returns the number of entries stored.
    pub async fn save_preferences(
        &self,
        owner: &ParticipantId,
        ranked: Vec<ParticipantId>,
    ) -> Result<usize, ServiceError> {
        let participants = self.store.list_participants().await?;
        let known: HashSet<&ParticipantId> = participants.iter().map(|p| &p.id).collect();
        if !known.contains(owner) {
            return Err(ServiceError::UnknownParticipant(owner.clone()));
        }

        let list = PreferenceList::new(owner.clone(), ranked);
        validate_list(&list, &known)?;

        self.store.save_preferences(owner, &list.ranked).await?;
        tracing::info!("Saved {} preferences for {}", list.len(), owner);

        Ok(list.len())
    }

    /// Saved preference list of `owner`, most-preferred first
    pub async fn preferences_for(&self, owner: &ParticipantId) -> Result<Vec<Participant>, ServiceError> {
        let snapshot = self.store.snapshot().await?;
        if !snapshot.contains(owner) {
            return Err(ServiceError::UnknownParticipant(owner.clone()));
        }

        let by_id = snapshot.participants_by_id();
        Ok(snapshot
            .preference_list(owner)
            .ranked
            .iter()
            .filter_map(|selected| by_id.get(selected).cloned())
            .collect())
    }

    /// Persisted matches for `participant`
    pub async fn matches_for(&self, participant: &ParticipantId) -> Result<Vec<MatchRecord>, ServiceError> {
        let participants = self.store.list_participants().await?;
        if !participants.iter().any(|p| &p.id == participant) {
            return Err(ServiceError::UnknownParticipant(participant.clone()));
        }

        Ok(self.store.matches_for(participant).await?)
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await.unwrap_or(false)
    }
}
