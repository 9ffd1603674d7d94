use crate::core::{InputViolation, MatchingStrategy};
use crate::models::domain::{Match, MatchRecord, Participant, ParticipantId, ScoredCandidate};
use serde::Serialize;

/// Response for the pairwise scores endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ScoresResponse {
    #[serde(rename = "participantId")]
    pub participant_id: ParticipantId,
    pub matches: Vec<ScoredCandidate>,
}

/// Response for the run matching endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RunMatchingResponse {
    pub success: bool,
    pub strategy: MatchingStrategy,
    #[serde(rename = "matchCount")]
    pub match_count: usize,
    pub matches: Vec<Match>,
    pub unmatched: Vec<ParticipantId>,
    pub violations: Vec<InputViolation>,
}

/// Persisted matches for one participant
#[derive(Debug, Clone, Serialize)]
pub struct MatchesResponse {
    #[serde(rename = "participantId")]
    pub participant_id: ParticipantId,
    pub matches: Vec<MatchRecord>,
}

/// Participant listing
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantsResponse {
    pub participants: Vec<Participant>,
    pub total: usize,
}

/// A participant's own ranked list
#[derive(Debug, Clone, Serialize)]
pub struct PreferencesResponse {
    #[serde(rename = "participantId")]
    pub participant_id: ParticipantId,
    pub preferences: Vec<Participant>,
}

/// Save preferences response
#[derive(Debug, Clone, Serialize)]
pub struct SavePreferencesResponse {
    pub success: bool,
    pub count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
