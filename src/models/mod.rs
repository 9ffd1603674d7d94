// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Match, MatchRecord, Participant, ParticipantId, PreferenceList, ScoredCandidate, Snapshot};
pub use requests::{RunMatchingRequest, SavePreferencesRequest};
pub use responses::{
    ErrorResponse, HealthResponse, MatchesResponse, ParticipantsResponse, PreferencesResponse,
    RunMatchingResponse, SavePreferencesResponse, ScoresResponse,
};
