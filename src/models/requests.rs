use crate::core::MatchingStrategy;
use crate::models::domain::ParticipantId;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Upper bound on a single preference list
pub const MAX_PREFERENCES: u64 = 1000;

/// Request to run population-wide matching
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMatchingRequest {
    /// Falls back to `matching.default_strategy` when omitted
    #[serde(default)]
    pub strategy: Option<MatchingStrategy>,
}

/// Request to replace a participant's preference list
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SavePreferencesRequest {
    /// Most-preferred first
    #[validate(length(max = MAX_PREFERENCES))]
    #[serde(default)]
    pub preferences: Vec<ParticipantId>,
}
