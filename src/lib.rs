//! Pair Algo - preference-ranked pairing service
//!
//! Participants rank each other; this library turns those rankings into
//! pairings. It provides a per-viewer mutual scorer plus two independent
//! population-wide matchers: a greedy mutual matcher and deferred acceptance
//! (Gale-Shapley) stable matching.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, MatchRun, MatchingStrategy, SidePartition, StableMatching, InputViolation};
pub use crate::models::{Match, Participant, ParticipantId, PreferenceList, ScoredCandidate, Snapshot};
pub use crate::services::{MemoryStore, PairingService, PairingStore, ServiceError, StoreError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let run = Matcher::default().run(MatchingStrategy::Greedy, &Snapshot::default());
        assert!(run.matches.is_empty());
        assert!(run.unmatched.is_empty());
    }
}
