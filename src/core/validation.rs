use crate::models::{ParticipantId, PreferenceList, Snapshot};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Malformed preference input
///
/// Population-wide runs skip the affected list and report the violation;
/// the pairwise scorer returns it as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputViolation {
    #[error("preference list of {owner} references unknown participant {referenced}")]
    UnknownParticipant {
        owner: ParticipantId,
        referenced: ParticipantId,
    },

    #[error("preference list of {owner} contains its own id")]
    SelfReference { owner: ParticipantId },

    #[error("preference list of {owner} lists {entry} more than once")]
    DuplicateEntry {
        owner: ParticipantId,
        entry: ParticipantId,
    },

    #[error("preference list belongs to {found}, expected {expected}")]
    OwnerMismatch {
        expected: ParticipantId,
        found: ParticipantId,
    },

    #[error("preference list owner {owner} is not a known participant")]
    UnknownOwner { owner: ParticipantId },

    #[error("participant {owner} is listed more than once")]
    DuplicateParticipant { owner: ParticipantId },
}

impl InputViolation {
    /// Participant whose list is affected
    pub fn owner(&self) -> &ParticipantId {
        match self {
            InputViolation::UnknownParticipant { owner, .. }
            | InputViolation::SelfReference { owner }
            | InputViolation::DuplicateEntry { owner, .. }
            | InputViolation::UnknownOwner { owner }
            | InputViolation::DuplicateParticipant { owner } => owner,
            InputViolation::OwnerMismatch { found, .. } => found,
        }
    }
}

/// Check one list against the set of known participants
///
/// Reports the first violation found, in list order.
pub fn validate_list(
    prefs: &PreferenceList,
    known: &HashSet<&ParticipantId>,
) -> Result<(), InputViolation> {
    if !known.contains(&prefs.owner) {
        return Err(InputViolation::UnknownOwner {
            owner: prefs.owner.clone(),
        });
    }

    let mut seen = HashSet::with_capacity(prefs.len());
    for entry in &prefs.ranked {
        if entry == &prefs.owner {
            return Err(InputViolation::SelfReference {
                owner: prefs.owner.clone(),
            });
        }
        if !known.contains(entry) {
            return Err(InputViolation::UnknownParticipant {
                owner: prefs.owner.clone(),
                referenced: entry.clone(),
            });
        }
        if !seen.insert(entry) {
            return Err(InputViolation::DuplicateEntry {
                owner: prefs.owner.clone(),
                entry: entry.clone(),
            });
        }
    }

    Ok(())
}

/// Snapshot with repeated participants and malformed lists removed
#[derive(Debug, Clone)]
pub struct ValidatedSnapshot {
    pub snapshot: Snapshot,
    pub violations: Vec<InputViolation>,
}

/// Validate every preference list in a snapshot
///
/// A participant listed more than once keeps its first entry; each repeat is
/// reported in listing order. Malformed lists are dropped (their owner is
/// treated as having expressed no preference) and reported after that, ordered
/// by owner id so repeated runs report identically.
pub fn sanitize_snapshot(snapshot: &Snapshot) -> ValidatedSnapshot {
    let mut violations = Vec::new();

    let mut known: HashSet<&ParticipantId> = HashSet::with_capacity(snapshot.participants.len());
    let mut participants = Vec::with_capacity(snapshot.participants.len());
    for participant in &snapshot.participants {
        if known.insert(&participant.id) {
            participants.push(participant.clone());
        } else {
            tracing::warn!("Skipping repeated participant {}", participant.id);
            violations.push(InputViolation::DuplicateParticipant {
                owner: participant.id.clone(),
            });
        }
    }

    let mut preferences = HashMap::with_capacity(snapshot.preferences.len());

    let mut owners: Vec<&ParticipantId> = snapshot.preferences.keys().collect();
    owners.sort();

    for owner in owners {
        let ranked = &snapshot.preferences[owner];
        let list = PreferenceList::new(owner.clone(), ranked.clone());
        match validate_list(&list, &known) {
            Ok(()) => {
                preferences.insert(owner.clone(), ranked.clone());
            }
            Err(violation) => {
                tracing::warn!("Skipping preference list: {}", violation);
                violations.push(violation);
            }
        }
    }

    ValidatedSnapshot {
        snapshot: Snapshot::new(participants, preferences),
        violations,
    }
}
