use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque participant identifier
///
/// Ordering is the byte-wise ordering of the underlying string; the stable
/// matching side partition relies on it being total.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A participant eligible for matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Ordered ranking of other participants, most-preferred first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceList {
    pub owner: ParticipantId,
    pub ranked: Vec<ParticipantId>,
}

impl PreferenceList {
    pub fn new(owner: impl Into<ParticipantId>, ranked: Vec<ParticipantId>) -> Self {
        Self {
            owner: owner.into(),
            ranked,
        }
    }

    pub fn empty(owner: impl Into<ParticipantId>) -> Self {
        Self::new(owner, Vec::new())
    }

    /// 0-based position of `id` in this list
    #[inline]
    pub fn position(&self, id: &ParticipantId) -> Option<usize> {
        self.ranked.iter().position(|entry| entry == id)
    }

    /// 1-based rank of `id` in this list
    #[inline]
    pub fn rank_of(&self, id: &ParticipantId) -> Option<usize> {
        self.position(id).map(|pos| pos + 1)
    }

    #[inline]
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.ranked.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// An unordered pair of participants with its score
///
/// `a` is the participant the pair was discovered from (the scanning
/// participant for greedy runs, the proposer for stable runs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub a: ParticipantId,
    pub b: ParticipantId,
    pub score: i64,
}

impl Match {
    pub fn involves(&self, id: &ParticipantId) -> bool {
        &self.a == id || &self.b == id
    }

    /// The other side of the pair, if `id` is part of it
    pub fn partner_of(&self, id: &ParticipantId) -> Option<&ParticipantId> {
        if &self.a == id {
            Some(&self.b)
        } else if &self.b == id {
            Some(&self.a)
        } else {
            None
        }
    }
}

/// A candidate ranked by the pairwise scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub participant: Participant,
    pub score: i64,
}

/// Persisted match as seen by one participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: uuid::Uuid,
    pub partner: Participant,
    pub score: i64,
    #[serde(rename = "matchedAt")]
    pub matched_at: chrono::DateTime<chrono::Utc>,
}

/// Immutable view of the population taken at the start of a computation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Participants in their natural listing order
    pub participants: Vec<Participant>,
    /// Preference lists keyed by owner
    #[serde(default)]
    pub preferences: HashMap<ParticipantId, Vec<ParticipantId>>,
}

impl Snapshot {
    pub fn new(
        participants: Vec<Participant>,
        preferences: HashMap<ParticipantId, Vec<ParticipantId>>,
    ) -> Self {
        Self {
            participants,
            preferences,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }

    pub fn participants_by_id(&self) -> HashMap<ParticipantId, Participant> {
        self.participants
            .iter()
            .map(|p| (p.id.clone(), p.clone()))
            .collect()
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.participants.iter().any(|p| &p.id == id)
    }

    /// Preference list of `owner`, empty when none was expressed
    pub fn preference_list(&self, owner: &ParticipantId) -> PreferenceList {
        PreferenceList::new(
            owner.clone(),
            self.preferences.get(owner).cloned().unwrap_or_default(),
        )
    }

    /// All preference lists keyed by owner
    pub fn preference_lists(&self) -> HashMap<ParticipantId, PreferenceList> {
        self.preferences
            .iter()
            .map(|(owner, ranked)| (owner.clone(), PreferenceList::new(owner.clone(), ranked.clone())))
            .collect()
    }
}
