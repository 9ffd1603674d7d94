use crate::models::{ParticipantId, PreferenceList};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Rule assigning each participant to the proposing side (A) or the
/// responding side (B)
///
/// Both variants are total and deterministic. The matching produced depends
/// entirely on which side a participant lands on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SidePartition {
    /// Sort ids; the first `n / 2` (rounded down) propose
    #[default]
    Halves,
    /// Ids strictly less than the threshold propose
    Threshold { threshold: String },
}

impl SidePartition {
    /// Split participants into (side A, side B), each in listing order
    ///
    /// A repeated id is placed once, at its first position.
    pub fn split(&self, participants: &[ParticipantId]) -> (Vec<ParticipantId>, Vec<ParticipantId>) {
        let mut seen = HashSet::with_capacity(participants.len());
        let unique: Vec<&ParticipantId> = participants.iter().filter(|id| seen.insert(*id)).collect();

        match self {
            SidePartition::Halves => {
                let mut sorted = unique.clone();
                sorted.sort();
                let proposers: HashSet<&ParticipantId> =
                    sorted.into_iter().take(unique.len() / 2).collect();
                unique
                    .into_iter()
                    .cloned()
                    .partition(|id| proposers.contains(id))
            }
            SidePartition::Threshold { threshold } => unique
                .into_iter()
                .cloned()
                .partition(|id| id.as_str() < threshold.as_str()),
        }
    }
}

/// Outcome of a deferred-acceptance run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StableMatching {
    /// Side-A participant to its side-B partner, ordered by side-A id
    pub pairs: BTreeMap<ParticipantId, ParticipantId>,
    /// Number of proposals made
    pub proposals: usize,
}

impl StableMatching {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Run deferred acceptance (Gale-Shapley) with side A proposing
///
/// Each free proposer offers to the next entry on their list. A free
/// responder holds any offer; a holding responder trades up only to a
/// proposer it ranks strictly better than its current holder (an unranked
/// holder loses to any ranked proposer, an unranked proposer never wins).
/// A displaced holder goes back to the front of the free queue.
///
/// Offers to participants that are not on side B count as rejections.
/// Proposers who exhaust their list stay unmatched. The result is
/// side-A-optimal and has no blocking pair among mutually ranking
/// participants.
pub fn stable_matches(
    participants: &[ParticipantId],
    prefs_by_owner: &HashMap<ParticipantId, PreferenceList>,
    partition: &SidePartition,
) -> StableMatching {
    let (side_a, side_b) = partition.split(participants);
    let responders: HashSet<&ParticipantId> = side_b.iter().collect();

    let mut free: VecDeque<&ParticipantId> = side_a.iter().collect();
    let mut proposal_index: HashMap<&ParticipantId, usize> =
        side_a.iter().map(|a| (a, 0)).collect();
    let mut current_match: HashMap<&ParticipantId, &ParticipantId> = HashMap::new();
    let mut proposals = 0;

    while let Some(&a) = free.front() {
        let next = proposal_index.entry(a).or_insert(0);
        let Some(b) = prefs_by_owner.get(a).and_then(|prefs| prefs.ranked.get(*next)) else {
            // exhausted
            free.pop_front();
            continue;
        };
        *next += 1;
        proposals += 1;

        if !responders.contains(b) {
            continue;
        }

        match current_match.get(b).copied() {
            None => {
                current_match.insert(b, a);
                free.pop_front();
            }
            Some(holder) => {
                if prefers(prefs_by_owner.get(b), a, holder) {
                    tracing::trace!("{} displaces {} at {}", a, holder, b);
                    current_match.insert(b, a);
                    free.pop_front();
                    free.push_front(holder);
                }
            }
        }
    }

    let pairs: BTreeMap<ParticipantId, ParticipantId> = current_match
        .into_iter()
        .map(|(b, a)| (a.clone(), b.clone()))
        .collect();

    tracing::debug!(
        "Deferred acceptance matched {} of {} proposers after {} proposals",
        pairs.len(),
        side_a.len(),
        proposals
    );

    StableMatching { pairs, proposals }
}

/// Whether `responder_prefs` ranks `challenger` strictly above `holder`
#[inline]
fn prefers(
    responder_prefs: Option<&PreferenceList>,
    challenger: &ParticipantId,
    holder: &ParticipantId,
) -> bool {
    let Some(prefs) = responder_prefs else {
        return false;
    };
    match (prefs.position(challenger), prefs.position(holder)) {
        (Some(challenger_rank), Some(holder_rank)) => challenger_rank < holder_rank,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(order: &[&str], lists: &[(&str, &[&str])]) -> (Vec<ParticipantId>, HashMap<ParticipantId, PreferenceList>) {
        let participants = order.iter().map(|id| ParticipantId::from(*id)).collect();
        let prefs = lists
            .iter()
            .map(|(owner, list)| {
                (
                    ParticipantId::from(*owner),
                    PreferenceList::new(*owner, list.iter().map(|id| ParticipantId::from(*id)).collect()),
                )
            })
            .collect();
        (participants, prefs)
    }

    fn pairs(result: &StableMatching) -> Vec<(&str, &str)> {
        result.pairs.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect()
    }

    #[test]
    fn test_halves_partition() {
        let ids: Vec<ParticipantId> = ["c", "a", "b"].iter().map(|id| ParticipantId::from(*id)).collect();
        let (side_a, side_b) = SidePartition::Halves.split(&ids);
        assert_eq!(side_a, vec![ParticipantId::from("a")]);
        assert_eq!(side_b, vec![ParticipantId::from("c"), ParticipantId::from("b")]);
    }

    #[test]
    fn test_threshold_partition() {
        let ids: Vec<ParticipantId> = ["user123", "user789", "user456", "user101"]
            .iter()
            .map(|id| ParticipantId::from(*id))
            .collect();
        let partition = SidePartition::Threshold {
            threshold: "user500".to_string(),
        };
        let (side_a, side_b) = partition.split(&ids);
        assert_eq!(side_a.len(), 3);
        assert_eq!(side_b, vec![ParticipantId::from("user789")]);
    }

    #[test]
    fn test_cycle_matches_first_proposal() {
        let (people, prefs) = setup(&["a", "b", "c"], &[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);
        let result = stable_matches(&people, &prefs, &SidePartition::Halves);
        assert_eq!(pairs(&result), vec![("a", "b")]);
    }

    #[test]
    fn test_classic_instance_is_proposer_optimal() {
        // a1..a3 propose, b1..b3 respond
        let (people, prefs) = setup(
            &["a1", "a2", "a3", "b1", "b2", "b3"],
            &[
                ("a1", &["b1", "b2", "b3"]),
                ("a2", &["b1", "b3", "b2"]),
                ("a3", &["b2", "b1", "b3"]),
                ("b1", &["a2", "a1", "a3"]),
                ("b2", &["a1", "a3", "a2"]),
                ("b3", &["a1", "a2", "a3"]),
            ],
        );
        let result = stable_matches(&people, &prefs, &SidePartition::Halves);
        assert_eq!(pairs(&result), vec![("a1", "b2"), ("a2", "b1"), ("a3", "b3")]);
    }

    #[test]
    fn test_unranked_holder_loses_to_ranked_proposer() {
        let (people, prefs) = setup(
            &["a1", "a2", "b1", "b2"],
            &[("a1", &["b1", "b2"]), ("a2", &["b1"]), ("b1", &["a2"]), ("b2", &["a1"])],
        );
        let result = stable_matches(&people, &prefs, &SidePartition::Halves);
        // a1 is displaced from b1 and falls back to b2
        assert_eq!(pairs(&result), vec![("a1", "b2"), ("a2", "b1")]);
    }

    #[test]
    fn test_unranked_proposer_never_displaces() {
        let (people, prefs) = setup(
            &["a1", "a2", "b1"],
            &[("a1", &["b1"]), ("a2", &["b1"]), ("b1", &[])],
        );
        let partition = SidePartition::Threshold {
            threshold: "b".to_string(),
        };
        let result = stable_matches(&people, &prefs, &partition);
        assert_eq!(pairs(&result), vec![("a1", "b1")]);
    }

    #[test]
    fn test_same_side_proposals_are_rejected() {
        let (people, prefs) = setup(
            &["a1", "a2", "b1", "b2"],
            &[("a1", &["a2", "b2"]), ("a2", &["a1"]), ("b2", &["a1"])],
        );
        let result = stable_matches(&people, &prefs, &SidePartition::Halves);
        assert_eq!(pairs(&result), vec![("a1", "b2")]);
        assert_eq!(result.proposals, 3);
    }

    #[test]
    fn test_repeated_proposer_is_booked_once() {
        let (people, prefs) = setup(
            &["a", "a", "b", "c", "d"],
            &[("a", &["c", "d"]), ("c", &["a"]), ("d", &["a"])],
        );
        let (side_a, side_b) = SidePartition::Halves.split(&people);
        assert_eq!(side_a, vec![ParticipantId::from("a"), ParticipantId::from("b")]);
        assert_eq!(side_b, vec![ParticipantId::from("c"), ParticipantId::from("d")]);

        for _ in 0..8 {
            let result = stable_matches(&people, &prefs, &SidePartition::Halves);
            assert_eq!(pairs(&result), vec![("a", "c")]);
            assert_eq!(result.proposals, 1);
        }
    }

    #[test]
    fn test_empty_population() {
        let result = stable_matches(&[], &HashMap::new(), &SidePartition::Halves);
        assert!(result.is_empty());
        assert_eq!(result.proposals, 0);
    }
}
