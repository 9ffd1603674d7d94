use crate::core::{
    greedy::greedy_matches,
    scoring::{pair_score, score_candidates},
    stable::{stable_matches, SidePartition, StableMatching},
    validation::{sanitize_snapshot, InputViolation},
};
use crate::models::{Match, ParticipantId, ScoredCandidate, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Population-wide matching algorithm
///
/// The two strategies are independent and give different guarantees:
///
/// - `Greedy`: every pair is mutual (each lists the other). Not optimal and not
///   stable; the first mutual candidate in listing order wins.
/// - `StableDeferredAcceptance`: no blocking pair among participants who rank
///   each other, optimal for the proposing side. Pairs need not be mutual (a
///   free responder holds any offer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchingStrategy {
    #[default]
    #[serde(rename = "greedy")]
    Greedy,
    #[serde(rename = "stable", alias = "stable_deferred_acceptance")]
    StableDeferredAcceptance,
}

impl fmt::Display for MatchingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchingStrategy::Greedy => f.write_str("greedy"),
            MatchingStrategy::StableDeferredAcceptance => f.write_str("stable"),
        }
    }
}

impl FromStr for MatchingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "greedy" => Ok(MatchingStrategy::Greedy),
            "stable" | "stable_deferred_acceptance" => Ok(MatchingStrategy::StableDeferredAcceptance),
            other => Err(format!("unknown matching strategy: {}", other)),
        }
    }
}

/// Result of a population-wide run
#[derive(Debug, Clone, Serialize)]
pub struct MatchRun {
    pub strategy: MatchingStrategy,
    pub matches: Vec<Match>,
    /// Participants left without a partner, in listing order
    pub unmatched: Vec<ParticipantId>,
    /// Preference lists skipped as malformed
    pub violations: Vec<InputViolation>,
}

/// Matching orchestrator over a population snapshot
///
/// # Pipeline
/// 1. Validate the snapshot, dropping malformed preference lists
/// 2. Run the requested strategy
/// 3. Attach scores and collect unmatched participants
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    partition: SidePartition,
}

impl Matcher {
    pub fn new(partition: SidePartition) -> Self {
        Self { partition }
    }

    pub fn partition(&self) -> &SidePartition {
        &self.partition
    }

    /// Rank the candidates `viewer` has listed by mutual score
    ///
    /// # Errors
    /// `UnknownOwner` if the viewer is not in the snapshot, or the violation
    /// found in the viewer's own list.
    pub fn score_for(
        &self,
        snapshot: &Snapshot,
        viewer: &ParticipantId,
    ) -> Result<Vec<ScoredCandidate>, InputViolation> {
        if !snapshot.contains(viewer) {
            return Err(InputViolation::UnknownOwner {
                owner: viewer.clone(),
            });
        }

        score_candidates(
            viewer,
            &snapshot.preference_list(viewer),
            &snapshot.preference_lists(),
            &snapshot.participants_by_id(),
        )
    }

    /// Greedy mutual matching over the snapshot
    pub fn greedy(&self, snapshot: &Snapshot) -> MatchRun {
        let validated = sanitize_snapshot(snapshot);
        let participants = validated.snapshot.participant_ids();
        let prefs = validated.snapshot.preference_lists();

        let matches = greedy_matches(&participants, &prefs);

        MatchRun {
            strategy: MatchingStrategy::Greedy,
            unmatched: unmatched(&participants, &matches),
            matches,
            violations: validated.violations,
        }
    }

    /// Deferred acceptance over the snapshot, unscored
    pub fn stable(&self, snapshot: &Snapshot) -> (StableMatching, Vec<InputViolation>) {
        let validated = sanitize_snapshot(snapshot);
        let matching = stable_matches(
            &validated.snapshot.participant_ids(),
            &validated.snapshot.preference_lists(),
            &self.partition,
        );
        (matching, validated.violations)
    }

    /// Run a strategy and produce a scored match set
    ///
    /// Stable pairs carry the proposer-side pairwise score when the pair is
    /// mutual and 0 otherwise.
    pub fn run(&self, strategy: MatchingStrategy, snapshot: &Snapshot) -> MatchRun {
        let run = match strategy {
            MatchingStrategy::Greedy => self.greedy(snapshot),
            MatchingStrategy::StableDeferredAcceptance => {
                let validated = sanitize_snapshot(snapshot);
                let participants = validated.snapshot.participant_ids();
                let prefs = validated.snapshot.preference_lists();

                let matches: Vec<Match> = stable_matches(&participants, &prefs, &self.partition)
                    .pairs
                    .into_iter()
                    .map(|(a, b)| {
                        let score = pair_score(&a, &b, &prefs).unwrap_or(0);
                        Match { a, b, score }
                    })
                    .collect();

                MatchRun {
                    strategy,
                    unmatched: unmatched(&participants, &matches),
                    matches,
                    violations: validated.violations,
                }
            }
        };

        tracing::info!(
            "{} matching produced {} pairs ({} unmatched, {} skipped lists)",
            strategy,
            run.matches.len(),
            run.unmatched.len(),
            run.violations.len()
        );

        run
    }
}

fn unmatched(participants: &[ParticipantId], matches: &[Match]) -> Vec<ParticipantId> {
    let paired: HashSet<&ParticipantId> = matches.iter().flat_map(|m| [&m.a, &m.b]).collect();
    participants
        .iter()
        .filter(|id| !paired.contains(id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Participant;
    use std::collections::HashMap;

    fn create_snapshot(lists: &[(&str, &[&str])]) -> Snapshot {
        let participants = ["a", "b", "c"]
            .iter()
            .map(|id| Participant::new(*id, format!("User {}", id)))
            .collect();
        let preferences: HashMap<ParticipantId, Vec<ParticipantId>> = lists
            .iter()
            .map(|(owner, list)| {
                (
                    ParticipantId::from(*owner),
                    list.iter().map(|id| ParticipantId::from(*id)).collect(),
                )
            })
            .collect();
        Snapshot::new(participants, preferences)
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("greedy".parse::<MatchingStrategy>(), Ok(MatchingStrategy::Greedy));
        assert_eq!(
            "Stable".parse::<MatchingStrategy>(),
            Ok(MatchingStrategy::StableDeferredAcceptance)
        );
        assert!("random".parse::<MatchingStrategy>().is_err());
    }

    #[test]
    fn test_strategy_serde_names() {
        let json = serde_json::to_string(&MatchingStrategy::StableDeferredAcceptance).unwrap();
        assert_eq!(json, "\"stable\"");
        let parsed: MatchingStrategy = serde_json::from_str("\"stable_deferred_acceptance\"").unwrap();
        assert_eq!(parsed, MatchingStrategy::StableDeferredAcceptance);
    }

    #[test]
    fn test_greedy_run_reports_unmatched() {
        let snapshot = create_snapshot(&[("a", &["b", "c"]), ("b", &["a"]), ("c", &[])]);
        let run = Matcher::default().run(MatchingStrategy::Greedy, &snapshot);
        assert_eq!(run.matches.len(), 1);
        assert_eq!(run.matches[0].score, 198);
        assert_eq!(run.unmatched, vec![ParticipantId::from("c")]);
        assert!(run.violations.is_empty());
    }

    #[test]
    fn test_stable_run_scores_mutual_pairs() {
        let snapshot = create_snapshot(&[("a", &["b"]), ("b", &["a"])]);
        let matcher = Matcher::new(SidePartition::Threshold {
            threshold: "b".to_string(),
        });
        let run = matcher.run(MatchingStrategy::StableDeferredAcceptance, &snapshot);
        assert_eq!(run.matches.len(), 1);
        assert_eq!(run.matches[0].score, 200);
        assert_eq!(run.unmatched, vec![ParticipantId::from("c")]);
    }

    #[test]
    fn test_stable_run_non_mutual_pair_scores_zero() {
        let snapshot = create_snapshot(&[("a", &["b"]), ("b", &["c"])]);
        let matcher = Matcher::new(SidePartition::Threshold {
            threshold: "b".to_string(),
        });
        let run = matcher.run(MatchingStrategy::StableDeferredAcceptance, &snapshot);
        assert_eq!(run.matches[0].score, 0);
    }

    #[test]
    fn test_malformed_list_is_skipped_not_fatal() {
        let snapshot = create_snapshot(&[("a", &["b", "b"]), ("b", &["c"]), ("c", &["b"])]);
        let run = Matcher::default().run(MatchingStrategy::Greedy, &snapshot);
        assert_eq!(run.violations.len(), 1);
        assert_eq!(run.matches.len(), 1);
        assert_eq!(run.matches[0].a.as_str(), "b");
    }

    #[test]
    fn test_repeated_participant_matched_once() {
        let participants = ["a", "a", "b", "c", "d"]
            .iter()
            .map(|id| Participant::new(*id, format!("User {}", id)))
            .collect();
        let preferences = HashMap::from([
            (ParticipantId::from("a"), vec![ParticipantId::from("c"), ParticipantId::from("d")]),
            (ParticipantId::from("c"), vec![ParticipantId::from("a")]),
            (ParticipantId::from("d"), vec![ParticipantId::from("a")]),
        ]);
        let snapshot = Snapshot::new(participants, preferences);

        for strategy in [MatchingStrategy::Greedy, MatchingStrategy::StableDeferredAcceptance] {
            let run = Matcher::default().run(strategy, &snapshot);
            assert_eq!(run.matches.len(), 1);
            assert_eq!(run.matches[0].a.as_str(), "a");
            assert_eq!(run.matches[0].b.as_str(), "c");
            assert_eq!(run.unmatched, vec![ParticipantId::from("b"), ParticipantId::from("d")]);
            assert_eq!(
                run.violations,
                vec![InputViolation::DuplicateParticipant { owner: "a".into() }]
            );
        }
    }

    #[test]
    fn test_score_for_unknown_viewer() {
        let snapshot = create_snapshot(&[]);
        let err = Matcher::default().score_for(&snapshot, &"zed".into()).unwrap_err();
        assert!(matches!(err, InputViolation::UnknownOwner { .. }));
    }
}
