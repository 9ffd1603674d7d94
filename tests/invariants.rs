// Property tests for matching invariants

use pair_algo::core::{
    greedy::greedy_matches,
    stable::{stable_matches, SidePartition},
    Matcher, MatchingStrategy,
};
use pair_algo::models::{Participant, ParticipantId, PreferenceList, Snapshot};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

/// Populations of up to 12 participants with well-formed preference lists
fn population() -> impl Strategy<Value = Snapshot> {
    (0usize..12).prop_flat_map(|n| {
        vec(vec(0..n.max(1), 0..=n), n).prop_map(move |raw| {
            let ids: Vec<ParticipantId> = (0..n).map(|i| ParticipantId::new(format!("p{:02}", i))).collect();
            let participants = ids.iter().map(|id| Participant::new(id.clone(), id.to_string())).collect();
            let preferences = raw
                .into_iter()
                .enumerate()
                .map(|(owner, picks)| {
                    let mut seen = HashSet::new();
                    let ranked = picks
                        .into_iter()
                        .filter(|&pick| pick != owner && seen.insert(pick))
                        .map(|pick| ids[pick].clone())
                        .collect();
                    (ids[owner].clone(), ranked)
                })
                .collect();
            Snapshot::new(participants, preferences)
        })
    })
}

fn assert_one_to_one<'a>(pairs: impl Iterator<Item = (&'a ParticipantId, &'a ParticipantId)>) {
    let mut seen = HashSet::new();
    for (a, b) in pairs {
        assert_ne!(a, b, "participant matched with itself");
        assert!(seen.insert(a.clone()), "{} matched twice", a);
        assert!(seen.insert(b.clone()), "{} matched twice", b);
    }
}

fn position(prefs: &HashMap<ParticipantId, PreferenceList>, owner: &ParticipantId, id: &ParticipantId) -> Option<usize> {
    prefs.get(owner).and_then(|list| list.position(id))
}

proptest! {
    #[test]
    fn greedy_pairs_are_mutual_and_disjoint(snapshot in population()) {
        let prefs = snapshot.preference_lists();
        let matches = greedy_matches(&snapshot.participant_ids(), &prefs);

        assert_one_to_one(matches.iter().map(|m| (&m.a, &m.b)));
        for m in &matches {
            prop_assert!(position(&prefs, &m.a, &m.b).is_some());
            prop_assert!(position(&prefs, &m.b, &m.a).is_some());
            prop_assert!((1..=198).contains(&m.score));
        }
    }

    #[test]
    fn stable_pairs_cross_sides_once(snapshot in population()) {
        let participants = snapshot.participant_ids();
        let partition = SidePartition::Halves;
        let (side_a, side_b) = partition.split(&participants);
        let matching = stable_matches(&participants, &snapshot.preference_lists(), &partition);

        assert_one_to_one(matching.pairs.iter());
        for (a, b) in &matching.pairs {
            prop_assert!(side_a.contains(a));
            prop_assert!(side_b.contains(b));
        }
    }

    #[test]
    fn stable_matching_has_no_blocking_pair(snapshot in population()) {
        let participants = snapshot.participant_ids();
        let prefs = snapshot.preference_lists();
        let partition = SidePartition::Halves;
        let (side_a, side_b) = partition.split(&participants);
        let matching = stable_matches(&participants, &prefs, &partition);

        let partner_of_b: HashMap<&ParticipantId, &ParticipantId> =
            matching.pairs.iter().map(|(a, b)| (b, a)).collect();

        for a in &side_a {
            for b in &side_b {
                let (Some(a_rank_b), Some(b_rank_a)) = (position(&prefs, a, b), position(&prefs, b, a)) else {
                    continue;
                };
                if matching.pairs.get(a) == Some(b) {
                    continue;
                }

                // a would rather have b: unmatched, or b ranked above a's partner
                let a_wants = match matching.pairs.get(a) {
                    None => true,
                    Some(current) => position(&prefs, a, current).map_or(true, |r| a_rank_b < r),
                };
                // b would rather have a: free, or current holder ranked lower or not at all
                let b_wants = match partner_of_b.get(b) {
                    None => true,
                    Some(holder) => position(&prefs, b, holder).map_or(true, |r| b_rank_a < r),
                };

                prop_assert!(!(a_wants && b_wants), "blocking pair {} / {}", a, b);
            }
        }
    }

    #[test]
    fn runs_are_deterministic(snapshot in population()) {
        let matcher = Matcher::default();
        for strategy in [MatchingStrategy::Greedy, MatchingStrategy::StableDeferredAcceptance] {
            let first = matcher.run(strategy, &snapshot);
            let second = matcher.run(strategy, &snapshot.clone());
            prop_assert_eq!(first.matches, second.matches);
            prop_assert_eq!(first.unmatched, second.unmatched);
        }
    }

    #[test]
    fn run_accounts_for_every_participant(snapshot in population()) {
        let matcher = Matcher::default();
        for strategy in [MatchingStrategy::Greedy, MatchingStrategy::StableDeferredAcceptance] {
            let run = matcher.run(strategy, &snapshot);
            prop_assert_eq!(run.matches.len() * 2 + run.unmatched.len(), snapshot.participants.len());
        }
    }

    #[test]
    fn repeated_participants_are_matched_once(snapshot in population(), repeat in 0usize..12) {
        let mut listed = snapshot.clone();
        if let Some(p) = snapshot.participants.get(repeat % snapshot.participants.len().max(1)) {
            listed.participants.push(p.clone());
        }

        let matcher = Matcher::default();
        for strategy in [MatchingStrategy::Greedy, MatchingStrategy::StableDeferredAcceptance] {
            let run = matcher.run(strategy, &listed);
            assert_one_to_one(run.matches.iter().map(|m| (&m.a, &m.b)));
            prop_assert_eq!(run.matches.len() * 2 + run.unmatched.len(), snapshot.participants.len());
            prop_assert_eq!(run.matches, matcher.run(strategy, &snapshot).matches);
        }
    }
}
