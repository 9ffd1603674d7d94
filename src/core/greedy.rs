use crate::models::{Match, ParticipantId, PreferenceList};
use std::collections::{HashMap, HashSet};

/// Score floor for a greedy match
pub const MIN_GREEDY_SCORE: i64 = 1;

/// Score before subtracting both 1-based ranks
const GREEDY_SCORE_CEILING: i64 = 200;

/// Pair participants greedily on the first mutual preference found
///
/// Participants are scanned in the given order. For each participant not yet
/// paired, the first other unpaired participant (same order) that they list
/// and that lists them back becomes their match. The result is
/// deterministic for a given order but not score-optimal: the first mutual
/// candidate wins even if a better one exists further along.
///
/// Score: `max(1, 200 - (rank(u1 -> u2) + rank(u2 -> u1)))`, ranks 1-based.
pub fn greedy_matches(
    participants: &[ParticipantId],
    prefs_by_owner: &HashMap<ParticipantId, PreferenceList>,
) -> Vec<Match> {
    let mut processed: HashSet<&ParticipantId> = HashSet::with_capacity(participants.len());
    let mut matches = Vec::new();

    for u1 in participants {
        if processed.contains(u1) {
            continue;
        }
        let Some(u1_prefs) = prefs_by_owner.get(u1) else {
            continue;
        };

        for u2 in participants {
            if u1 == u2 || processed.contains(u2) {
                continue;
            }
            let Some(u2_prefs) = prefs_by_owner.get(u2) else {
                continue;
            };

            if let (Some(u1_rank), Some(u2_rank)) = (u1_prefs.rank_of(u2), u2_prefs.rank_of(u1)) {
                let score = greedy_score(u1_rank, u2_rank);
                tracing::trace!("Greedy match {} <-> {} (score {})", u1, u2, score);

                matches.push(Match {
                    a: u1.clone(),
                    b: u2.clone(),
                    score,
                });
                processed.insert(u1);
                processed.insert(u2);
                break;
            }
        }
    }

    tracing::debug!(
        "Greedy matcher paired {} of {} participants",
        matches.len() * 2,
        participants.len()
    );

    matches
}

#[inline]
fn greedy_score(u1_rank: usize, u2_rank: usize) -> i64 {
    let ranks = (u1_rank + u2_rank) as i64;
    (GREEDY_SCORE_CEILING - ranks).max(MIN_GREEDY_SCORE)
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

    #[test]
    fn test_single_mutual_pair() {
        let (people, prefs) = setup(&["a", "b", "c"], &[("a", &["b", "c"]), ("b", &["a"]), ("c", &[])]);
        let matches = greedy_matches(&people, &prefs);
        assert_eq!(
            matches,
            vec![Match {
                a: "a".into(),
                b: "b".into(),
                score: 198
            }]
        );
    }

    #[test]
    fn test_first_mutual_candidate_wins() {
        // a's favourite is c, but b comes first in listing order
        let (people, prefs) = setup(
            &["a", "b", "c"],
            &[("a", &["c", "b"]), ("b", &["a"]), ("c", &["a"])],
        );
        let matches = greedy_matches(&people, &prefs);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].b.as_str(), "b");
        assert_eq!(matches[0].score, 197);
    }

    #[test]
    fn test_listing_order_changes_outcome() {
        let lists: &[(&str, &[&str])] = &[("a", &["c", "b"]), ("b", &["a"]), ("c", &["a"])];
        let (people, prefs) = setup(&["a", "c", "b"], lists);
        let matches = greedy_matches(&people, &prefs);
        assert_eq!(matches[0].b.as_str(), "c");
        assert_eq!(matches[0].score, 198);
    }

    #[test]
    fn test_cycle_has_no_matches() {
        let (people, prefs) = setup(&["a", "b", "c"], &[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);
        assert!(greedy_matches(&people, &prefs).is_empty());
    }

    #[test]
    fn test_score_floor() {
        assert_eq!(greedy_score(150, 120), MIN_GREEDY_SCORE);
        assert_eq!(greedy_score(1, 1), 198);
    }

    #[test]
    fn test_processed_participants_are_skipped() {
        let (people, prefs) = setup(
            &["a", "b", "c", "d"],
            &[("a", &["b"]), ("b", &["a", "c"]), ("c", &["b", "d"]), ("d", &["c"])],
        );
        let matches = greedy_matches(&people, &prefs);
        assert_eq!(matches.len(), 2);
        assert_eq!((matches[0].a.as_str(), matches[0].b.as_str()), ("a", "b"));
        assert_eq!((matches[1].a.as_str(), matches[1].b.as_str()), ("c", "d"));
    }
}
