use crate::core::validation::{validate_list, InputViolation};
use crate::models::{Participant, ParticipantId, PreferenceList, ScoredCandidate};
use std::collections::{HashMap, HashSet};

/// Score awarded to any mutual candidate before rank adjustment
pub const MUTUAL_BASE_SCORE: i64 = 100;

/// Weight applied to the summed normalized ranks (two ranks in [0, 1])
const RANKING_WEIGHT: f64 = 50.0;

/// Rank a viewer's candidates by mutual desirability
///
/// Scoring formula, for a candidate `c` that also lists the viewer:
/// score = 100 + round((
///     (1 - viewer_rank / len(viewer_prefs)) +   # how much the viewer wants c
///     (1 - their_rank / len(c_prefs))           # how much c wants the viewer
/// ) * 50)
///
/// Ranks are 0-based. Candidates that do not list the viewer score 0 and are
/// dropped. Results are sorted by descending score; ties keep the viewer's
/// order.
///
/// # Errors
/// Returns an [`InputViolation`] when `viewer_prefs` belongs to someone else
/// or is malformed against `participants_by_id`.
pub fn score_candidates(
    viewer: &ParticipantId,
    viewer_prefs: &PreferenceList,
    all_prefs: &HashMap<ParticipantId, PreferenceList>,
    participants_by_id: &HashMap<ParticipantId, Participant>,
) -> Result<Vec<ScoredCandidate>, InputViolation> {
    if &viewer_prefs.owner != viewer {
        return Err(InputViolation::OwnerMismatch {
            expected: viewer.clone(),
            found: viewer_prefs.owner.clone(),
        });
    }

    if viewer_prefs.is_empty() {
        return Ok(Vec::new());
    }

    let known: HashSet<&ParticipantId> = participants_by_id.keys().collect();
    validate_list(viewer_prefs, &known)?;

    let mut scored: Vec<ScoredCandidate> = viewer_prefs
        .ranked
        .iter()
        .enumerate()
        .filter_map(|(viewer_rank, candidate)| {
            let their_prefs = all_prefs.get(candidate)?;
            let score = mutual_score(viewer_rank, viewer_prefs.len(), viewer, their_prefs);

            if score > 0 {
                let participant = participants_by_id.get(candidate)?.clone();
                Some(ScoredCandidate { participant, score })
            } else {
                None
            }
        })
        .collect();

    // sort_by is stable: equal scores keep the viewer's ranking order
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    tracing::debug!(
        "Scored {} mutual candidates for {} (of {} preferred)",
        scored.len(),
        viewer,
        viewer_prefs.len()
    );

    Ok(scored)
}

/// Score of `b` from `a`'s point of view, `None` when the pair is not mutual
pub fn pair_score(
    a: &ParticipantId,
    b: &ParticipantId,
    all_prefs: &HashMap<ParticipantId, PreferenceList>,
) -> Option<i64> {
    let a_prefs = all_prefs.get(a)?;
    let b_prefs = all_prefs.get(b)?;
    let a_rank = a_prefs.position(b)?;

    match mutual_score(a_rank, a_prefs.len(), a, b_prefs) {
        0 => None,
        score => Some(score),
    }
}

/// Combined score of a candidate at `viewer_rank` in a list of `viewer_len`
#[inline]
fn mutual_score(
    viewer_rank: usize,
    viewer_len: usize,
    viewer: &ParticipantId,
    their_prefs: &PreferenceList,
) -> i64 {
    let Some(their_rank) = their_prefs.position(viewer) else {
        return 0;
    };

    let ranking = (normalize_rank(viewer_rank, viewer_len)
        + normalize_rank(their_rank, their_prefs.len()))
        * RANKING_WEIGHT;

    // operand is never negative, so half-away-from-zero equals half-up
    MUTUAL_BASE_SCORE + ranking.round() as i64
}

/// Map a 0-based rank to (0, 1], rank 0 giving 1
///
/// A single-entry list always normalizes to 1.
#[inline]
fn normalize_rank(rank: usize, len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    1.0 - rank as f64 / len as f64
}
