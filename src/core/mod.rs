// Core algorithm exports
pub mod greedy;
pub mod matcher;
pub mod scoring;
pub mod stable;
pub mod validation;

pub use greedy::greedy_matches;
pub use matcher::{Matcher, MatchRun, MatchingStrategy};
pub use scoring::{pair_score, score_candidates};
pub use stable::{stable_matches, SidePartition, StableMatching};
pub use validation::{sanitize_snapshot, validate_list, InputViolation, ValidatedSnapshot};
