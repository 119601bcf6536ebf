//! Postponement target resolution.
//!
//! The feed reports a postponed fixture under its new kickoff date, so the stored record can
//! never be found by natural key. The resolver picks the stored match the postponement most
//! plausibly refers to instead.

use chrono::{DateTime, Utc};

use crate::db_types::{Match, MatchStatus};

/// Picks the `Timed` match whose kickoff lies closest to `reference`, measured in absolute
/// seconds. Ties go to the earliest listed candidate, so the choice is stable for a given
/// candidate order. Returns an index into `candidates`.
pub fn nearest_timed_match(reference: DateTime<Utc>, candidates: &[Match]) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .filter(|(_, m)| m.status == MatchStatus::Timed)
        .min_by_key(|(_, m)| (m.match_date - reference).num_seconds().abs())
        .map(|(index, _)| index)
}
