use std::fmt::{Display, Formatter};

use crate::db_types::{Match, MatchId};

/// The result of trying to insert a new match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertMatchResult {
    /// The match was new and has been saved under the given id.
    Inserted(MatchId),
    /// A match with the same kickoff date and teams is already stored. Nothing was written.
    AlreadyExists(MatchId),
    /// The match failed validation and was not written.
    Rejected(String),
}

/// The result of flipping a match to `Finished`.
///
/// The settled marker is written in the same statement as the status flip, so exactly one
/// caller ever observes [`FinishOutcome::Settled`] for a given match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishOutcome {
    /// The match was open and is now finished, with final scores applied. The caller owns the
    /// one and only settlement run for this match.
    Settled(Match),
    /// The settled marker was already set. A replayed result, nothing to do.
    AlreadySettled,
    /// No match with that id exists.
    NotFound,
}

/// Counters describing a single settlement run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettlementReport {
    pub bets_settled: u64,
    pub slips_won: u64,
    pub slips_lost: u64,
}

impl SettlementReport {
    pub fn slips_closed(&self) -> u64 {
        self.slips_won + self.slips_lost
    }
}

impl Display for SettlementReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} bets settled. {} slips won and {} slips lost.",
            self.bets_settled, self.slips_won, self.slips_lost
        )
    }
}
