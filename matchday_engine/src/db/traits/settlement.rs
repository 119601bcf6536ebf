use chrono::{DateTime, Utc};

use crate::{db::traits::SettlementReport, db_types::MatchId};

/// The behavior of the confirmed-slip ledger.
///
/// Confirmed slips are accumulators. A slip pays out only when every one of its legs has won,
/// and then pays the stake folded through the odds of every leg. Losing a single leg loses the
/// slip. Bets carry their own odds and team names, so the ledger also has to be told when the
/// match data they snapshot goes stale.
#[allow(async_fn_in_trait)]
pub trait BetSettlement: Clone {
    type Error: std::error::Error;

    /// Resolves every open bet riding on the match against its final score, then closes each
    /// affected slip that has no open legs left.
    ///
    /// Callers must invoke this exactly once per match, after claiming the settled marker via
    /// [`MatchStore::mark_finished`](crate::MatchStore::mark_finished).
    async fn settle_bets_for_match(&self, id: MatchId) -> Result<SettlementReport, Self::Error>;

    /// Drops every bet riding on the match and sweeps away open slips that are left empty.
    /// Used when a match is canceled outright. Returns the number of bets removed.
    async fn remove_all_bets_for_match(&self, id: MatchId) -> Result<u64, Self::Error>;

    /// Rewrites the kickoff date snapshotted onto bets riding on the match. Used when a match
    /// is postponed to a new date. Returns the number of bets touched.
    async fn reschedule_bets_for_match(&self, id: MatchId, new_date: DateTime<Utc>) -> Result<u64, Self::Error>;
}
