use chrono::{DateTime, Utc};

use crate::{
    db::traits::{FinishOutcome, InsertMatchResult},
    db_types::{Match, MatchId, MatchKey, MatchStatus, NewMatch},
};

/// The canonical record of matches.
///
/// The synchronization API reduces every feed transition to the primitives below, so a backend
/// that implements them correctly gets the full lifecycle behavior for free. Two promises
/// matter more than the rest:
///
/// * [`insert_match`](Self::insert_match) is idempotent over the natural key. Feeding the same
///   scheduled fixture through twice stores it once.
/// * [`mark_finished`](Self::mark_finished) flips the status and the settled marker in one
///   atomic step, and reports [`FinishOutcome::Settled`] to exactly one caller.
#[allow(async_fn_in_trait)]
pub trait MatchStore: Clone {
    type Error: std::error::Error;

    /// The URL of the backing store.
    fn url(&self) -> &str;

    /// The id the next inserted match will receive.
    ///
    /// Ids are dense and increasing. The id is derived from the highest id handed out in the
    /// recent past (roughly the last two months of fixtures), falling back to the highest id
    /// overall, so a store that has seen no matches at all starts at 0.
    async fn next_match_id(&self) -> Result<MatchId, Self::Error>;

    /// Looks up a match id by its natural key.
    async fn find_match_id(&self, key: &MatchKey) -> Result<Option<MatchId>, Self::Error>;

    async fn fetch_match(&self, id: MatchId) -> Result<Option<Match>, Self::Error>;

    async fn fetch_match_by_key(&self, key: &MatchKey) -> Result<Option<Match>, Self::Error>;

    /// Stores a new `Timed`, goalless match, unless one with the same natural key exists.
    async fn insert_match(&self, new_match: NewMatch) -> Result<InsertMatchResult, Self::Error>;

    /// Moves a match to a new kickoff date and pins its status back to `Timed`.
    async fn update_match_date(&self, id: MatchId, new_date: DateTime<Utc>) -> Result<(), Self::Error>;

    /// Applies an in-flight status and the current scores to a match.
    async fn update_match_result(
        &self,
        id: MatchId,
        status: MatchStatus,
        home_goals: i64,
        away_goals: i64,
    ) -> Result<(), Self::Error>;

    /// Flips a match to `Finished` with its final scores and claims the settled marker.
    async fn mark_finished(&self, id: MatchId, home_goals: i64, away_goals: i64)
        -> Result<FinishOutcome, Self::Error>;

    /// All `Timed` matches in a competition, in insertion order.
    async fn timed_matches_for_competition(&self, competition_id: &str) -> Result<Vec<Match>, Self::Error>;

    /// Deletes the match with the given natural key. Returns false if there was none.
    async fn delete_match(&self, key: &MatchKey) -> Result<bool, Self::Error>;

    async fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
