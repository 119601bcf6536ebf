use std::fmt::{Debug, Formatter};

use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlx::SqlitePool;

use super::{db_url, matches, new_pool, slips, SqliteDatabaseError};
use crate::{
    db::traits::{BetSettlement, FinishOutcome, InsertMatchResult, MatchStore, SettlementReport},
    db_types::{Match, MatchId, MatchKey, MatchStatus, NewMatch, Slip, SlipId},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    /// Connects to the database given by the `MDS_DATABASE_URL` environment variable.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. The migration scripts are embedded in the binary.
    pub async fn run_migrations(&self) -> Result<(), SqliteDatabaseError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Writes a confirmed slip and its legs in one transaction.
    pub async fn insert_confirmed_slip(&self, slip: &Slip) -> Result<(), SqliteDatabaseError> {
        let mut tx = self.pool.begin().await?;
        slips::insert_confirmed_slip(slip, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn fetch_slip(&self, slip_id: SlipId) -> Result<Option<Slip>, SqliteDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        slips::fetch_slip(slip_id, &mut conn).await
    }
}

impl MatchStore for SqliteDatabase {
    type Error = SqliteDatabaseError;

    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn next_match_id(&self) -> Result<MatchId, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        matches::next_match_id(&mut conn).await
    }

    async fn find_match_id(&self, key: &MatchKey) -> Result<Option<MatchId>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        matches::find_match_id(key, &mut conn).await
    }

    async fn fetch_match(&self, id: MatchId) -> Result<Option<Match>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        matches::fetch_match(id, &mut conn).await
    }

    async fn fetch_match_by_key(&self, key: &MatchKey) -> Result<Option<Match>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        matches::fetch_match_by_key(key, &mut conn).await
    }

    async fn insert_match(&self, new_match: NewMatch) -> Result<InsertMatchResult, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let result = matches::idempotent_insert(new_match, &mut tx).await?;
        tx.commit().await?;
        if let InsertMatchResult::Inserted(id) = &result {
            debug!("🗃️ New match {id} saved");
        }
        Ok(result)
    }

    async fn update_match_date(&self, id: MatchId, new_date: DateTime<Utc>) -> Result<(), Self::Error> {
        let mut conn = self.pool.acquire().await?;
        matches::update_match_date(id, new_date, &mut conn).await
    }

    async fn update_match_result(
        &self,
        id: MatchId,
        status: MatchStatus,
        home_goals: i64,
        away_goals: i64,
    ) -> Result<(), Self::Error> {
        let mut conn = self.pool.acquire().await?;
        matches::update_match_result(id, status, home_goals, away_goals, &mut conn).await
    }

    async fn mark_finished(
        &self,
        id: MatchId,
        home_goals: i64,
        away_goals: i64,
    ) -> Result<FinishOutcome, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let outcome = matches::mark_finished(id, home_goals, away_goals, &mut tx).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    async fn timed_matches_for_competition(&self, competition_id: &str) -> Result<Vec<Match>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        matches::fetch_matches(Some(competition_id), Some(MatchStatus::Timed), &mut conn).await
    }

    async fn delete_match(&self, key: &MatchKey) -> Result<bool, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        let deleted = matches::delete_match(key, &mut conn).await?;
        if deleted {
            debug!("🗃️ Match {key} deleted");
        }
        Ok(deleted)
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        self.pool.close().await;
        Ok(())
    }
}

impl BetSettlement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn settle_bets_for_match(&self, id: MatchId) -> Result<SettlementReport, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let match_record = matches::fetch_match(id, &mut tx).await?.ok_or(SqliteDatabaseError::MatchNotFound(id))?;
        let report = slips::settle_match(&match_record, &mut tx).await?;
        tx.commit().await?;
        info!("🧾 Match {id} settled. {report}");
        Ok(report)
    }

    async fn remove_all_bets_for_match(&self, id: MatchId) -> Result<u64, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let removed = slips::remove_bets_for_match(id, &mut tx).await?;
        tx.commit().await?;
        Ok(removed)
    }

    async fn reschedule_bets_for_match(&self, id: MatchId, new_date: DateTime<Utc>) -> Result<u64, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        slips::reschedule_bets_for_match(id, new_date, &mut conn).await
    }
}
