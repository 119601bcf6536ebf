#![allow(dead_code)]

pub mod prepare_env;

use chrono::{DateTime, Duration, Utc};
use log::*;
use matchday_engine::{
    db_types::{Bet, Match, MatchStatus, MatchUpdate, Outcome, Slip, SlipId},
    events::EventProducers,
    MatchStore,
    MatchSyncApi,
    MemorySlipCache,
    SqliteDatabase,
};
use mbg_common::{Money, Odds};
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::support::prepare_env::{prepare_test_env, random_db_path};

pub type TestApi = MatchSyncApi<SqliteDatabase, MemorySlipCache, SqliteDatabase>;

pub async fn setup() -> TestApi {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    MatchSyncApi::new(db.clone(), MemorySlipCache::new(), db, EventProducers::default())
}

pub async fn tear_down(mut api: TestApi) {
    if let Err(e) = api.store_mut().close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    Sqlite::drop_database(api.store().url()).await.unwrap();
}

/// A fixed kickoff base so dates survive storage round-trips byte for byte.
pub fn kickoff(hours: i64) -> DateTime<Utc> {
    let base = DateTime::parse_from_rfc3339("2026-09-05T15:00:00Z").unwrap().with_timezone(&Utc);
    base + Duration::hours(hours)
}

pub fn timed_update(home: &str, away: &str, competition: &str, date: DateTime<Utc>) -> MatchUpdate {
    MatchUpdate {
        status: MatchStatus::Timed,
        competition_id: competition.to_string(),
        team_home: home.to_string(),
        team_away: away.to_string(),
        match_date: date,
        home_goals: 0,
        away_goals: 0,
    }
}

/// The same fixture as `origin`, reported again with a different status and scores.
pub fn status_update(origin: &MatchUpdate, status: MatchStatus, home_goals: i64, away_goals: i64) -> MatchUpdate {
    MatchUpdate { status, home_goals, away_goals, ..origin.clone() }
}

pub async fn stored_match(api: &TestApi, update: &MatchUpdate) -> Option<Match> {
    api.store().fetch_match_by_key(&update.key()).await.unwrap()
}

/// A bet on a stored match with explicitly chosen odds, so payouts are predictable.
pub fn bet(record: &Match, market: &str, odds_hundredths: i64) -> Bet {
    Bet {
        match_id: record.id,
        match_date: record.match_date,
        competition_id: record.competition_id.clone(),
        team_home: record.team_home.clone(),
        team_away: record.team_away.clone(),
        multiplier_name: market.to_string(),
        multiplier_value: Odds::from_hundredths(odds_hundredths),
        outcome: Outcome::Unresolved,
    }
}

/// A cached bet for a fixture that may not be stored at all. Reconciliation only looks at the
/// team pair.
pub fn bet_for_teams(home: &str, away: &str, market: &str) -> Bet {
    Bet {
        match_id: Default::default(),
        match_date: kickoff(24),
        competition_id: "IT1".to_string(),
        team_home: home.to_string(),
        team_away: away.to_string(),
        multiplier_name: market.to_string(),
        multiplier_value: Odds::from_hundredths(200),
        outcome: Outcome::Unresolved,
    }
}

pub fn confirmed_slip(id: i64, username: &str, stake: Money, bets: Vec<Bet>) -> Slip {
    Slip {
        slip_id: SlipId(id),
        username: username.to_string(),
        stake,
        payout: Money::default(),
        outcome: Outcome::Unresolved,
        created_at: kickoff(-24),
        confirmed_at: Some(kickoff(-23)),
        bets,
    }
}
