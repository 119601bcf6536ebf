//! Query functions for the `matches` table. Everything here runs against a borrowed
//! connection. Transaction boundaries belong to the caller.

use chrono::{DateTime, Months, Utc};
use log::debug;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, SqliteConnection};

use super::SqliteDatabaseError;
use crate::{
    db::traits::{FinishOutcome, InsertMatchResult},
    db_types::{Match, MatchId, MatchKey, MatchStatus, Multiplier, NewMatch},
};

/// New ids are scoped to recently scheduled matches, so the sequence stays dense even after
/// old seasons are archived out of the table.
const ID_WINDOW_MONTHS: u32 = 2;

pub(crate) fn match_from_row(row: &SqliteRow) -> Result<Match, SqliteDatabaseError> {
    let multipliers_json: String = row.try_get("multipliers")?;
    let multipliers = serde_json::from_str::<Vec<Multiplier>>(&multipliers_json)?;
    Ok(Match {
        id: row.try_get("match_id")?,
        competition_id: row.try_get("competition_id")?,
        team_home: row.try_get("team_home")?,
        team_away: row.try_get("team_away")?,
        match_date: row.try_get("match_date")?,
        status: row.try_get("status")?,
        home_goals: row.try_get("home_goals")?,
        away_goals: row.try_get("away_goals")?,
        settled: row.try_get("settled")?,
        multipliers,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// The id the next inserted match will receive: one past the highest id among matches
/// scheduled in the last [`ID_WINDOW_MONTHS`] months, falling back to the highest id overall.
/// An empty table starts the sequence at 0.
pub async fn next_match_id(conn: &mut SqliteConnection) -> Result<MatchId, SqliteDatabaseError> {
    let cutoff = Utc::now().checked_sub_months(Months::new(ID_WINDOW_MONTHS));
    let last_in_window = match cutoff {
        Some(cutoff) => {
            sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(match_id) FROM matches WHERE match_date >= ?")
                .bind(cutoff)
                .fetch_one(&mut *conn)
                .await?
        },
        None => None,
    };
    let last = match last_in_window {
        Some(id) => Some(id),
        None => {
            sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(match_id) FROM matches")
                .fetch_one(&mut *conn)
                .await?
        },
    };
    Ok(last.map(|id| MatchId(id + 1)).unwrap_or_default())
}

pub async fn find_match_id(
    key: &MatchKey,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchId>, SqliteDatabaseError> {
    let id = sqlx::query_scalar::<_, MatchId>(
        "SELECT match_id FROM matches WHERE match_date = ? AND team_home = ? AND team_away = ?",
    )
    .bind(key.match_date)
    .bind(&key.team_home)
    .bind(&key.team_away)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn fetch_match(id: MatchId, conn: &mut SqliteConnection) -> Result<Option<Match>, SqliteDatabaseError> {
    let row = sqlx::query("SELECT * FROM matches WHERE match_id = ?").bind(id).fetch_optional(&mut *conn).await?;
    row.map(|r| match_from_row(&r)).transpose()
}

pub async fn fetch_match_by_key(
    key: &MatchKey,
    conn: &mut SqliteConnection,
) -> Result<Option<Match>, SqliteDatabaseError> {
    let row = sqlx::query("SELECT * FROM matches WHERE match_date = ? AND team_home = ? AND team_away = ?")
        .bind(key.match_date)
        .bind(&key.team_home)
        .bind(&key.team_away)
        .fetch_optional(&mut *conn)
        .await?;
    row.map(|r| match_from_row(&r)).transpose()
}

/// Inserts a new match, unless one with the same natural key already exists. The duplicate
/// check and the insert share the connection, so run both inside one transaction.
pub async fn idempotent_insert(
    new_match: NewMatch,
    conn: &mut SqliteConnection,
) -> Result<InsertMatchResult, SqliteDatabaseError> {
    if let Err(e) = new_match.check_validity() {
        return Ok(InsertMatchResult::Rejected(e.to_string()));
    }
    match find_match_id(&new_match.key(), conn).await? {
        Some(id) => Ok(InsertMatchResult::AlreadyExists(id)),
        None => insert_match(new_match, conn).await.map(InsertMatchResult::Inserted),
    }
}

async fn insert_match(new_match: NewMatch, conn: &mut SqliteConnection) -> Result<MatchId, SqliteDatabaseError> {
    let id = next_match_id(&mut *conn).await?;
    let multipliers = serde_json::to_string(&new_match.multipliers)?;
    sqlx::query(
        r#"INSERT INTO matches (match_id, competition_id, team_home, team_away, match_date, status, multipliers)
        VALUES (?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(id)
    .bind(&new_match.competition_id)
    .bind(&new_match.team_home)
    .bind(&new_match.team_away)
    .bind(new_match.match_date)
    .bind(MatchStatus::Timed)
    .bind(multipliers)
    .execute(&mut *conn)
    .await?;
    debug!("🗃️ Match {id} inserted");
    Ok(id)
}

/// Moves a match to a new kickoff date. The match goes back on the board as `Timed`.
pub async fn update_match_date(
    id: MatchId,
    new_date: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query("UPDATE matches SET match_date = ?, status = ?, updated_at = CURRENT_TIMESTAMP WHERE match_id = ?")
        .bind(new_date)
        .bind(MatchStatus::Timed)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn update_match_result(
    id: MatchId,
    status: MatchStatus,
    home_goals: i64,
    away_goals: i64,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query(
        "UPDATE matches SET status = ?, home_goals = ?, away_goals = ?, updated_at = CURRENT_TIMESTAMP \
        WHERE match_id = ?",
    )
    .bind(status)
    .bind(home_goals)
    .bind(away_goals)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Flips a match to `Finished` and claims the settled marker in the same statement. The
/// `settled = 0` guard is what makes settlement run exactly once per match.
pub async fn mark_finished(
    id: MatchId,
    home_goals: i64,
    away_goals: i64,
    conn: &mut SqliteConnection,
) -> Result<FinishOutcome, SqliteDatabaseError> {
    let result = sqlx::query(
        "UPDATE matches SET status = ?, home_goals = ?, away_goals = ?, settled = 1, \
        updated_at = CURRENT_TIMESTAMP WHERE match_id = ? AND settled = 0",
    )
    .bind(MatchStatus::Finished)
    .bind(home_goals)
    .bind(away_goals)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 1 {
        let match_record = fetch_match(id, conn).await?.ok_or(SqliteDatabaseError::MatchNotFound(id))?;
        return Ok(FinishOutcome::Settled(match_record));
    }
    match fetch_match(id, conn).await? {
        Some(_) => Ok(FinishOutcome::AlreadySettled),
        None => Ok(FinishOutcome::NotFound),
    }
}

/// Fetches matches, optionally narrowed by competition and status, in insertion order.
pub async fn fetch_matches(
    competition_id: Option<&str>,
    status: Option<MatchStatus>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Match>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new("SELECT * FROM matches");
    if competition_id.is_some() || status.is_some() {
        builder.push(" WHERE ");
        let mut conditions = builder.separated(" AND ");
        if let Some(code) = competition_id {
            conditions.push("competition_id = ").push_bind_unseparated(code.to_string());
        }
        if let Some(status) = status {
            conditions.push("status = ").push_bind_unseparated(status);
        }
    }
    builder.push(" ORDER BY match_id ASC");
    let rows = builder.build().fetch_all(&mut *conn).await?;
    rows.iter().map(match_from_row).collect()
}

pub async fn delete_match(key: &MatchKey, conn: &mut SqliteConnection) -> Result<bool, SqliteDatabaseError> {
    let result = sqlx::query("DELETE FROM matches WHERE match_date = ? AND team_home = ? AND team_away = ?")
        .bind(key.match_date)
        .bind(&key.team_home)
        .bind(&key.team_away)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
