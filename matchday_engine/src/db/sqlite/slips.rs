//! Query functions for the `slips` and `bets` tables. Confirmed slips live here; unconfirmed
//! slips stay in the cache and never touch these tables.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use log::debug;
use mbg_common::{Money, Odds};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use super::SqliteDatabaseError;
use crate::{
    db::traits::SettlementReport,
    db_types::{Bet, Match, MatchId, Outcome, Slip, SlipId},
    helpers::multiplier_hits,
};

fn bet_from_row(row: &SqliteRow) -> Result<Bet, SqliteDatabaseError> {
    Ok(Bet {
        match_id: row.try_get("match_id")?,
        match_date: row.try_get("match_date")?,
        competition_id: row.try_get("competition_id")?,
        team_home: row.try_get("team_home")?,
        team_away: row.try_get("team_away")?,
        multiplier_name: row.try_get("multiplier_name")?,
        multiplier_value: row.try_get("multiplier_value")?,
        outcome: row.try_get("outcome")?,
    })
}

/// Writes a confirmed slip and its legs. The betting surface calls this when a punter confirms
/// a slip out of the cache.
pub async fn insert_confirmed_slip(slip: &Slip, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    sqlx::query(
        "INSERT INTO slips (slip_id, username, stake, payout, outcome, created_at, confirmed_at) \
        VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(slip.slip_id)
    .bind(&slip.username)
    .bind(slip.stake)
    .bind(slip.payout)
    .bind(slip.outcome)
    .bind(slip.created_at)
    .bind(slip.confirmed_at)
    .execute(&mut *conn)
    .await?;
    for bet in &slip.bets {
        sqlx::query(
            "INSERT INTO bets (slip_id, match_id, match_date, competition_id, team_home, team_away, \
            multiplier_name, multiplier_value, outcome) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(slip.slip_id)
        .bind(bet.match_id)
        .bind(bet.match_date)
        .bind(&bet.competition_id)
        .bind(&bet.team_home)
        .bind(&bet.team_away)
        .bind(&bet.multiplier_name)
        .bind(bet.multiplier_value)
        .bind(bet.outcome)
        .execute(&mut *conn)
        .await?;
    }
    debug!("🧾 Slip {} of {} confirmed with {} legs", slip.slip_id, slip.username, slip.bets.len());
    Ok(())
}

pub async fn fetch_slip(slip_id: SlipId, conn: &mut SqliteConnection) -> Result<Option<Slip>, SqliteDatabaseError> {
    let row = sqlx::query("SELECT * FROM slips WHERE slip_id = ?").bind(slip_id).fetch_optional(&mut *conn).await?;
    let row = match row {
        Some(row) => row,
        None => return Ok(None),
    };
    let bets = fetch_bets_for_slip(slip_id, conn).await?;
    Ok(Some(Slip {
        slip_id: row.try_get("slip_id")?,
        username: row.try_get("username")?,
        stake: row.try_get("stake")?,
        payout: row.try_get("payout")?,
        outcome: row.try_get("outcome")?,
        created_at: row.try_get("created_at")?,
        confirmed_at: row.try_get("confirmed_at")?,
        bets,
    }))
}

pub async fn fetch_bets_for_slip(slip_id: SlipId, conn: &mut SqliteConnection) -> Result<Vec<Bet>, SqliteDatabaseError> {
    let rows =
        sqlx::query("SELECT * FROM bets WHERE slip_id = ? ORDER BY id ASC").bind(slip_id).fetch_all(&mut *conn).await?;
    rows.iter().map(bet_from_row).collect()
}

/// Resolves every open bet riding on the match against its final score, then closes each
/// affected slip that has no open legs left. A slip with a lost leg loses outright. A slip
/// whose legs have all won pays the stake folded through the odds of every leg.
pub async fn settle_match(
    match_record: &Match,
    conn: &mut SqliteConnection,
) -> Result<SettlementReport, SqliteDatabaseError> {
    let mut report = SettlementReport::default();
    let open_bets = sqlx::query("SELECT id, slip_id, multiplier_name FROM bets WHERE match_id = ? AND outcome = ?")
        .bind(match_record.id)
        .bind(Outcome::Unresolved)
        .fetch_all(&mut *conn)
        .await?;
    let mut touched = BTreeSet::new();
    for row in open_bets {
        let bet_id: i64 = row.try_get("id")?;
        let slip_id: SlipId = row.try_get("slip_id")?;
        let market: String = row.try_get("multiplier_name")?;
        let outcome = if multiplier_hits(&market, match_record.home_goals, match_record.away_goals) {
            Outcome::Won
        } else {
            Outcome::Lost
        };
        sqlx::query("UPDATE bets SET outcome = ? WHERE id = ?")
            .bind(outcome)
            .bind(bet_id)
            .execute(&mut *conn)
            .await?;
        report.bets_settled += 1;
        touched.insert(slip_id);
    }
    for slip_id in touched {
        let open: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bets WHERE slip_id = ? AND outcome = ?")
            .bind(slip_id)
            .bind(Outcome::Unresolved)
            .fetch_one(&mut *conn)
            .await?;
        if open > 0 {
            continue;
        }
        let lost: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bets WHERE slip_id = ? AND outcome = ?")
            .bind(slip_id)
            .bind(Outcome::Lost)
            .fetch_one(&mut *conn)
            .await?;
        if lost > 0 {
            sqlx::query("UPDATE slips SET outcome = ?, payout = 0 WHERE slip_id = ?")
                .bind(Outcome::Lost)
                .bind(slip_id)
                .execute(&mut *conn)
                .await?;
            report.slips_lost += 1;
            debug!("🧾 Slip {slip_id} lost");
        } else {
            let stake: Money = sqlx::query_scalar("SELECT stake FROM slips WHERE slip_id = ?")
                .bind(slip_id)
                .fetch_one(&mut *conn)
                .await?;
            let legs: Vec<Odds> = sqlx::query_scalar("SELECT multiplier_value FROM bets WHERE slip_id = ? ORDER BY id")
                .bind(slip_id)
                .fetch_all(&mut *conn)
                .await?;
            let payout = legs.into_iter().fold(stake, |acc, odds| acc * odds);
            sqlx::query("UPDATE slips SET outcome = ?, payout = ? WHERE slip_id = ?")
                .bind(Outcome::Won)
                .bind(payout)
                .bind(slip_id)
                .execute(&mut *conn)
                .await?;
            report.slips_won += 1;
            debug!("🧾 Slip {slip_id} won. Payout: {payout}");
        }
    }
    Ok(report)
}

/// Drops every bet riding on the match, then sweeps away open slips left with no legs.
pub async fn remove_bets_for_match(id: MatchId, conn: &mut SqliteConnection) -> Result<u64, SqliteDatabaseError> {
    let removed = sqlx::query("DELETE FROM bets WHERE match_id = ?").bind(id).execute(&mut *conn).await?.rows_affected();
    if removed == 0 {
        return Ok(0);
    }
    let swept = sqlx::query(
        "DELETE FROM slips WHERE outcome = ? AND NOT EXISTS \
        (SELECT 1 FROM bets WHERE bets.slip_id = slips.slip_id)",
    )
    .bind(Outcome::Unresolved)
    .execute(&mut *conn)
    .await?
    .rows_affected();
    if swept > 0 {
        debug!("🧾 {swept} slips were left without legs and have been removed");
    }
    Ok(removed)
}

pub async fn reschedule_bets_for_match(
    id: MatchId,
    new_date: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<u64, SqliteDatabaseError> {
    let result = sqlx::query("UPDATE bets SET match_date = ? WHERE match_id = ?")
        .bind(new_date)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
