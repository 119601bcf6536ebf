use chrono::{DateTime, Utc};
use footdata_tools::FeedMatch;
use log::*;
use matchday_engine::db_types::{MatchStatus, MatchUpdate};

use crate::errors::UpdateConversionError;

/// Converts one feed record into the update the engine consumes.
///
/// The feed serves more statuses than the engine acts on. Anything outside the six lifecycle
/// statuses is a conversion error and the record is dropped. Goals are `null` until kickoff
/// and count as zero.
pub fn to_match_update(record: FeedMatch) -> Result<MatchUpdate, UpdateConversionError> {
    let status = record.status.parse::<MatchStatus>().map_err(|e| UpdateConversionError(e.to_string()))?;
    let match_date = record
        .utc_date
        .parse::<DateTime<Utc>>()
        .map_err(|e| UpdateConversionError(format!("Invalid kickoff date '{}'. {e}", record.utc_date)))?;
    let team_home = record.home_team.name.trim().to_string();
    let team_away = record.away_team.name.trim().to_string();
    if team_home.is_empty() || team_away.is_empty() {
        return Err(UpdateConversionError("A team name is missing".to_string()));
    }
    let competition_id = record.competition.code.trim().to_string();
    if competition_id.is_empty() {
        return Err(UpdateConversionError("The competition code is missing".to_string()));
    }
    let home_goals = record.score.full_time.home.unwrap_or_default();
    let away_goals = record.score.full_time.away.unwrap_or_default();
    if home_goals < 0 || away_goals < 0 {
        return Err(UpdateConversionError(format!("Nonsensical score {home_goals}-{away_goals}")));
    }
    Ok(MatchUpdate { status, competition_id, team_home, team_away, match_date, home_goals, away_goals })
}

/// Converts a feed page, dropping the records the engine could not act on.
pub fn convert_batch(records: Vec<FeedMatch>) -> Vec<MatchUpdate> {
    records
        .into_iter()
        .filter_map(|record| to_match_update(record).map_err(|e| warn!("⚽️ Dropping a malformed feed record. {e}")).ok())
        .collect()
}
