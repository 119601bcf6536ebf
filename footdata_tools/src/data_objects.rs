use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One page of the `/matches` endpoint. Fields the synchronizer does not
/// consume (paging cursors, areas, referees) are not modelled.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MatchDay {
    pub matches: Vec<FeedMatch>,
}

/// A match record as the feed serves it. `utc_date` stays a raw string here;
/// parsing happens when the record is converted for the engine, so that one
/// bad date drops one record instead of failing the whole page.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedMatch {
    pub status: String,
    pub utc_date: String,
    pub competition: FeedCompetition,
    pub home_team: FeedTeam,
    pub away_team: FeedTeam,
    #[serde(default)]
    pub score: FeedScore,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeedCompetition {
    pub code: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeedTeam {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedScore {
    #[serde(default)]
    pub full_time: FeedGoals,
}

/// Goal counts are null until the match kicks off.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeedGoals {
    pub home: Option<i64>,
    pub away: Option<i64>,
}

#[cfg(test)]
mod test {
    use super::*;

    const MATCHES_PAGE: &str = r#"{
      "filters": { "dateFrom": "2026-08-21", "dateTo": "2026-08-23" },
      "resultSet": { "count": 2 },
      "matches": [
        {
          "id": 497014,
          "utcDate": "2026-08-22T18:45:00Z",
          "status": "TIMED",
          "lastUpdated": "2026-08-21T16:20:04Z",
          "competition": { "id": 2019, "name": "Serie A", "code": "IT1" },
          "homeTeam": { "id": 109, "name": "Juventus" },
          "awayTeam": { "id": 113, "name": "Napoli" },
          "score": { "winner": null, "fullTime": { "home": null, "away": null } }
        },
        {
          "utcDate": "2026-08-21T19:00:00Z",
          "status": "IN_PLAY",
          "competition": { "code": "GB1", "name": "Premier League" },
          "homeTeam": { "name": "Arsenal" },
          "awayTeam": { "name": "Chelsea" },
          "score": { "fullTime": { "home": 1, "away": 0 } }
        }
      ]
    }"#;

    #[test]
    fn deserializes_a_matches_page() {
        let page = serde_json::from_str::<MatchDay>(MATCHES_PAGE).expect("page should deserialize");
        assert_eq!(page.matches.len(), 2);
        let first = &page.matches[0];
        assert_eq!(first.status, "TIMED");
        assert_eq!(first.utc_date, "2026-08-22T18:45:00Z");
        assert_eq!(first.competition.code, "IT1");
        assert_eq!(first.home_team.name, "Juventus");
        assert_eq!(first.score.full_time.home, None);
        assert!(first.last_updated.is_some());
        let second = &page.matches[1];
        assert_eq!(second.status, "IN_PLAY");
        assert_eq!(second.score.full_time.home, Some(1));
        assert_eq!(second.last_updated, None);
    }
}
