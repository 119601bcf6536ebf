//! Domain types shared by the match store, the slip cache and the synchronization API.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::{DateTime, Utc};
use mbg_common::{Money, Odds};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

/// A dense, monotonically increasing match identifier. The first match ever stored is id 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct MatchId(pub i64);

impl MatchId {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<i64> for MatchId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for MatchId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct SlipId(pub i64);

impl SlipId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for SlipId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for SlipId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The lifecycle state of a match, using the feed's own vocabulary.
///
/// `Timed` is the only state in which a match accepts new bets. The remaining states are
/// terminal (`Finished`, `Canceled`) or transitional (`InPlay`, `Paused`, `Postponed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Timed,
    InPlay,
    Paused,
    Finished,
    Postponed,
    Canceled,
}

impl Display for MatchStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Timed => "TIMED",
            Self::InPlay => "IN_PLAY",
            Self::Paused => "PAUSED",
            Self::Finished => "FINISHED",
            Self::Postponed => "POSTPONED",
            Self::Canceled => "CANCELED",
        };
        write!(f, "{s}")
    }
}

impl FromStr for MatchStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "TIMED" => Ok(Self::Timed),
            "IN_PLAY" => Ok(Self::InPlay),
            "PAUSED" => Ok(Self::Paused),
            "FINISHED" => Ok(Self::Finished),
            "POSTPONED" => Ok(Self::Postponed),
            "CANCELED" => Ok(Self::Canceled),
            other => Err(StatusConversionError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Unsupported match status: {0}")]
pub struct StatusConversionError(pub String);

/// The result of a bet or a slip. Bets start out `Unresolved` and flip exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Outcome {
    #[default]
    Unresolved,
    Lost,
    Won,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unresolved => "UNRESOLVED",
            Self::Lost => "LOST",
            Self::Won => "WON",
        };
        write!(f, "{s}")
    }
}

/// The natural identity of a fixture. Two feed records describe the same match exactly when
/// kickoff date, home team and away team all agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchKey {
    pub match_date: DateTime<Utc>,
    pub team_home: String,
    pub team_away: String,
}

impl MatchKey {
    pub fn new<S: Into<String>>(match_date: DateTime<Utc>, team_home: S, team_away: S) -> Self {
        Self { match_date, team_home: team_home.into(), team_away: team_away.into() }
    }
}

impl Display for MatchKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v {} at {}", self.team_home, self.team_away, self.match_date)
    }
}

/// A named betting market and its odds, priced once when the match is first stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multiplier {
    pub name: String,
    pub value: Odds,
}

impl Multiplier {
    pub fn new<S: Into<String>>(name: S, value: Odds) -> Self {
        Self { name: name.into(), value }
    }
}

impl Display for Multiplier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}", self.name, self.value)
    }
}

/// A match as stored in the canonical match store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub competition_id: String,
    pub team_home: String,
    pub team_away: String,
    pub match_date: DateTime<Utc>,
    pub status: MatchStatus,
    pub home_goals: i64,
    pub away_goals: i64,
    /// Set together with the `Finished` status flip. Guards settlement against replays.
    pub settled: bool,
    pub multipliers: Vec<Multiplier>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    pub fn key(&self) -> MatchKey {
        MatchKey::new(self.match_date, self.team_home.as_str(), self.team_away.as_str())
    }

    pub fn multiplier(&self, name: &str) -> Option<&Multiplier> {
        self.multipliers.iter().find(|m| m.name == name)
    }
}

impl Display for Match {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Match {}: {} v {} ({}) on {}, {}",
            self.id, self.team_home, self.team_away, self.competition_id, self.match_date, self.status
        )
    }
}

/// A single feed record after conversion. `status` decides which lifecycle handler runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchUpdate {
    pub status: MatchStatus,
    pub competition_id: String,
    pub team_home: String,
    pub team_away: String,
    pub match_date: DateTime<Utc>,
    pub home_goals: i64,
    pub away_goals: i64,
}

impl MatchUpdate {
    pub fn key(&self) -> MatchKey {
        MatchKey::new(self.match_date, self.team_home.as_str(), self.team_away.as_str())
    }
}

impl Display for MatchUpdate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} v {} ({}) at {}",
            self.status, self.team_home, self.team_away, self.competition_id, self.match_date
        )
    }
}

/// A match about to be inserted. New matches always enter as `Timed` and goalless, so the
/// struct carries neither field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMatch {
    pub competition_id: String,
    pub team_home: String,
    pub team_away: String,
    pub match_date: DateTime<Utc>,
    pub multipliers: Vec<Multiplier>,
}

impl NewMatch {
    pub fn from_update(update: &MatchUpdate, multipliers: Vec<Multiplier>) -> Self {
        Self {
            competition_id: update.competition_id.clone(),
            team_home: update.team_home.trim().to_string(),
            team_away: update.team_away.trim().to_string(),
            match_date: update.match_date,
            multipliers,
        }
    }

    pub fn key(&self) -> MatchKey {
        MatchKey::new(self.match_date, self.team_home.as_str(), self.team_away.as_str())
    }

    pub fn check_validity(&self) -> Result<(), MatchValidationError> {
        if self.team_home.trim().is_empty() || self.team_away.trim().is_empty() {
            return Err(MatchValidationError("A team name is missing".to_string()));
        }
        if self.team_home.trim() == self.team_away.trim() {
            return Err(MatchValidationError(format!("{} cannot play itself", self.team_home)));
        }
        if self.competition_id.trim().is_empty() {
            return Err(MatchValidationError("The competition code is missing".to_string()));
        }
        if self.multipliers.is_empty() {
            return Err(MatchValidationError("The match has no priced markets".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid match data. {0}.")]
pub struct MatchValidationError(pub String);

/// One leg of a slip. Everything needed to settle or reconcile the leg is denormalized onto
/// the bet, so those jobs never chase the match record for odds or team names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub match_id: MatchId,
    pub match_date: DateTime<Utc>,
    pub competition_id: String,
    pub team_home: String,
    pub team_away: String,
    pub multiplier_name: String,
    pub multiplier_value: Odds,
    pub outcome: Outcome,
}

impl Bet {
    pub fn new(match_record: &Match, multiplier: &Multiplier) -> Self {
        Self {
            match_id: match_record.id,
            match_date: match_record.match_date,
            competition_id: match_record.competition_id.clone(),
            team_home: match_record.team_home.clone(),
            team_away: match_record.team_away.clone(),
            multiplier_name: multiplier.name.clone(),
            multiplier_value: multiplier.value,
            outcome: Outcome::Unresolved,
        }
    }

    /// True if this bet is riding on the given fixture.
    pub fn on_fixture(&self, team_home: &str, team_away: &str) -> bool {
        self.team_home == team_home && self.team_away == team_away
    }
}

impl Display for Bet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} @ {} on {} v {}",
            self.multiplier_name, self.multiplier_value, self.team_home, self.team_away
        )
    }
}

/// A punter's betting slip. A slip always carries at least one bet. The payout is zero until
/// every leg has resolved and they have all won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slip {
    pub slip_id: SlipId,
    pub username: String,
    pub stake: Money,
    pub payout: Money,
    pub outcome: Outcome,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub bets: Vec<Bet>,
}

impl Slip {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }

    /// The stake folded through the odds of every leg. What the punter collects if all legs win.
    pub fn potential_payout(&self) -> Money {
        self.bets.iter().fold(self.stake, |acc, bet| acc * bet.multiplier_value)
    }
}

impl Display for Slip {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Slip {} of {}: {} on {} bets, {}",
            self.slip_id,
            self.username,
            self.stake,
            self.bets.len(),
            self.outcome
        )
    }
}

/// A slip as submitted by a punter, before the cache has assigned it an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSlip {
    pub username: String,
    pub stake: Money,
    pub bets: Vec<Bet>,
}

impl NewSlip {
    pub fn new<S: Into<String>>(username: S, stake: Money, bets: Vec<Bet>) -> Self {
        Self { username: username.into(), stake, bets }
    }
}
