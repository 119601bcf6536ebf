use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::Match;

/// Fired after a match has been flipped to `Finished` and its bets settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFinishedEvent {
    pub result: Match,
}

impl MatchFinishedEvent {
    pub fn new(result: Match) -> Self {
        Self { result }
    }
}

/// Fired after a canceled match and every bet riding on it have been removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRemovedEvent {
    pub removed: Match,
}

impl MatchRemovedEvent {
    pub fn new(removed: Match) -> Self {
        Self { removed }
    }
}

/// Fired after a postponed match has been moved to a new kickoff date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRescheduledEvent {
    pub rescheduled: Match,
    pub previous_date: DateTime<Utc>,
}

impl MatchRescheduledEvent {
    pub fn new(rescheduled: Match, previous_date: DateTime<Utc>) -> Self {
        Self { rescheduled, previous_date }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    MatchFinished(MatchFinishedEvent),
    MatchRemoved(MatchRemovedEvent),
    MatchRescheduled(MatchRescheduledEvent),
}
