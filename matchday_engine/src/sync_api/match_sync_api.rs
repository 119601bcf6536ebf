use std::fmt::{Debug, Display, Formatter};

use log::*;
use rand::thread_rng;

use crate::{
    db::traits::{BetSettlement, FinishOutcome, InsertMatchResult, MatchStore, SlipCache},
    db_types::{Match, MatchId, MatchStatus, MatchUpdate, NewMatch},
    events::{EventProducers, MatchFinishedEvent, MatchRemovedEvent, MatchRescheduledEvent},
    helpers::spread_multipliers,
    sync_api::{errors::MatchSyncError, reconciler::reconcile_slips, resolver::nearest_timed_match},
};

/// Tallies for one batch of feed updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Updates that changed the store, the cache or the ledger.
    pub applied: usize,
    /// Updates that were understood but required no work.
    pub skipped: usize,
    /// Updates that errored. Each error has been logged and the batch carried on.
    pub failed: usize,
}

impl SyncReport {
    pub fn total(&self) -> usize {
        self.applied + self.skipped + self.failed
    }

    fn tally(&mut self, outcome: &UpdateOutcome) {
        if outcome.changed_anything() {
            self.applied += 1;
        } else {
            self.skipped += 1;
        }
    }
}

impl Display for SyncReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} updates applied, {} skipped, {} failed.", self.applied, self.skipped, self.failed)
    }
}

/// What a single feed update amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A new scheduled match was stored.
    Inserted(MatchId),
    /// The scheduled match is already in the store.
    AlreadyKnown(MatchId),
    /// The update failed validation and was dropped.
    Rejected(String),
    /// The match and every bet riding on it were removed.
    Cancelled(MatchId),
    /// A cancellation of a match the store never had. Cached slips were still pruned.
    CancelledUnknown,
    /// The match was moved to a new kickoff date.
    Rescheduled(MatchId),
    /// A postponement with no `Timed` match to carry it.
    NoTimedCandidate,
    /// The match was finished and its bets settled.
    Finished(MatchId),
    /// A replayed result for a match that has already been settled.
    AlreadySettled(MatchId),
    /// A live status and score change was applied.
    Progressed(MatchId),
    /// An update that does not map to any stored match.
    UnknownMatch,
}

impl UpdateOutcome {
    fn changed_anything(&self) -> bool {
        matches!(
            self,
            Self::Inserted(_)
                | Self::Cancelled(_)
                | Self::CancelledUnknown
                | Self::Rescheduled(_)
                | Self::Finished(_)
                | Self::Progressed(_)
        )
    }
}

impl Display for UpdateOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inserted(id) => write!(f, "stored as match {id}"),
            Self::AlreadyKnown(id) => write!(f, "already stored as match {id}"),
            Self::Rejected(reason) => write!(f, "rejected: {reason}"),
            Self::Cancelled(id) => write!(f, "match {id} canceled and removed"),
            Self::CancelledUnknown => write!(f, "cancellation of an unknown match, slips pruned"),
            Self::Rescheduled(id) => write!(f, "match {id} moved to a new kickoff"),
            Self::NoTimedCandidate => write!(f, "no timed match available to carry the postponement"),
            Self::Finished(id) => write!(f, "match {id} finished and settled"),
            Self::AlreadySettled(id) => write!(f, "match {id} was already settled"),
            Self::Progressed(id) => write!(f, "match {id} status and scores updated"),
            Self::UnknownMatch => write!(f, "no stored match for this update"),
        }
    }
}

/// The synchronization API.
///
/// One `MatchSyncApi` owns the full lifecycle of every match the feed reports: scheduling,
/// kickoff, live score changes, postponement, cancellation and the final whistle. It is
/// generic over the canonical store `B`, the slip cache `C` and the settlement ledger `S`, so
/// a deployment can point all three at the same backend or at three different ones.
pub struct MatchSyncApi<B, C, S> {
    store: B,
    cache: C,
    settlement: S,
    producers: EventProducers,
}

impl<B: Debug, C, S> Debug for MatchSyncApi<B, C, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MatchSyncApi over {:?}", self.store)
    }
}

impl<B, C, S> MatchSyncApi<B, C, S> {
    pub fn new(store: B, cache: C, settlement: S, producers: EventProducers) -> Self {
        Self { store, cache, settlement, producers }
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut B {
        &mut self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn settlement(&self) -> &S {
        &self.settlement
    }
}

impl<B, C, S> MatchSyncApi<B, C, S>
where
    B: MatchStore,
    C: SlipCache,
    S: BetSettlement,
{
    /// Applies a batch of feed updates in order. A failing update is logged and the batch
    /// carries on, so one poisoned record never blocks the rest of the feed page.
    pub async fn process_updates(&self, updates: Vec<MatchUpdate>) -> SyncReport {
        let mut report = SyncReport::default();
        info!("🔄️ Processing a batch of {} match updates", updates.len());
        for update in updates {
            match self.process_update(&update).await {
                Ok(outcome) => {
                    debug!("🔄️ {update}: {outcome}");
                    report.tally(&outcome);
                },
                Err(e) => {
                    error!("🔄️ {update} could not be applied: {e}. Continuing with the next update.");
                    report.failed += 1;
                },
            }
        }
        info!("🔄️ Batch complete. {report}");
        report
    }

    /// Applies a single feed update. The status on the update decides the lifecycle flow.
    pub async fn process_update(&self, update: &MatchUpdate) -> Result<UpdateOutcome, MatchSyncError> {
        match update.status {
            MatchStatus::Timed => self.handle_timed(update).await,
            MatchStatus::Canceled => self.handle_canceled(update).await,
            MatchStatus::Postponed => self.handle_postponed(update).await,
            MatchStatus::Finished => self.handle_finished(update).await,
            MatchStatus::InPlay | MatchStatus::Paused => self.handle_in_progress(update).await,
        }
    }

    /// `Timed`: store the fixture if it is new. Scores on the update are ignored; scheduled
    /// matches always enter goalless, with a freshly priced book.
    async fn handle_timed(&self, update: &MatchUpdate) -> Result<UpdateOutcome, MatchSyncError> {
        if let Some(id) = self.store.find_match_id(&update.key()).await.map_err(MatchSyncError::store)? {
            return Ok(UpdateOutcome::AlreadyKnown(id));
        }
        let multipliers = spread_multipliers(&mut thread_rng());
        let new_match = NewMatch::from_update(update, multipliers);
        match self.store.insert_match(new_match).await.map_err(MatchSyncError::store)? {
            InsertMatchResult::Inserted(id) => {
                info!("🔄️ New match {id}: {} v {} ({})", update.team_home, update.team_away, update.competition_id);
                Ok(UpdateOutcome::Inserted(id))
            },
            InsertMatchResult::AlreadyExists(id) => Ok(UpdateOutcome::AlreadyKnown(id)),
            InsertMatchResult::Rejected(reason) => {
                warn!("🔄️🚨️ Dropping invalid match data for {} v {}: {reason}", update.team_home, update.team_away);
                Ok(UpdateOutcome::Rejected(reason))
            },
        }
    }

    /// `Canceled`: prune cached slips first, then drop the match and every confirmed bet
    /// riding on it.
    async fn handle_canceled(&self, update: &MatchUpdate) -> Result<UpdateOutcome, MatchSyncError> {
        let pruned =
            reconcile_slips(&self.cache, &update.team_home, &update.team_away).await.map_err(MatchSyncError::cache)?;
        if pruned.total() > 0 {
            info!("🔄️ Cancellation of {} v {}: {pruned}", update.team_home, update.team_away);
        }
        let id = match self.store.find_match_id(&update.key()).await.map_err(MatchSyncError::store)? {
            Some(id) => id,
            None => return Ok(UpdateOutcome::CancelledUnknown),
        };
        let removed = self.store.fetch_match(id).await.map_err(MatchSyncError::store)?;
        let bets = self.settlement.remove_all_bets_for_match(id).await.map_err(MatchSyncError::settlement)?;
        self.store.delete_match(&update.key()).await.map_err(MatchSyncError::store)?;
        info!("🔄️ Match {id} canceled. {bets} confirmed bets removed.");
        if let Some(removed) = removed {
            self.call_match_removed_hook(&removed).await;
        }
        Ok(UpdateOutcome::Cancelled(id))
    }

    /// `Postponed`: the feed reports these under the fixture's new date, so the stored record
    /// can never be found by key. Move the nearest `Timed` match in the same competition to
    /// the reported date instead, then prune cached slips for the fixture.
    async fn handle_postponed(&self, update: &MatchUpdate) -> Result<UpdateOutcome, MatchSyncError> {
        let candidates = self
            .store
            .timed_matches_for_competition(&update.competition_id)
            .await
            .map_err(MatchSyncError::store)?;
        let target = match nearest_timed_match(update.match_date, &candidates) {
            Some(index) => &candidates[index],
            None => {
                info!(
                    "🔄️ No timed match in {} can carry the postponement of {} v {}. Leaving it to a later run.",
                    update.competition_id, update.team_home, update.team_away
                );
                return Ok(UpdateOutcome::NoTimedCandidate);
            },
        };
        let previous_date = target.match_date;
        self.store.update_match_date(target.id, update.match_date).await.map_err(MatchSyncError::store)?;
        let rescheduled = self
            .settlement
            .reschedule_bets_for_match(target.id, update.match_date)
            .await
            .map_err(MatchSyncError::settlement)?;
        let pruned =
            reconcile_slips(&self.cache, &update.team_home, &update.team_away).await.map_err(MatchSyncError::cache)?;
        info!(
            "🔄️ Match {} moved from {previous_date} to {}. {rescheduled} confirmed bets rescheduled. {pruned}",
            target.id, update.match_date
        );
        if let Some(moved) = self.store.fetch_match(target.id).await.map_err(MatchSyncError::store)? {
            self.call_match_rescheduled_hook(&moved, previous_date).await;
        }
        Ok(UpdateOutcome::Rescheduled(target.id))
    }

    /// `Finished`: write the final score and settle, exactly once. Replays of the final
    /// whistle are absorbed by the settled marker.
    async fn handle_finished(&self, update: &MatchUpdate) -> Result<UpdateOutcome, MatchSyncError> {
        let id = match self.store.find_match_id(&update.key()).await.map_err(MatchSyncError::store)? {
            Some(id) => id,
            None => {
                debug!("🔄️ Result for {} v {} does not map to a stored match", update.team_home, update.team_away);
                return Ok(UpdateOutcome::UnknownMatch);
            },
        };
        match self.store.mark_finished(id, update.home_goals, update.away_goals).await.map_err(MatchSyncError::store)? {
            FinishOutcome::Settled(final_record) => {
                let report = self.settlement.settle_bets_for_match(id).await.map_err(MatchSyncError::settlement)?;
                info!("🔄️ Match {id} finished {}-{}. {report}", final_record.home_goals, final_record.away_goals);
                self.call_match_finished_hook(&final_record).await;
                Ok(UpdateOutcome::Finished(id))
            },
            FinishOutcome::AlreadySettled => {
                debug!("🔄️ Match {id} has already been settled. Ignoring the replayed result.");
                Ok(UpdateOutcome::AlreadySettled(id))
            },
            FinishOutcome::NotFound => Ok(UpdateOutcome::UnknownMatch),
        }
    }

    /// `InPlay` and `Paused`: patch status and scores. The first transition out of `Timed`
    /// takes the fixture off the board, so cached slips are pruned once, at kickoff.
    async fn handle_in_progress(&self, update: &MatchUpdate) -> Result<UpdateOutcome, MatchSyncError> {
        let current = match self.store.fetch_match_by_key(&update.key()).await.map_err(MatchSyncError::store)? {
            Some(current) => current,
            None => {
                debug!(
                    "🔄️ Live update for {} v {} does not map to a stored match",
                    update.team_home, update.team_away
                );
                return Ok(UpdateOutcome::UnknownMatch);
            },
        };
        if current.status == MatchStatus::Timed {
            let pruned = reconcile_slips(&self.cache, &update.team_home, &update.team_away)
                .await
                .map_err(MatchSyncError::cache)?;
            debug!("🔄️ {} v {} kicked off. {pruned}", update.team_home, update.team_away);
        }
        self.store
            .update_match_result(current.id, update.status, update.home_goals, update.away_goals)
            .await
            .map_err(MatchSyncError::store)?;
        Ok(UpdateOutcome::Progressed(current.id))
    }

    async fn call_match_finished_hook(&self, result: &Match) {
        for emitter in &self.producers.match_finished_producer {
            debug!("🔄️📬️ Notifying match finished hook subscribers");
            let event = MatchFinishedEvent::new(result.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_match_removed_hook(&self, removed: &Match) {
        for emitter in &self.producers.match_removed_producer {
            debug!("🔄️📬️ Notifying match removed hook subscribers");
            let event = MatchRemovedEvent::new(removed.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_match_rescheduled_hook(&self, moved: &Match, previous_date: chrono::DateTime<chrono::Utc>) {
        for emitter in &self.producers.match_rescheduled_producer {
            debug!("🔄️📬️ Notifying match rescheduled hook subscribers");
            let event = MatchRescheduledEvent::new(moved.clone(), previous_date);
            emitter.publish_event(event).await;
        }
    }
}
