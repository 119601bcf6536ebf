use footdata_tools::FootDataApi;
use futures::FutureExt;
use log::*;
use matchday_engine::{
    events::{EventHandlers, EventHooks, MatchFinishedEvent, MatchRemovedEvent, MatchRescheduledEvent},
    MatchSyncApi,
    MemorySlipCache,
    SqliteDatabase,
};

use crate::{config::SyncConfig, errors::SyncServerError, worker::start_sync_worker};

const EVENT_BUFFER_SIZE: usize = 100;

/// Brings up the match store, the event handlers and the polling worker, then waits for ctrl-c.
pub async fn run_daemon(config: SyncConfig) -> Result<(), SyncServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 16)
        .await
        .map_err(|e| SyncServerError::InitializeError(e.to_string()))?;
    if config.migrate_on_start {
        db.run_migrations().await.map_err(|e| SyncServerError::InitializeError(e.to_string()))?;
    }
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, logging_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let api = MatchSyncApi::new(db.clone(), MemorySlipCache::new(), db, producers);
    let feed = FootDataApi::new(config.feed.clone()).map_err(|e| SyncServerError::InitializeError(e.to_string()))?;
    let worker = start_sync_worker(api, feed, config.poll_interval, config.competitions.clone());
    tokio::signal::ctrl_c().await?;
    info!("🕰️ Shutdown signal received. Stopping the synchronization worker.");
    worker.abort();
    Ok(())
}

/// Lifecycle hooks that write each event to the log.
fn logging_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_match_finished(|ev: MatchFinishedEvent| {
        let result = ev.result;
        info!("🪝️ {} v {} finished {}-{}", result.team_home, result.team_away, result.home_goals, result.away_goals);
        async {}.boxed()
    });
    hooks.on_match_removed(|ev: MatchRemovedEvent| {
        info!("🪝️ {} v {} was canceled and removed", ev.removed.team_home, ev.removed.team_away);
        async {}.boxed()
    });
    hooks.on_match_rescheduled(|ev: MatchRescheduledEvent| {
        let moved = ev.rescheduled;
        info!("🪝️ {} v {} moved from {} to {}", moved.team_home, moved.team_away, ev.previous_date, moved.match_date);
        async {}.boxed()
    });
    hooks
}
