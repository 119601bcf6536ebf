use chrono::Duration;
use footdata_tools::{FeedMatch, FootDataApi, FootDataApiError};
use log::*;
use matchday_engine::{MatchSyncApi, MemorySlipCache, SqliteDatabase};
use tokio::task::JoinHandle;

use crate::feed_update::convert_batch;

/// The engine wiring the daemon runs: a durable SQLite match store and settlement ledger, with
/// the in-memory cache for slips that are still being composed.
pub type SyncApi = MatchSyncApi<SqliteDatabase, MemorySlipCache, SqliteDatabase>;

/// Starts the feed polling worker. Do not await the returned JoinHandle, as it will run indefinitely.
pub fn start_sync_worker(
    api: SyncApi,
    feed: FootDataApi,
    poll_interval: Duration,
    competitions: Vec<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = std::time::Duration::from_secs(poll_interval.num_seconds().max(1) as u64);
        let mut timer = tokio::time::interval(period);
        info!("🕰️ Match synchronization worker started. Polling every {} s.", period.as_secs());
        loop {
            timer.tick().await;
            debug!("🕰️ Polling the feed for match updates");
            match fetch_feed(&feed, &competitions).await {
                Ok(records) => {
                    let updates = convert_batch(records);
                    let report = api.process_updates(updates).await;
                    info!("🕰️ Synchronization run complete. {report}");
                },
                Err(e) => {
                    error!("🕰️ Could not fetch the match feed: {e}. Skipping this run.");
                },
            }
        }
    })
}

async fn fetch_feed(feed: &FootDataApi, competitions: &[String]) -> Result<Vec<FeedMatch>, FootDataApiError> {
    if competitions.is_empty() {
        return feed.fetch_matches().await;
    }
    let mut result = Vec::new();
    for code in competitions {
        let matches = feed.fetch_competition_matches(code).await?;
        result.extend(matches);
    }
    Ok(result)
}
