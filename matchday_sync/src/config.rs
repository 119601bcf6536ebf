use std::env;

use chrono::Duration;
use footdata_tools::FootDataConfig;
use log::*;
use mbg_common::parse_boolean_flag;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/matchday.db";
const DEFAULT_POLL_INTERVAL: Duration = Duration::seconds(60);

#[derive(Clone, Debug)]
pub struct SyncConfig {
    pub database_url: String,
    /// How often the feed is polled for the current matchday.
    pub poll_interval: Duration,
    /// Competition codes to poll one by one. When empty, the whole feed is pulled in a single call.
    pub competitions: Vec<String>,
    /// If true, pending store migrations are applied on startup.
    pub migrate_on_start: bool,
    /// Credentials and endpoint for the football-data feed.
    pub feed: FootDataConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            competitions: Vec::new(),
            migrate_on_start: true,
            feed: FootDataConfig::default(),
        }
    }
}

impl SyncConfig {
    pub fn from_env_or_default() -> Self {
        let database_url = env::var("MDS_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ MDS_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}, instead.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let poll_interval = env::var("MDS_POLL_INTERVAL_SECS")
            .map_err(|_| {
                info!(
                    "🪛️ MDS_POLL_INTERVAL_SECS is not set. Using the default value of {} s.",
                    DEFAULT_POLL_INTERVAL.num_seconds()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::seconds)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for MDS_POLL_INTERVAL_SECS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        let competitions = configure_competitions();
        let migrate_on_start = parse_boolean_flag(env::var("MDS_MIGRATE_ON_START").ok(), true);
        let feed = FootDataConfig::new_from_env_or_default();
        Self { database_url, poll_interval, competitions, migrate_on_start, feed }
    }
}

fn configure_competitions() -> Vec<String> {
    let raw = match env::var("MDS_COMPETITIONS") {
        Ok(raw) => raw,
        Err(_) => {
            info!("🪛️ MDS_COMPETITIONS is not set. The daemon polls the entire feed in a single call.");
            return Vec::new();
        },
    };
    let codes = raw
        .split(',')
        .filter_map(|s| {
            let code = s.trim();
            if code.is_empty() {
                warn!("🪛️ Ignoring an empty competition code in MDS_COMPETITIONS.");
                None
            } else {
                Some(code.to_string())
            }
        })
        .collect::<Vec<String>>();
    if codes.is_empty() {
        warn!("🚨️ MDS_COMPETITIONS did not contain any usable competition codes. Polling the entire feed instead.");
    } else {
        info!("🪛️ Polling competitions: {}", codes.join(", "));
    }
    codes
}
