mod api;
mod config;
mod error;

mod data_objects;

pub use api::FootDataApi;
pub use config::FootDataConfig;
pub use data_objects::{FeedCompetition, FeedGoals, FeedMatch, FeedScore, FeedTeam, MatchDay};
pub use error::FootDataApiError;
