//! # Synchronization API
//!
//! [`MatchSyncApi`] turns batches of feed updates into lifecycle transitions on the match
//! store, pruning of cached slips, and settlement of confirmed bets. The API is generic over
//! the three backend capabilities, so deployments and tests are free to mix real and mock
//! backends.
//!
//! The two free-standing pieces of machinery live in their own modules: [`reconciler`] scans
//! the slip cache for bets that have become unplayable, and [`resolver`] picks which `Timed`
//! match a postponement lands on.

pub mod errors;
pub mod match_sync_api;
pub mod reconciler;
pub mod resolver;

pub use match_sync_api::{MatchSyncApi, SyncReport, UpdateOutcome};
