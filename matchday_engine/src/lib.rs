//! Matchday Engine
//!
//! The match lifecycle and settlement core of the matchday betting gateway. The engine keeps a
//! bookkeeping-grade record of every match the football data feed reports, and keeps the bets
//! riding on those matches honest as fixtures move, vanish and finish.
//!
//! The library is divided into two main sections:
//! 1. Storage backends ([`mod@db`]). A SQLite backend implements the canonical match store and
//!    the confirmed-slip ledger, and an in-process cache holds unconfirmed slips. You should
//!    never need to query the backends directly. Use the synchronization API instead. The
//!    exception is the data types the backends traffic in, which are defined in the `db_types`
//!    module and are public.
//! 2. The synchronization API ([`mod@sync_api`]). [`MatchSyncApi`] applies feed updates in
//!    batches: scheduling new matches, patching live scores, carrying postponements, removing
//!    cancellations, and settling finished matches exactly once. Backends plug in through the
//!    traits in `db::traits`.
//!
//! The engine also emits events when a match finishes, is removed or is rescheduled. A small
//! hook system lets you subscribe to these events and run custom async actions on them.

mod db;

pub mod db_types;
pub mod events;
pub mod helpers;
mod sync_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use db::{
    memory::{CacheError, MemorySlipCache},
    traits::{BetSettlement, FinishOutcome, InsertMatchResult, MatchStore, SettlementReport, SlipCache},
};
pub use sync_api::{
    errors::MatchSyncError,
    match_sync_api::{MatchSyncApi, SyncReport, UpdateOutcome},
    reconciler::{reconcile_slips, ReconcileOutcome},
    resolver::nearest_timed_match,
};
