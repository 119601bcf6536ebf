//! The trait seams between the synchronization API and its storage backends.
//!
//! Three concerns are kept behind separate traits so that each can be swapped or mocked on its
//! own:
//!
//! * [`MatchStore`] is the canonical record of matches. Every lifecycle transition the feed
//!   reports ends up as a handful of primitive operations on this trait.
//! * [`SlipCache`] holds unconfirmed betting slips. It is deliberately small, since the
//!   synchronization flows only ever scan it and prune bets that have become unplayable.
//! * [`BetSettlement`] owns confirmed slips and their bets. It resolves bets against final
//!   scores, pays out winning slips, and keeps denormalized bet data in step with the store.
//!
//! The engine ships a SQLite implementation of [`MatchStore`] and [`BetSettlement`], and an
//! in-process implementation of [`SlipCache`]. Handlers receive the three capabilities as
//! independent values, so a deployment is free to point them at the same backend or at three
//! different ones.

mod data_objects;
mod match_store;
mod settlement;
mod slip_cache;

pub use data_objects::{FinishOutcome, InsertMatchResult, SettlementReport};
pub use match_store::MatchStore;
pub use settlement::BetSettlement;
pub use slip_cache::SlipCache;
