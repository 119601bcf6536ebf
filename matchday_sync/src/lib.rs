//! # Matchday synchronization daemon
//! This crate hosts the daemon that keeps the match store in step with the football-data feed. It is responsible
//! for:
//! Polling the feed on a fixed schedule for the current matchday.
//! Converting feed records into match updates the engine understands.
//! Handing each batch to the engine, which applies it against the match store and the betting ledger.
//!
//! ## Configuration
//! The daemon is configured via environment variables. See [config](config/index.html) for more information.

pub mod config;
pub mod daemon;
pub mod errors;
pub mod feed_update;
pub mod worker;
