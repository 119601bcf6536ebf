//! SQLite backend for the match store and the confirmed-slip ledger.
//!
//! [`db`] holds the [`SqliteDatabase`](db::SqliteDatabase) handle and its trait
//! implementations. The query functions themselves live in [`matches`] and [`slips`] and run
//! against a borrowed connection, so the handle decides where transactions begin and end.

pub mod db;
mod errors;
pub mod matches;
pub mod slips;

use std::env;

pub use self::db::SqliteDatabase;
pub use errors::SqliteDatabaseError;
use log::info;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

const SQLITE_DB_URL: &str = "sqlite://data/matchday.db";

pub fn db_url() -> String {
    let result = env::var("MDS_DATABASE_URL").unwrap_or_else(|_| {
        info!("MDS_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqliteDatabaseError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
