use thiserror::Error;

use crate::db_types::MatchId;

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Could not run the database migrations: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Could not encode or decode the multiplier table: {0}")]
    MultiplierCoding(#[from] serde_json::Error),
    #[error("Match {0} does not exist")]
    MatchNotFound(MatchId),
}
