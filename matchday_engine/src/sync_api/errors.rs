use thiserror::Error;

/// Errors raised while applying a single feed update. A failure is scoped to the update that
/// raised it; the surrounding batch carries on with the next update.
#[derive(Debug, Error)]
pub enum MatchSyncError {
    #[error("Match store error: {0}")]
    StoreError(String),
    #[error("Slip cache error: {0}")]
    CacheError(String),
    #[error("Settlement error: {0}")]
    SettlementError(String),
}

impl MatchSyncError {
    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        Self::StoreError(err.to_string())
    }

    pub fn cache<E: std::fmt::Display>(err: E) -> Self {
        Self::CacheError(err.to_string())
    }

    pub fn settlement<E: std::fmt::Display>(err: E) -> Self {
        Self::SettlementError(err.to_string())
    }
}
