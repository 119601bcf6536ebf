use crate::db_types::{Bet, NewSlip, Slip, SlipId};

/// Storage for betting slips that have not been confirmed yet.
///
/// Unconfirmed slips are cheap, user-scoped working data. The cache keys them by username and
/// preserves the order in which each user placed them. Slips never exist empty: removing the
/// last bet from a slip removes the slip itself.
#[allow(async_fn_in_trait)]
pub trait SlipCache: Clone {
    type Error: std::error::Error;

    /// Every username that currently has at least one slip in the cache.
    async fn usernames(&self) -> Result<Vec<String>, Self::Error>;

    /// All slips of one user, oldest first. Unknown users simply have no slips.
    async fn slips_for_user(&self, username: &str) -> Result<Vec<Slip>, Self::Error>;

    /// Stores a new slip and assigns it an id.
    async fn put_slip(&self, slip: NewSlip) -> Result<SlipId, Self::Error>;

    /// Removes the first bet on the slip that is equal to `bet`. Removing the last bet deletes
    /// the slip. Asking to remove a bet that is not on the slip is a no-op.
    async fn remove_bet(&self, username: &str, slip_id: SlipId, bet: &Bet) -> Result<(), Self::Error>;

    /// Deletes a whole slip. Deleting a slip that is already gone is a no-op.
    async fn delete_slip(&self, username: &str, slip_id: SlipId) -> Result<(), Self::Error>;
}
