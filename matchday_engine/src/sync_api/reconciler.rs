//! Slip reconciliation.
//!
//! When a fixture stops being bettable (kickoff, cancellation, or a date change), every
//! unconfirmed slip in the cache is combed for bets riding on it. A slip backed entirely by
//! the fixture is deleted whole; otherwise the matching bets are trimmed and the rest of the
//! slip stays as the punter placed it. A second pass over the same fixture finds nothing left
//! to do.

use std::fmt::{Display, Formatter};

use log::debug;

use crate::{db::traits::SlipCache, db_types::Bet};

/// What one reconciliation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Bets trimmed from slips that also carry bets on other fixtures.
    pub bets_removed: usize,
    /// Slips deleted because every one of their bets rode on the fixture.
    pub slips_deleted: usize,
}

impl ReconcileOutcome {
    pub fn total(&self) -> usize {
        self.bets_removed + self.slips_deleted
    }
}

impl Display for ReconcileOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} cached bets removed and {} slips deleted.", self.bets_removed, self.slips_deleted)
    }
}

/// Scans the whole cache and prunes bets riding on the given fixture.
pub async fn reconcile_slips<C: SlipCache>(
    cache: &C,
    team_home: &str,
    team_away: &str,
) -> Result<ReconcileOutcome, C::Error> {
    let mut outcome = ReconcileOutcome::default();
    let usernames = cache.usernames().await?;
    for username in usernames {
        let slips = cache.slips_for_user(&username).await?;
        for slip in slips {
            let riding =
                slip.bets.iter().filter(|b| b.on_fixture(team_home, team_away)).cloned().collect::<Vec<Bet>>();
            if riding.is_empty() {
                continue;
            }
            if riding.len() == slip.bets.len() {
                cache.delete_slip(&username, slip.slip_id).await?;
                outcome.slips_deleted += 1;
                debug!(
                    "🧾 Slip {} of {username} only rode on {team_home} v {team_away} and has been deleted",
                    slip.slip_id
                );
            } else {
                for bet in &riding {
                    cache.remove_bet(&username, slip.slip_id, bet).await?;
                }
                outcome.bets_removed += riding.len();
                debug!(
                    "🧾 Trimmed {} bets on {team_home} v {team_away} from slip {} of {username}",
                    riding.len(),
                    slip.slip_id
                );
            }
        }
    }
    Ok(outcome)
}
