//! An in-process slip cache.
//!
//! Unconfirmed slips are short-lived working data with no durability requirement, so the
//! default deployment keeps them in a shared map. Anything that needs to survive a restart
//! belongs in the confirmed-slip ledger instead.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use chrono::Utc;
use log::debug;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::{
    db::traits::SlipCache,
    db_types::{Bet, NewSlip, Outcome, Slip, SlipId},
};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("A slip must carry at least one bet")]
    EmptySlip,
}

/// Slips keyed by username, kept in placement order. Clones share the underlying map.
#[derive(Clone, Default)]
pub struct MemorySlipCache {
    slips: Arc<RwLock<HashMap<String, Vec<Slip>>>>,
    next_id: Arc<AtomicI64>,
}

impl MemorySlipCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlipCache for MemorySlipCache {
    type Error = CacheError;

    async fn usernames(&self) -> Result<Vec<String>, Self::Error> {
        let slips = self.slips.read().await;
        let mut names = slips.keys().cloned().collect::<Vec<String>>();
        names.sort_unstable();
        Ok(names)
    }

    async fn slips_for_user(&self, username: &str) -> Result<Vec<Slip>, Self::Error> {
        let slips = self.slips.read().await;
        Ok(slips.get(username).cloned().unwrap_or_default())
    }

    async fn put_slip(&self, slip: NewSlip) -> Result<SlipId, Self::Error> {
        if slip.bets.is_empty() {
            return Err(CacheError::EmptySlip);
        }
        let id = SlipId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = Slip {
            slip_id: id,
            username: slip.username.clone(),
            stake: slip.stake,
            payout: mbg_common::Money::default(),
            outcome: Outcome::Unresolved,
            created_at: Utc::now(),
            confirmed_at: None,
            bets: slip.bets,
        };
        let mut slips = self.slips.write().await;
        slips.entry(slip.username).or_default().push(record);
        debug!("🧾 Slip {id} cached");
        Ok(id)
    }

    async fn remove_bet(&self, username: &str, slip_id: SlipId, bet: &Bet) -> Result<(), Self::Error> {
        let mut slips = self.slips.write().await;
        let mut drop_user = false;
        if let Some(user_slips) = slips.get_mut(username) {
            let mut slip_emptied = false;
            if let Some(slip) = user_slips.iter_mut().find(|s| s.slip_id == slip_id) {
                if let Some(position) = slip.bets.iter().position(|b| b == bet) {
                    slip.bets.remove(position);
                    debug!("🧾 Removed a bet from slip {slip_id} of {username}");
                    slip_emptied = slip.bets.is_empty();
                }
            }
            if slip_emptied {
                user_slips.retain(|s| s.slip_id != slip_id);
                debug!("🧾 Slip {slip_id} of {username} had no bets left and has been removed");
            }
            drop_user = user_slips.is_empty();
        }
        if drop_user {
            slips.remove(username);
        }
        Ok(())
    }

    async fn delete_slip(&self, username: &str, slip_id: SlipId) -> Result<(), Self::Error> {
        let mut slips = self.slips.write().await;
        let mut drop_user = false;
        if let Some(user_slips) = slips.get_mut(username) {
            user_slips.retain(|s| s.slip_id != slip_id);
            drop_user = user_slips.is_empty();
        }
        if drop_user {
            slips.remove(username);
        }
        debug!("🧾 Slip {slip_id} of {username} deleted");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use chrono::{DateTime, Utc};
    use mbg_common::{Money, Odds};

    use super::*;
    use crate::db_types::MatchId;

    fn kickoff() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-08-22T18:45:00Z").unwrap().with_timezone(&Utc)
    }

    fn bet(home: &str, away: &str, market: &str) -> Bet {
        Bet {
            match_id: MatchId(0),
            match_date: kickoff(),
            competition_id: "IT1".to_string(),
            team_home: home.to_string(),
            team_away: away.to_string(),
            multiplier_name: market.to_string(),
            multiplier_value: Odds::from_hundredths(150),
            outcome: Outcome::Unresolved,
        }
    }

    #[tokio::test]
    async fn slips_get_sequential_ids_and_keep_placement_order() {
        let cache = MemorySlipCache::new();
        let first = cache
            .put_slip(NewSlip::new("alice", Money::from(500), vec![bet("Juventus", "Napoli", "1")]))
            .await
            .unwrap();
        let second = cache
            .put_slip(NewSlip::new("alice", Money::from(250), vec![bet("Arsenal", "Chelsea", "X")]))
            .await
            .unwrap();
        assert_eq!(first, SlipId(0));
        assert_eq!(second, SlipId(1));
        let slips = cache.slips_for_user("alice").await.unwrap();
        assert_eq!(slips.len(), 2);
        assert_eq!(slips[0].slip_id, first);
        assert_eq!(slips[1].slip_id, second);
    }

    #[tokio::test]
    async fn empty_slips_are_rejected() {
        let cache = MemorySlipCache::new();
        let result = cache.put_slip(NewSlip::new("bob", Money::from(100), vec![])).await;
        assert!(matches!(result, Err(CacheError::EmptySlip)));
        assert!(cache.usernames().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_bet_takes_the_first_equal_bet_only() {
        let cache = MemorySlipCache::new();
        let bets = vec![bet("Juventus", "Napoli", "1"), bet("Juventus", "Napoli", "1"), bet("Milan", "Inter", "2")];
        let id = cache.put_slip(NewSlip::new("carol", Money::from(1000), bets.clone())).await.unwrap();
        cache.remove_bet("carol", id, &bets[0]).await.unwrap();
        let slips = cache.slips_for_user("carol").await.unwrap();
        assert_eq!(slips[0].bets.len(), 2);
        assert_eq!(slips[0].bets[0], bets[1]);
        assert_eq!(slips[0].bets[1], bets[2]);
    }

    #[tokio::test]
    async fn removing_the_last_bet_drops_the_slip() {
        let cache = MemorySlipCache::new();
        let only = bet("Juventus", "Napoli", "GG");
        let id = cache.put_slip(NewSlip::new("dave", Money::from(300), vec![only.clone()])).await.unwrap();
        cache.remove_bet("dave", id, &only).await.unwrap();
        assert!(cache.slips_for_user("dave").await.unwrap().is_empty());
        assert!(cache.usernames().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_slip_leaves_other_slips_alone() {
        let cache = MemorySlipCache::new();
        let first = cache
            .put_slip(NewSlip::new("erin", Money::from(500), vec![bet("Juventus", "Napoli", "1")]))
            .await
            .unwrap();
        let second = cache
            .put_slip(NewSlip::new("erin", Money::from(500), vec![bet("Arsenal", "Chelsea", "2")]))
            .await
            .unwrap();
        cache.delete_slip("erin", first).await.unwrap();
        let slips = cache.slips_for_user("erin").await.unwrap();
        assert_eq!(slips.len(), 1);
        assert_eq!(slips[0].slip_id, second);
    }
}
