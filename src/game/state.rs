//! Game state snapshot and the events that change it.
//!
//! `GameState::apply` is the only way state moves forward; it never mutates
//! in place and returns the successor state.

use std::collections::BTreeMap;

use crate::checkout::types::{Currency, SessionId, Withdrawal};

/// The slice of farm state the checkout flows read and update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameState {
    pub farm_id: u64,
    /// SFL balance.
    pub balance: f64,
    pub block_bucks: u64,
    /// Item ID → amount held on the farm.
    pub inventory: BTreeMap<u32, f64>,
    /// Wearable ID → amount held on the farm.
    pub wardrobe: BTreeMap<u32, u64>,
    pub bumpkin_id: Option<u64>,
    /// Current on-chain session.
    pub session_id: Option<SessionId>,
    /// Actions taken since the last save.
    pub pending_actions: usize,
}

/// Typed events accepted by the state holder.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Persist pending actions.
    Save,
    /// A Block Bucks purchase settled in `currency`.
    BuyBlockBucks { currency: Currency, amount: u32 },
    /// Card checkout reported success; credit the purchased amount.
    UpdateBlockBucks { amount: u32 },
    /// A withdrawal was finalized on-chain.
    Withdrawn {
        session_id: SessionId,
        withdrawal: Withdrawal,
    },
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::Save => "SAVE",
            GameEvent::BuyBlockBucks { .. } => "BUY_BLOCK_BUCKS",
            GameEvent::UpdateBlockBucks { .. } => "UPDATE_BLOCK_BUCKS",
            GameEvent::Withdrawn { .. } => "WITHDRAWN",
        }
    }
}

impl GameState {
    /// State after `event`.
    pub fn apply(&self, event: &GameEvent) -> GameState {
        let mut next = self.clone();
        match event {
            GameEvent::Save => next.pending_actions = 0,
            GameEvent::BuyBlockBucks { amount, .. } | GameEvent::UpdateBlockBucks { amount } => {
                next.block_bucks += u64::from(*amount);
            }
            GameEvent::Withdrawn {
                session_id,
                withdrawal,
            } => {
                next.session_id = Some(session_id.clone());
                next.debit(withdrawal);
            }
        }
        next
    }

    fn debit(&mut self, withdrawal: &Withdrawal) {
        match withdrawal {
            Withdrawal::Sfl { sfl } => self.balance = (self.balance - sfl).max(0.0),
            Withdrawal::Items { ids, amounts } => {
                for (id, amount) in ids.iter().zip(amounts) {
                    let amount: f64 = amount.parse().unwrap_or(0.0);
                    if let Some(held) = self.inventory.get_mut(id) {
                        *held = (*held - amount).max(0.0);
                        if *held == 0.0 {
                            self.inventory.remove(id);
                        }
                    }
                }
            }
            Withdrawal::Wearables { ids, amounts } => {
                for (id, amount) in ids.iter().zip(amounts) {
                    if let Some(held) = self.wardrobe.get_mut(id) {
                        *held = held.saturating_sub(*amount);
                        if *held == 0 {
                            self.wardrobe.remove(id);
                        }
                    }
                }
            }
            Withdrawal::Bumpkin { .. } => self.bumpkin_id = None,
        }
    }

    /// Check a withdrawal against what the farm holds.
    ///
    /// Returns a description of the first problem found.
    pub fn check_withdrawal(&self, withdrawal: &Withdrawal) -> Result<(), String> {
        match withdrawal {
            Withdrawal::Sfl { sfl } => {
                if !sfl.is_finite() || *sfl <= 0.0 {
                    return Err(format!("SFL amount {} must be positive", sfl));
                }
                if *sfl > self.balance {
                    return Err(format!(
                        "Insufficient SFL: requested {}, available {}",
                        sfl, self.balance
                    ));
                }
            }
            Withdrawal::Items { ids, amounts } => {
                if ids.len() != amounts.len() {
                    return Err("ids and amounts differ in length".to_string());
                }
                // Repeated ids count against the same holding.
                let mut requested: BTreeMap<u32, f64> = BTreeMap::new();
                for (id, raw) in ids.iter().zip(amounts) {
                    let amount: f64 = raw
                        .parse()
                        .map_err(|_| format!("Item {} amount '{}' is not a number", id, raw))?;
                    if !amount.is_finite() || amount <= 0.0 {
                        return Err(format!("Item {} amount must be positive", id));
                    }
                    *requested.entry(*id).or_default() += amount;
                }
                for (id, amount) in requested {
                    let held = self.inventory.get(&id).copied().unwrap_or(0.0);
                    if amount > held {
                        return Err(format!(
                            "Insufficient item {}: requested {}, available {}",
                            id, amount, held
                        ));
                    }
                }
            }
            Withdrawal::Wearables { ids, amounts } => {
                if ids.len() != amounts.len() {
                    return Err("ids and amounts differ in length".to_string());
                }
                let mut requested: BTreeMap<u32, u64> = BTreeMap::new();
                for (id, amount) in ids.iter().zip(amounts) {
                    if *amount == 0 {
                        return Err(format!("Wearable {} amount must be positive", id));
                    }
                    let total = requested.entry(*id).or_default();
                    *total = total.saturating_add(*amount);
                }
                for (id, amount) in requested {
                    let held = self.wardrobe.get(&id).copied().unwrap_or(0);
                    if amount > held {
                        return Err(format!(
                            "Insufficient wearable {}: requested {}, available {}",
                            id, amount, held
                        ));
                    }
                }
            }
            Withdrawal::Bumpkin { bumpkin_id } => {
                if self.bumpkin_id != Some(*bumpkin_id) {
                    return Err(format!("Bumpkin {} is not on this farm", bumpkin_id));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn farm() -> GameState {
        GameState {
            farm_id: 1,
            balance: 10.0,
            block_bucks: 2,
            inventory: BTreeMap::from([(601, 3.0)]),
            wardrobe: BTreeMap::from([(20, 1)]),
            bumpkin_id: Some(9),
            session_id: None,
            pending_actions: 4,
        }
    }

    #[test]
    fn test_save_clears_pending() {
        let next = farm().apply(&GameEvent::Save);
        assert_eq!(next.pending_actions, 0);
    }

    #[test]
    fn test_block_bucks_credit() {
        let next = farm()
            .apply(&GameEvent::BuyBlockBucks {
                currency: Currency::Matic,
                amount: 5,
            })
            .apply(&GameEvent::UpdateBlockBucks { amount: 10 });
        assert_eq!(next.block_bucks, 17);
    }

    #[test]
    fn test_withdrawn_debits_and_records_session() {
        let state = farm();
        let next = state.apply(&GameEvent::Withdrawn {
            session_id: SessionId::new("0xabc"),
            withdrawal: Withdrawal::Items {
                ids: vec![601],
                amounts: vec!["3".into()],
            },
        });
        assert!(next.inventory.is_empty());
        assert_eq!(next.session_id, Some(SessionId::new("0xabc")));
        // Pure: the original is untouched.
        assert_eq!(state.inventory.get(&601), Some(&3.0));
    }

    #[test]
    fn test_check_withdrawal() {
        let state = farm();
        assert!(state.check_withdrawal(&Withdrawal::Sfl { sfl: 10.0 }).is_ok());
        assert!(state.check_withdrawal(&Withdrawal::Sfl { sfl: 10.5 }).is_err());
        assert!(state.check_withdrawal(&Withdrawal::Sfl { sfl: 0.0 }).is_err());

        let too_many = Withdrawal::Wearables {
            ids: vec![20],
            amounts: vec![2],
        };
        assert!(state
            .check_withdrawal(&too_many)
            .unwrap_err()
            .contains("Insufficient wearable 20"));

        let mismatched = Withdrawal::Items {
            ids: vec![601, 602],
            amounts: vec!["1".into()],
        };
        assert!(state.check_withdrawal(&mismatched).is_err());

        assert!(state
            .check_withdrawal(&Withdrawal::Bumpkin { bumpkin_id: 8 })
            .is_err());
    }

    #[test]
    fn test_repeated_ids_are_summed() {
        let state = farm();

        let items = Withdrawal::Items {
            ids: vec![601, 601],
            amounts: vec!["3".into(), "3".into()],
        };
        assert!(state
            .check_withdrawal(&items)
            .unwrap_err()
            .contains("Insufficient item 601: requested 6"));

        let wearables = Withdrawal::Wearables {
            ids: vec![20, 20],
            amounts: vec![1, 1],
        };
        assert!(state
            .check_withdrawal(&wearables)
            .unwrap_err()
            .contains("Insufficient wearable 20: requested 2"));

        // Split across entries but within the holding.
        let split = Withdrawal::Items {
            ids: vec![601, 601],
            amounts: vec!["1".into(), "2".into()],
        };
        assert!(state.check_withdrawal(&split).is_ok());
    }
}
