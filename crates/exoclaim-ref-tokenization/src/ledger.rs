//! In-memory implementation of the `Ledger` trait.
//!
//! Stands in for the durable chain state of a production deployment. Token
//! balances and recorded state entries live in `Mutex`-protected maps so a
//! scenario can hold an `Arc` handle for inspection while business code
//! uses the trait object.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::info;

use exoclaim_contracts::{
    claim::StateKey,
    error::{ClaimError, ClaimResult},
};
use exoclaim_core::traits::Ledger;

/// An in-memory token ledger with append-only recorded state.
///
/// Recorded state is write-once per key: a second `record_state` under the
/// same key is rejected, matching the durability contract that a recorded
/// outcome is never silently replaced.
#[derive(Default)]
pub struct InMemoryLedger {
    balances: Mutex<HashMap<(String, String), u64>>,
    recorded: Mutex<HashMap<[u8; 25], (u64, [u8; 32])>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded (value, hash) under `key`, if any. Inspection only;
    /// business code reads recorded state through this as well.
    pub fn recorded(&self, key: &StateKey) -> Option<(u64, [u8; 32])> {
        self.recorded
            .lock()
            .expect("ledger state lock poisoned")
            .get(&key.to_bytes())
            .copied()
    }

    /// Number of recorded state entries.
    pub fn recorded_count(&self) -> usize {
        self.recorded
            .lock()
            .expect("ledger state lock poisoned")
            .len()
    }
}

impl Ledger for InMemoryLedger {
    fn record_state(&self, key: &StateKey, value: u64, hash: &[u8; 32]) -> ClaimResult<()> {
        let mut recorded = self
            .recorded
            .lock()
            .map_err(|e| ClaimError::LedgerRejected {
                reason: format!("ledger state lock poisoned: {}", e),
            })?;

        let bytes = key.to_bytes();
        if recorded.contains_key(&bytes) {
            return Err(ClaimError::LedgerRejected {
                reason: format!("state key {} already recorded", key),
            });
        }
        recorded.insert(bytes, (value, *hash));

        info!(key = %key, value, "ledger state recorded");
        Ok(())
    }

    fn query_balance(&self, address: &str, token_id: &str) -> u64 {
        self.balances
            .lock()
            .expect("ledger state lock poisoned")
            .get(&(address.to_string(), token_id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&self, from: &str, to: &str, token_id: &str, amount: u64) -> ClaimResult<()> {
        let mut balances = self
            .balances
            .lock()
            .map_err(|e| ClaimError::LedgerRejected {
                reason: format!("ledger state lock poisoned: {}", e),
            })?;

        let from_key = (from.to_string(), token_id.to_string());
        let available = balances.get(&from_key).copied().unwrap_or(0);
        if available < amount {
            return Err(ClaimError::LedgerRejected {
                reason: format!(
                    "insufficient balance: {} holds {} of {}, needs {}",
                    from, available, token_id, amount
                ),
            });
        }

        balances.insert(from_key, available - amount);
        let to_key = (to.to_string(), token_id.to_string());
        *balances.entry(to_key).or_insert(0) += amount;

        info!(from, to, token_id, amount, "ledger transfer");
        Ok(())
    }

    fn mint(&self, to: &str, token_id: &str, amount: u64) -> ClaimResult<()> {
        let mut balances = self
            .balances
            .lock()
            .map_err(|e| ClaimError::LedgerRejected {
                reason: format!("ledger state lock poisoned: {}", e),
            })?;

        let key = (to.to_string(), token_id.to_string());
        *balances.entry(key).or_insert(0) += amount;

        info!(to, token_id, amount, "ledger mint");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use exoclaim_contracts::{
        claim::{StateKey, StateKeyKind},
        error::ClaimError,
    };
    use exoclaim_core::traits::Ledger;

    use super::InMemoryLedger;

    #[test]
    fn mint_and_query() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.query_balance("addr-a", "TOK"), 0);

        ledger.mint("addr-a", "TOK", 100).unwrap();
        assert_eq!(ledger.query_balance("addr-a", "TOK"), 100);

        // Balances are per (address, token) pair.
        assert_eq!(ledger.query_balance("addr-a", "OTHER"), 0);
        assert_eq!(ledger.query_balance("addr-b", "TOK"), 0);
    }

    #[test]
    fn transfer_moves_balance() {
        let ledger = InMemoryLedger::new();
        ledger.mint("addr-a", "TOK", 100).unwrap();
        ledger.transfer("addr-a", "addr-b", "TOK", 40).unwrap();

        assert_eq!(ledger.query_balance("addr-a", "TOK"), 60);
        assert_eq!(ledger.query_balance("addr-b", "TOK"), 40);
    }

    #[test]
    fn transfer_insufficient_balance_rejected() {
        let ledger = InMemoryLedger::new();
        ledger.mint("addr-a", "TOK", 10).unwrap();

        let result = ledger.transfer("addr-a", "addr-b", "TOK", 11);
        assert!(matches!(result, Err(ClaimError::LedgerRejected { .. })));

        // Nothing moved.
        assert_eq!(ledger.query_balance("addr-a", "TOK"), 10);
        assert_eq!(ledger.query_balance("addr-b", "TOK"), 0);
    }

    #[test]
    fn record_state_is_write_once() {
        let ledger = InMemoryLedger::new();
        let key = StateKey::new(StateKeyKind::ClaimOutcome, uuid::Uuid::new_v4(), 7);

        ledger.record_state(&key, 42, &[1u8; 32]).unwrap();
        assert_eq!(ledger.recorded(&key), Some((42, [1u8; 32])));

        let result = ledger.record_state(&key, 99, &[2u8; 32]);
        assert!(matches!(result, Err(ClaimError::LedgerRejected { .. })));

        // Original entry survives.
        assert_eq!(ledger.recorded(&key), Some((42, [1u8; 32])));
    }

    #[test]
    fn distinct_kinds_never_collide() {
        let ledger = InMemoryLedger::new();
        let subject = uuid::Uuid::new_v4();
        let a = StateKey::new(StateKeyKind::AssetToken, subject, 1);
        let b = StateKey::new(StateKeyKind::VoteTally, subject, 1);

        ledger.record_state(&a, 1, &[0u8; 32]).unwrap();
        ledger.record_state(&b, 2, &[0u8; 32]).unwrap();
        assert_eq!(ledger.recorded_count(), 2);
    }
}
