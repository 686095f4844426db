//! The execution-scoped claim store.
//!
//! One store exists per execution, created at execution start and discarded
//! at execution end. It is owned exclusively by that execution's controller:
//! no other execution can observe it, so lifecycle transitions need no locks
//! — they are plain in-process mutations guarded by the state-machine
//! preconditions alone.

use std::collections::HashMap;

use exoclaim_contracts::{
    claim::{ClaimId, ExternalStateClaim},
    evidence::Evidence,
};

/// Everything the controller tracks about one claim.
#[derive(Debug, Clone)]
pub struct ClaimRecord {
    /// The declared claim, including its current lifecycle state.
    pub claim: ExternalStateClaim,
    /// Evidence, present from `EvidenceBound` onward.
    pub evidence: Option<Evidence>,
    /// The verified payload, set exactly once at `Verified` and returned
    /// byte-identical by `query()`. Never re-derived or re-fetched.
    pub payload: Option<Vec<u8>>,
}

/// Per-execution mapping from claim ID to claim record.
#[derive(Debug, Default)]
pub struct ClaimStore {
    records: HashMap<ClaimId, ClaimRecord>,
}

impl ClaimStore {
    /// Create an empty store for a fresh execution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly declared claim.
    ///
    /// Claim IDs are controller-generated UUIDs, so a collision would mean a
    /// broken ID generator; the new record silently replaces in that case,
    /// which the controller's fresh-ID guarantee makes unreachable.
    pub fn insert(&mut self, record: ClaimRecord) {
        self.records.insert(record.claim.claim_id, record);
    }

    /// Look up a claim record.
    pub fn get(&self, claim_id: &ClaimId) -> Option<&ClaimRecord> {
        self.records.get(claim_id)
    }

    /// Look up a claim record for mutation.
    pub fn get_mut(&mut self, claim_id: &ClaimId) -> Option<&mut ClaimRecord> {
        self.records.get_mut(claim_id)
    }

    /// Number of claims declared in this execution.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no claim has been declared yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
