//! Core trait definitions for the claim protocol.
//!
//! These three traits define the complete seam between the controller and
//! its collaborators:
//!
//! - `EvidenceVerifier` — pure cryptographic checker (stateless, total)
//! - `TraceRecorder`    — append-only lifecycle record (must never fail silently)
//! - `Ledger`           — durable state collaborator, used only by the
//!                        business layer AFTER a bundle fully succeeds
//!
//! The controller wires the first two together and never touches the third.

use exoclaim_contracts::{
    claim::{ExternalStateClaim, StateKey},
    context::ExecutionContext,
    error::ClaimResult,
    evidence::Evidence,
    trace::TraceEvent,
    verify::VerificationResult,
};

/// A pure, stateless, total function from (claim, evidence) to a
/// verification outcome.
///
/// Implementations are **trusted** and must be deterministic: the same
/// (claim, evidence, context) must always yield the same result, on any
/// node, in any process. They must never panic and never perform I/O —
/// that is what makes verification cheaply replayable from the trace.
///
/// Nonce dedup is NOT this trait's job: the consumed-nonce set is
/// execution-scoped mutable state owned by the controller.
pub trait EvidenceVerifier: Send + Sync {
    /// Check `evidence` against `claim` under the execution's freshness
    /// window.
    ///
    /// Returns `Valid(payload)` when every check passes, otherwise
    /// `Invalid(reason)` naming the specific failed check. Never errors:
    /// verification failure is an expected business outcome, not a fault.
    fn verify(
        &self,
        claim: &ExternalStateClaim,
        evidence: &Evidence,
        ctx: &ExecutionContext,
    ) -> VerificationResult;
}

/// The append-only trace of lifecycle transitions.
///
/// Every controller operation appends exactly one event per transition. A
/// failed append is fatal to the whole execution: an unrecorded
/// verification cannot later be proven, so implementations must surface
/// failures as `ClaimError::TraceAppendFailed` — never swallow them.
pub trait TraceRecorder: Send + Sync {
    /// Append one lifecycle event to the trace.
    ///
    /// Implementations must treat this as append-only. Events appended here
    /// are never modified or deleted by the protocol.
    fn append(&self, event: &TraceEvent) -> ClaimResult<()>;

    /// Seal the trace for an execution.
    ///
    /// Called by the host when the execution completes. Implementations may
    /// use this to flush, sign, or export the record.
    fn finalize(&self, execution_id: &str) -> ClaimResult<()>;
}

/// The durable ledger collaborator.
///
/// The claim protocol itself never calls this. Only the business layer
/// composing a bundle does, and only after every member claim verified —
/// that convention is what makes a failed bundle leave the ledger
/// completely untouched.
pub trait Ledger: Send + Sync {
    /// Durably record an outcome under a structured key so future
    /// executions can observe it.
    fn record_state(&self, key: &StateKey, value: u64, hash: &[u8; 32]) -> ClaimResult<()>;

    /// Current balance of `token_id` held by `address`. Missing entries
    /// read as zero.
    fn query_balance(&self, address: &str, token_id: &str) -> u64;

    /// Move `amount` of `token_id` from `from` to `to`.
    fn transfer(&self, from: &str, to: &str, token_id: &str, amount: u64) -> ClaimResult<()>;

    /// Create `amount` of `token_id` in `to`'s balance.
    fn mint(&self, to: &str, token_id: &str, amount: u64) -> ClaimResult<()>;
}
