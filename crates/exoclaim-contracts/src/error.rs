//! Error types for the claim protocol.
//!
//! All fallible operations return `ClaimResult<T>`. Verification failure is
//! deliberately NOT in this enum when surfaced from `verify()` — it is a
//! `VerificationResult::Invalid` the caller branches on. Only the composed
//! entry points (`validate_and_query`, `run_bundle`) fold it into
//! `VerificationFailed` so a single `?` surfaces the first failure.

use thiserror::Error;

use crate::{
    claim::{ClaimId, LifecycleState},
    verify::InvalidReason,
};

/// The unified error type for the EXOCLAIM crates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    /// Malformed declare/bind input: empty source, claim-id mismatch, bad
    /// evidence shape. Caller-recoverable, never retried automatically.
    #[error("invalid parameters: {reason}")]
    InvalidParams { reason: String },

    /// The operation referenced a claim this execution never declared.
    #[error("claim {claim_id} not found in this execution")]
    NotFound { claim_id: ClaimId },

    /// The operation was attempted out of lifecycle order.
    #[error("claim {claim_id} is {actual}, expected {expected}")]
    InvalidState {
        claim_id: ClaimId,
        expected: LifecycleState,
        actual: LifecycleState,
    },

    /// `query()` was called twice on the same claim.
    #[error("claim {claim_id} payload already consumed")]
    AlreadyConsumed { claim_id: ClaimId },

    /// Evidence failed a cryptographic check. Produced only by the composed
    /// entry points; bare `verify()` returns `VerificationResult::Invalid`
    /// instead.
    #[error("verification failed: {reason}")]
    VerificationFailed { reason: InvalidReason },

    /// The trace recorder could not append a lifecycle record.
    ///
    /// Fatal: an unrecorded verification cannot later be proven, so the
    /// whole execution must abort.
    #[error("trace append failed: {reason}")]
    TraceAppendFailed { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The ledger collaborator rejected a business-layer operation.
    #[error("ledger rejected operation: {reason}")]
    LedgerRejected { reason: String },
}

/// Convenience alias used throughout the EXOCLAIM crates.
pub type ClaimResult<T> = Result<T, ClaimError>;
