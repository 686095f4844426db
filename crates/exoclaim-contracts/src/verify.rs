//! Verification outcome types.
//!
//! A failed verification is a first-class business outcome, not an error:
//! the caller branches on `VerificationResult`, and only lifecycle misuse
//! (wrong state, unknown claim) surfaces as `ClaimError`.

use serde::{Deserialize, Serialize};

/// The outcome of running the verifier against one (claim, evidence) pair.
///
/// Given identical inputs this is a pure function of the evidence — any
/// party can replay the check from the trace and reach the same conclusion
/// without contacting the original source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationResult {
    /// Every check passed. The payload is the external data, now available
    /// to business logic via `query()`.
    Valid {
        /// The verified response payload, byte-identical to what the
        /// evidence carried.
        payload: Vec<u8>,
    },
    /// A specific check failed. The claim transitions to `Rejected`.
    Invalid {
        /// Which check failed, specific enough for deterministic replay.
        reason: InvalidReason,
    },
}

impl VerificationResult {
    /// True for the `Valid` variant.
    pub fn is_valid(&self) -> bool {
        matches!(self, VerificationResult::Valid { .. })
    }
}

/// The specific check that caused a verification to fail.
///
/// Recorded verbatim in the trace so a verifying node can rerun exactly the
/// failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidReason {
    /// The signature does not verify over the canonical encoding, or the
    /// key/signature bytes are malformed.
    BadSignature,
    /// `response_hash` does not match SHA-256 of the payload.
    HashMismatch,
    /// The Merkle proof is missing (for a database claim) or does not fold
    /// to the expected root.
    ProofInvalid,
    /// The evidence timestamp falls outside the execution's freshness window.
    Stale,
    /// The evidence nonce was already consumed within this execution.
    ReplayedNonce,
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InvalidReason::BadSignature => "bad signature",
            InvalidReason::HashMismatch => "hash mismatch",
            InvalidReason::ProofInvalid => "proof invalid",
            InvalidReason::Stale => "stale timestamp",
            InvalidReason::ReplayedNonce => "replayed nonce",
        };
        f.write_str(s)
    }
}
