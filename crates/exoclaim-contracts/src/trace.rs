//! Trace event types.
//!
//! The controller appends one `TraceEvent` for every lifecycle transition.
//! The trace is consumed by an external proof system; its only obligation
//! here is to be specific enough that a verifying node can replay each
//! verification deterministically from the same evidence.

use serde::{Deserialize, Serialize};

use crate::{
    claim::{ClaimId, ClaimType},
    verify::InvalidReason,
};

/// One lifecycle transition, as appended to the execution trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    /// The claim this transition belongs to.
    pub claim_id: ClaimId,
    /// Logical time of the execution when the transition happened.
    pub logical_time: u64,
    /// What happened.
    pub kind: TraceEventKind,
}

/// The kinds of lifecycle transitions that are traced.
///
/// Variants carry what a later replay needs: the declared source identity,
/// the verified payload hash, or the specific check that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "event")]
pub enum TraceEventKind {
    /// A claim was declared.
    ClaimDeclared {
        claim_type: ClaimType,
        source: String,
    },
    /// Evidence was bound to a declared claim.
    EvidenceBound {
        /// Hex SHA-256 of the evidence's response payload, committing the
        /// trace to the exact bytes that were later verified.
        response_hash: String,
    },
    /// Verification succeeded.
    Verified {
        /// Hex SHA-256 of the payload captured at verification time.
        payload_hash: String,
    },
    /// Bind input was malformed; the claim was rejected without ever being
    /// verified.
    BindRejected {
        /// What was wrong with the bind input.
        detail: String,
    },
    /// Verification failed.
    Rejected {
        /// The specific check that failed.
        reason: InvalidReason,
    },
    /// The verified payload was handed to business logic.
    PayloadConsumed,
}
