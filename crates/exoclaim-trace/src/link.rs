//! Chain link and sealed log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use exoclaim_contracts::trace::TraceEvent;

use crate::chain::verify_chain;

/// The `prev_digest` of the first link in every chain. All zeroes — a
/// value SHA-256 cannot produce, so genesis detection is unambiguous.
pub const GENESIS_DIGEST: [u8; 32] = [0u8; 32];

/// One entry in an execution's trace chain.
///
/// Links carry binary digests, not their hex rendering: the digest is
/// protocol data, and hex is a display concern. Doctoring any stored
/// field, or moving a link to a different position, breaks recomputation
/// somewhere behind it and `verify_chain` reports the chain invalid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceLink {
    /// Position in the chain. 0-based and gapless; `verify_chain` checks
    /// it against the link's actual position.
    pub sequence: u64,
    /// The lifecycle transition this link records.
    pub event: TraceEvent,
    /// Digest of the preceding link, or [`GENESIS_DIGEST`] for the first.
    pub prev_digest: [u8; 32],
    /// Digest of this link's canonical content.
    pub this_digest: [u8; 32],
}

/// A sealed trace, exported after the execution completes.
///
/// `terminal_digest` is a compact commitment to every transition the
/// execution took, in order — the single value a proof system anchors to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceLog {
    /// The execution whose transitions are recorded.
    pub execution_id: String,
    /// All links in chain order.
    pub links: Vec<TraceLink>,
    /// Wall-clock export time. Documentation only; no digest covers it.
    pub exported_at: DateTime<Utc>,
    /// The last link's digest, or [`GENESIS_DIGEST`] for an empty log.
    pub terminal_digest: [u8; 32],
}

impl TraceLog {
    /// True when the chain verifies against this log's execution id and
    /// `terminal_digest` matches the last link.
    pub fn verify(&self) -> bool {
        let terminal = self
            .links
            .last()
            .map(|link| link.this_digest)
            .unwrap_or(GENESIS_DIGEST);
        terminal == self.terminal_digest && verify_chain(&self.execution_id, &self.links)
    }
}
