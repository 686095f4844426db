//! In-memory implementation of `TraceRecorder`.

use std::sync::Mutex;

use chrono::Utc;
use tracing::info;

use exoclaim_contracts::{
    error::{ClaimError, ClaimResult},
    trace::TraceEvent,
};
use exoclaim_core::traits::TraceRecorder;

use crate::{
    chain::{link_digest, verify_chain},
    link::{TraceLink, TraceLog, GENESIS_DIGEST},
};

/// An append-only trace recorder keeping the chain in memory.
///
/// There is no separate bookkeeping to drift out of sync: the next
/// sequence number is the number of stored links, and the running digest
/// is the last link's `this_digest`. The `Mutex` exists so a host can
/// hold an `Arc` clone for post-execution inspection while the controller
/// owns the boxed recorder; the protocol itself is single-threaded per
/// execution.
pub struct InMemoryTraceRecorder {
    execution_id: String,
    pub(crate) links: Mutex<Vec<TraceLink>>,
}

impl InMemoryTraceRecorder {
    /// Create an empty recorder for the given execution.
    pub fn new(execution_id: impl Into<String>) -> Self {
        Self {
            execution_id: execution_id.into(),
            links: Mutex::new(Vec::new()),
        }
    }

    /// The digest of the last link, or [`GENESIS_DIGEST`] before any
    /// append. This is the compact commitment to the execution so far.
    pub fn terminal_digest(&self) -> [u8; 32] {
        let links = self.links.lock().expect("trace links lock poisoned");
        links.last().map(|l| l.this_digest).unwrap_or(GENESIS_DIGEST)
    }

    /// Export a sealed `TraceLog` of everything recorded so far.
    pub fn export_log(&self) -> TraceLog {
        let links = self.links.lock().expect("trace links lock poisoned");
        TraceLog {
            execution_id: self.execution_id.clone(),
            links: links.clone(),
            exported_at: Utc::now(),
            terminal_digest: links.last().map(|l| l.this_digest).unwrap_or(GENESIS_DIGEST),
        }
    }

    /// True when the in-memory chain still verifies.
    pub fn verify_integrity(&self) -> bool {
        let links = self.links.lock().expect("trace links lock poisoned");
        verify_chain(&self.execution_id, &links)
    }
}

impl TraceRecorder for InMemoryTraceRecorder {
    /// Chain one lifecycle event onto the recorded links.
    ///
    /// Returns `Err(TraceAppendFailed)` only if the internal mutex is
    /// poisoned.
    fn append(&self, event: &TraceEvent) -> ClaimResult<()> {
        let mut links = self.links.lock().map_err(|e| ClaimError::TraceAppendFailed {
            reason: format!("trace links lock poisoned: {}", e),
        })?;

        let sequence = links.len() as u64;
        let prev_digest = links.last().map(|l| l.this_digest).unwrap_or(GENESIS_DIGEST);
        let this_digest = link_digest(&self.execution_id, sequence, &prev_digest, event);

        links.push(TraceLink {
            sequence,
            event: event.clone(),
            prev_digest,
            this_digest,
        });

        Ok(())
    }

    /// Mark the execution as complete in the trace.
    ///
    /// Logs the terminal digest. An implementation that persists or hands
    /// off to a prover would flush here; the in-memory recorder has
    /// nothing to flush.
    fn finalize(&self, execution_id: &str) -> ClaimResult<()> {
        let links = self.links.lock().map_err(|e| ClaimError::TraceAppendFailed {
            reason: format!("trace links lock poisoned: {}", e),
        })?;

        let terminal = links.last().map(|l| l.this_digest).unwrap_or(GENESIS_DIGEST);
        info!(
            execution_id = %execution_id,
            link_count = links.len(),
            terminal_digest = %hex::encode(terminal),
            "trace sealed"
        );

        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use exoclaim_contracts::{
        claim::{ClaimId, ClaimType},
        trace::TraceEventKind,
        verify::InvalidReason,
    };

    use super::*;

    /// The lifecycle of one claim, as the controller would record it.
    fn lifecycle_events(claim_id: ClaimId) -> Vec<TraceEvent> {
        vec![
            TraceEvent {
                claim_id,
                logical_time: 10,
                kind: TraceEventKind::ClaimDeclared {
                    claim_type: ClaimType::FileContent,
                    source: "file:///etc/terms.pdf".to_string(),
                },
            },
            TraceEvent {
                claim_id,
                logical_time: 10,
                kind: TraceEventKind::EvidenceBound {
                    response_hash: "ab".repeat(32),
                },
            },
            TraceEvent {
                claim_id,
                logical_time: 10,
                kind: TraceEventKind::Verified {
                    payload_hash: "cd".repeat(32),
                },
            },
            TraceEvent {
                claim_id,
                logical_time: 10,
                kind: TraceEventKind::PayloadConsumed,
            },
        ]
    }

    fn recorded(execution_id: &str) -> InMemoryTraceRecorder {
        let recorder = InMemoryTraceRecorder::new(execution_id);
        for event in lifecycle_events(ClaimId::new()) {
            recorder.append(&event).unwrap();
        }
        recorder
    }

    #[test]
    fn appends_build_a_verifiable_chain() {
        let recorder = recorded("exec-chain");
        assert!(recorder.verify_integrity());

        let log = recorder.export_log();
        assert_eq!(log.links.len(), 4);
        assert_eq!(log.links[0].prev_digest, GENESIS_DIGEST);
        for (position, link) in log.links.iter().enumerate() {
            assert_eq!(link.sequence, position as u64);
        }
    }

    #[test]
    fn rewriting_a_stored_event_is_detected() {
        let recorder = recorded("exec-rewrite");

        {
            let mut links = recorder.links.lock().unwrap();
            links[2].event.kind = TraceEventKind::Rejected {
                reason: InvalidReason::BadSignature,
            };
        }

        assert!(
            !recorder.verify_integrity(),
            "flipping a verified outcome to a rejection must break the chain"
        );
    }

    #[test]
    fn reordering_stored_links_is_detected() {
        let recorder = recorded("exec-reorder");

        {
            let mut links = recorder.links.lock().unwrap();
            links.swap(1, 2);
        }

        assert!(!recorder.verify_integrity());
    }

    #[test]
    fn terminal_digest_tracks_the_chain_head() {
        let recorder = InMemoryTraceRecorder::new("exec-terminal");
        assert_eq!(recorder.terminal_digest(), GENESIS_DIGEST);

        for event in lifecycle_events(ClaimId::new()) {
            recorder.append(&event).unwrap();
        }

        let log = recorder.export_log();
        assert_eq!(recorder.terminal_digest(), log.terminal_digest);
        assert_eq!(log.terminal_digest, log.links.last().unwrap().this_digest);
        assert!(log.verify());
    }

    #[test]
    fn identical_events_under_different_executions_diverge() {
        let claim_id = ClaimId::new();
        let left = InMemoryTraceRecorder::new("exec-left");
        let right = InMemoryTraceRecorder::new("exec-right");
        for event in lifecycle_events(claim_id) {
            left.append(&event).unwrap();
            right.append(&event).unwrap();
        }

        assert_ne!(
            left.terminal_digest(),
            right.terminal_digest(),
            "a chain must commit to the execution it belongs to"
        );
    }

    #[test]
    fn empty_recorder_verifies_and_exports() {
        let recorder = InMemoryTraceRecorder::new("exec-empty");
        assert!(recorder.verify_integrity());

        let log = recorder.export_log();
        assert!(log.links.is_empty());
        assert_eq!(log.terminal_digest, GENESIS_DIGEST);
        assert!(log.verify());
    }
}
