//! # exoclaim-bundle
//!
//! Composite claim orchestration for the EXOCLAIM protocol.
//!
//! A bundle sequences multiple independent claims for a single business
//! operation and combines their verified payloads atomically: the first
//! step failure aborts the whole bundle, and by convention the caller
//! performs its irreversible ledger effect only after the bundle as a
//! whole succeeds.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use exoclaim_bundle::{run_bundle, BundleStep};
//!
//! let result = run_bundle(&mut controller, vec![validate_step, value_step])?;
//! let valuation = result.payload("value-asset").unwrap();
//! // Only now does the business layer mint / transfer / record.
//! ```

pub mod orchestrator;

pub use orchestrator::{run_bundle, BundleStep, CombinedResult, StepOutput};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use sha2::{Digest, Sha256};

    use exoclaim_contracts::{
        claim::{ClaimType, ExecutionId, ExternalStateClaim, LifecycleState},
        context::ExecutionContext,
        error::{ClaimError, ClaimResult},
        evidence::{Evidence, EvidenceDraft},
        trace::TraceEvent,
        verify::{InvalidReason, VerificationResult},
    };
    use exoclaim_core::{
        traits::{EvidenceVerifier, TraceRecorder},
        ClaimController,
    };

    use super::{run_bundle, BundleStep};

    // ── Mock helpers ─────────────────────────────────────────────────────────

    /// Rejects any evidence whose payload contains the marker `TAMPERED`;
    /// accepts everything else.
    struct MarkerVerifier;

    impl EvidenceVerifier for MarkerVerifier {
        fn verify(
            &self,
            _claim: &ExternalStateClaim,
            evidence: &Evidence,
            _ctx: &ExecutionContext,
        ) -> VerificationResult {
            if evidence
                .response_payload
                .windows(8)
                .any(|w| w == b"TAMPERED")
            {
                VerificationResult::Invalid {
                    reason: InvalidReason::BadSignature,
                }
            } else {
                VerificationResult::Valid {
                    payload: evidence.response_payload.clone(),
                }
            }
        }
    }

    struct MockTrace {
        events: Arc<Mutex<Vec<TraceEvent>>>,
    }

    impl TraceRecorder for MockTrace {
        fn append(&self, event: &TraceEvent) -> ClaimResult<()> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }

        fn finalize(&self, _execution_id: &str) -> ClaimResult<()> {
            Ok(())
        }
    }

    fn controller() -> (ClaimController, Arc<Mutex<Vec<TraceEvent>>>) {
        let events = Arc::new(Mutex::new(vec![]));
        let trace = MockTrace { events: events.clone() };
        let ctx = ExecutionContext {
            execution_id: ExecutionId::new(),
            caller: "addr-caller".to_string(),
            logical_time: 100,
            freshness_window: 10,
        };
        (
            ClaimController::new(ctx, Box::new(MarkerVerifier), Box::new(trace)),
            events,
        )
    }

    fn draft(payload: &[u8]) -> EvidenceDraft {
        EvidenceDraft {
            public_key: vec![0u8; 32],
            signature: vec![0u8; 64],
            response_hash: Sha256::digest(payload).into(),
            response_payload: payload.to_vec(),
            integrity_proof: None,
            timestamp: None,
            nonce: None,
        }
    }

    fn step(label: &str, source: &str, payload: &[u8]) -> BundleStep {
        BundleStep {
            label: label.to_string(),
            claim_type: ClaimType::ApiResponse,
            source: source.to_string(),
            query_params: vec![],
            evidence: draft(payload),
        }
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    /// A two-step bundle succeeds and exposes each step's payload by label,
    /// in declared order.
    #[test]
    fn test_two_step_bundle_success() {
        let (mut c, _) = controller();

        let result = run_bundle(
            &mut c,
            vec![
                step("validate-asset", "https://validator/check", b"{\"valid\":true}"),
                step("value-asset", "https://appraiser/value", b"{\"value\":500000}"),
            ],
        )
        .unwrap();

        assert_eq!(result.outputs.len(), 2);
        assert_eq!(result.outputs[0].label, "validate-asset");
        assert_eq!(result.outputs[1].label, "value-asset");
        assert_eq!(
            result.payload("value-asset").unwrap(),
            b"{\"value\":500000}"
        );
        assert!(result.payload("missing-step").is_none());

        // Both claims ended Consumed: their payloads were handed out inside
        // the bundle and cannot be queried again.
        for output in &result.outputs {
            assert_eq!(c.state_of(&output.claim_id), Some(LifecycleState::Consumed));
            assert!(matches!(
                c.query(output.claim_id),
                Err(ClaimError::AlreadyConsumed { .. })
            ));
        }
    }

    /// Atomic abort: when step 2 fails, the bundle errors, step 3 is never
    /// declared, and no combined result exists for the caller to act on.
    #[test]
    fn test_bundle_aborts_on_first_failure() {
        let (mut c, _) = controller();

        let result = run_bundle(
            &mut c,
            vec![
                step("validate-asset", "https://validator/check", b"{\"valid\":true}"),
                step("value-asset", "https://appraiser/value", b"TAMPERED!"),
                step("never-runs", "https://registry/record", b"{\"ok\":true}"),
            ],
        );

        match result {
            Err(ClaimError::VerificationFailed { reason }) => {
                assert_eq!(reason, InvalidReason::BadSignature);
            }
            other => panic!("expected VerificationFailed, got {:?}", other),
        }

        // Steps 1 and 2 declared claims; step 3 never ran.
        assert_eq!(c.claim_count(), 2);
    }

    /// A failing first step means the second is never declared.
    #[test]
    fn test_first_step_failure_declares_nothing_further() {
        let (mut c, events) = controller();

        let result = run_bundle(
            &mut c,
            vec![
                step("validate-asset", "https://validator/check", b"TAMPERED!"),
                step("value-asset", "https://appraiser/value", b"{\"value\":1}"),
            ],
        );

        assert!(result.is_err());
        assert_eq!(c.claim_count(), 1);

        // The trace records exactly one claim's transitions: declared,
        // bound, rejected.
        assert_eq!(events.lock().unwrap().len(), 3);
    }

    /// An empty bundle is vacuously successful.
    #[test]
    fn test_empty_bundle() {
        let (mut c, _) = controller();
        let result = run_bundle(&mut c, vec![]).unwrap();
        assert!(result.outputs.is_empty());
    }

    /// Step order in the result matches declaration order — the order is
    /// part of the trace and replay must preserve it.
    #[test]
    fn test_step_order_preserved() {
        let (mut c, events) = controller();

        let result = run_bundle(
            &mut c,
            vec![
                step("a", "https://x/a", b"1"),
                step("b", "https://x/b", b"2"),
                step("c", "https://x/c", b"3"),
            ],
        )
        .unwrap();

        let labels: Vec<&str> = result.outputs.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);

        // Trace interleaving: all four transitions of step N appear before
        // any transition of step N+1.
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 12);
        for (i, output) in result.outputs.iter().enumerate() {
            for event in &events[i * 4..(i + 1) * 4] {
                assert_eq!(event.claim_id, output.claim_id);
            }
        }
    }
}
