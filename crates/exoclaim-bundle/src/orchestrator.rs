//! The composite claim orchestrator.
//!
//! A bundle is an ordered, atomic group of claims whose combined verified
//! outputs drive one business effect. The orchestrator runs each step
//! through the controller's composed entry point, in declared order, and
//! aborts on the first failure — no later step is even declared.
//!
//! The orchestrator itself NEVER touches the ledger. The convention that
//! makes bundles atomic is structural: the business function performs its
//! irreversible effect (mint, transfer, record) only after `run_bundle`
//! returns `Ok`, so a failed bundle leaves the ledger completely unchanged
//! and the partially-verified claims are simply discarded with the
//! execution.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use exoclaim_contracts::{
    claim::{ClaimId, ClaimType, ExecutionId},
    error::ClaimResult,
    evidence::EvidenceDraft,
};
use exoclaim_core::ClaimController;

/// One step of a bundle: a claim declaration plus the evidence that was
/// assembled for it out-of-band.
#[derive(Debug, Clone)]
pub struct BundleStep {
    /// Stable label naming the step's role (e.g. "validate-asset"). Used to
    /// address the step's payload in the combined result.
    pub label: String,
    /// The claim's source kind.
    pub claim_type: ClaimType,
    /// Origin identifier for the claim.
    pub source: String,
    /// Ordered query parameters.
    pub query_params: Vec<(String, String)>,
    /// Pre-assembled evidence, stamped with the claim ID at bind time.
    pub evidence: EvidenceDraft,
}

/// The verified output of one bundle step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutput {
    /// The step's label, copied from the `BundleStep`.
    pub label: String,
    /// The claim that produced this payload — the reference a verifying
    /// node uses to locate the step's transitions on the trace.
    pub claim_id: ClaimId,
    /// The verified payload.
    pub payload: Vec<u8>,
}

/// Every step's verified payload, in declared order.
///
/// Carries the claim IDs as trace references so each member claim can be
/// re-checked independently by a verifying node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedResult {
    /// The execution the bundle ran in.
    pub execution_id: ExecutionId,
    /// One output per step, in step order.
    pub outputs: Vec<StepOutput>,
}

impl CombinedResult {
    /// The payload of the step with the given label, if present.
    pub fn payload(&self, label: &str) -> Option<&[u8]> {
        self.outputs
            .iter()
            .find(|o| o.label == label)
            .map(|o| o.payload.as_slice())
    }
}

/// Run an ordered list of claim steps atomically.
///
/// Each step runs `validate_and_query` on the controller, in declared
/// order — the order is part of the trace, so replay preserves it exactly.
/// The first failure aborts the bundle: later steps are never declared,
/// and the error surfaces to the caller, whose downstream ledger effect
/// must therefore never run.
pub fn run_bundle(
    controller: &mut ClaimController,
    steps: Vec<BundleStep>,
) -> ClaimResult<CombinedResult> {
    let execution_id = controller.context().execution_id.clone();
    let step_count = steps.len();
    let mut outputs = Vec::with_capacity(step_count);

    info!(
        execution_id = %execution_id.0,
        step_count,
        "running claim bundle"
    );

    for (index, step) in steps.into_iter().enumerate() {
        debug!(
            step = index,
            label = %step.label,
            claim_type = %step.claim_type,
            source = %step.source,
            "bundle step starting"
        );

        let (claim_id, payload) = controller
            .run_claim(step.claim_type, step.source, step.query_params, step.evidence)
            .map_err(|e| {
                warn!(
                    step = index,
                    label = %step.label,
                    error = %e,
                    "bundle step failed, aborting bundle"
                );
                e
            })?;

        outputs.push(StepOutput {
            label: step.label,
            claim_id,
            payload,
        });
    }

    info!(
        execution_id = %execution_id.0,
        step_count,
        "bundle complete"
    );

    Ok(CombinedResult {
        execution_id,
        outputs,
    })
}
