//! The claim lifecycle controller: declare → bind-evidence → verify → query.
//!
//! The controller enforces the claim state machine:
//!
//! ```text
//! Declared --bind_evidence--> EvidenceBound --verify(ok)--> Verified --query--> Consumed
//! Declared --bind_evidence(malformed)--> Rejected
//! EvidenceBound --verify(failure)--> Rejected
//! ```
//!
//! `Rejected` and `Consumed` are terminal, and no transition is ever taken
//! twice. Every transition appends exactly one event to the trace recorder;
//! a failed append is fatal, because a transition that is not on the trace
//! can never be proven to a verifying node.

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use exoclaim_contracts::{
    claim::{ClaimId, ClaimType, ExternalStateClaim, LifecycleState},
    context::ExecutionContext,
    error::{ClaimError, ClaimResult},
    evidence::{Evidence, EvidenceDraft},
    trace::{TraceEvent, TraceEventKind},
    verify::{InvalidReason, VerificationResult},
};

use crate::{
    store::{ClaimRecord, ClaimStore},
    traits::{EvidenceVerifier, TraceRecorder},
};

/// Ed25519 public key length in bytes.
const PUBLIC_KEY_LEN: usize = 32;
/// Ed25519 signature length in bytes.
const SIGNATURE_LEN: usize = 64;

/// The central controller that drives one execution's claims.
///
/// Construct one controller per execution. It owns the claim store and the
/// consumed-nonce set for the lifetime of that execution; both are discarded
/// with the controller when the execution ends. The verifier and trace
/// recorder are the trusted collaborators.
pub struct ClaimController {
    ctx: ExecutionContext,
    store: ClaimStore,
    /// Nonces observed by `verify()` in this execution. A nonce is consumed
    /// the moment it is seen, regardless of the verification outcome, so a
    /// second piece of evidence reusing it always rejects.
    seen_nonces: std::collections::HashSet<Vec<u8>>,
    verifier: Box<dyn EvidenceVerifier>,
    trace: Box<dyn TraceRecorder>,
}

impl ClaimController {
    /// Create a controller for one execution.
    pub fn new(
        ctx: ExecutionContext,
        verifier: Box<dyn EvidenceVerifier>,
        trace: Box<dyn TraceRecorder>,
    ) -> Self {
        Self {
            ctx,
            store: ClaimStore::new(),
            seen_nonces: std::collections::HashSet::new(),
            verifier,
            trace,
        }
    }

    /// The execution context this controller was built with.
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// Current lifecycle state of a claim, if it exists.
    pub fn state_of(&self, claim_id: &ClaimId) -> Option<LifecycleState> {
        self.store.get(claim_id).map(|r| r.claim.lifecycle_state)
    }

    /// Number of claims declared in this execution.
    pub fn claim_count(&self) -> usize {
        self.store.len()
    }

    // ── Declare ──────────────────────────────────────────────────────────────

    /// Declare the intent to incorporate one piece of external data.
    ///
    /// Allocates a fresh claim ID, stores the claim in `Declared`, and
    /// appends a `ClaimDeclared` trace event. Two declares with identical
    /// arguments yield two distinct claim IDs and two independent lifecycle
    /// instances — the controller never deduplicates.
    ///
    /// # Errors
    ///
    /// `InvalidParams` when `source` is empty; `TraceAppendFailed` when the
    /// trace cannot record the declaration.
    pub fn declare(
        &mut self,
        claim_type: ClaimType,
        source: impl Into<String>,
        query_params: Vec<(String, String)>,
    ) -> ClaimResult<ClaimId> {
        let source = source.into();
        if source.is_empty() {
            return Err(ClaimError::InvalidParams {
                reason: "source must be non-empty".to_string(),
            });
        }

        let claim_id = ClaimId::new();
        let claim = ExternalStateClaim {
            claim_id,
            claim_type,
            source: source.clone(),
            query_params,
            declared_at: self.ctx.logical_time,
            lifecycle_state: LifecycleState::Declared,
        };

        debug!(
            claim_id = %claim_id,
            claim_type = %claim_type,
            source = %source,
            "claim declared"
        );

        self.store.insert(ClaimRecord {
            claim,
            evidence: None,
            payload: None,
        });

        self.append_trace(
            claim_id,
            TraceEventKind::ClaimDeclared { claim_type, source },
        )?;

        Ok(claim_id)
    }

    // ── BindEvidence ─────────────────────────────────────────────────────────

    /// Bind caller-supplied evidence to a declared claim.
    ///
    /// The claim must exist and be in `Declared`. Structurally malformed
    /// evidence — claim-id mismatch, wrong key or signature length — rejects
    /// the claim permanently and returns `InvalidParams`; the cryptographic
    /// content is not examined until `verify()`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown claim, `InvalidState` when the claim is not
    /// in `Declared`, `InvalidParams` for malformed evidence.
    pub fn bind_evidence(&mut self, claim_id: ClaimId, evidence: Evidence) -> ClaimResult<()> {
        let state = self
            .state_of(&claim_id)
            .ok_or(ClaimError::NotFound { claim_id })?;

        if state != LifecycleState::Declared {
            return Err(ClaimError::InvalidState {
                claim_id,
                expected: LifecycleState::Declared,
                actual: state,
            });
        }

        // Structural checks. Any failure here is a malformed bind input: the
        // claim transitions to Rejected per the state machine, and the
        // caller gets InvalidParams.
        if let Some(detail) = Self::malformed_detail(claim_id, &evidence) {
            warn!(claim_id = %claim_id, detail = %detail, "malformed bind input, claim rejected");
            self.set_state(claim_id, LifecycleState::Rejected);
            self.append_trace(
                claim_id,
                TraceEventKind::BindRejected {
                    detail: detail.clone(),
                },
            )?;
            return Err(ClaimError::InvalidParams { reason: detail });
        }

        let response_hash = hex::encode(evidence.response_hash);

        debug!(claim_id = %claim_id, response_hash = %response_hash, "evidence bound");

        if let Some(record) = self.store.get_mut(&claim_id) {
            record.evidence = Some(evidence);
            record.claim.lifecycle_state = LifecycleState::EvidenceBound;
        }

        self.append_trace(claim_id, TraceEventKind::EvidenceBound { response_hash })?;

        Ok(())
    }

    /// Return a description of what is structurally wrong with `evidence`,
    /// or `None` when it is well-formed.
    fn malformed_detail(claim_id: ClaimId, evidence: &Evidence) -> Option<String> {
        if evidence.claim_id != claim_id {
            return Some(format!(
                "evidence claim_id {} does not match claim {}",
                evidence.claim_id, claim_id
            ));
        }
        if evidence.public_key.len() != PUBLIC_KEY_LEN {
            return Some(format!(
                "public key must be {} bytes, got {}",
                PUBLIC_KEY_LEN,
                evidence.public_key.len()
            ));
        }
        if evidence.signature.len() != SIGNATURE_LEN {
            return Some(format!(
                "signature must be {} bytes, got {}",
                SIGNATURE_LEN,
                evidence.signature.len()
            ));
        }
        None
    }

    // ── Verify ───────────────────────────────────────────────────────────────

    /// Run the evidence verifier against an `EvidenceBound` claim.
    ///
    /// The nonce-replay check runs first, against the execution-scoped
    /// consumed-nonce set; every other check is delegated to the pure
    /// verifier. On success the claim transitions to `Verified` and the
    /// payload is captured for `query()`. On failure the claim transitions
    /// to `Rejected`.
    ///
    /// A failed verification is a normal business outcome returned as
    /// `Ok(VerificationResult::Invalid)` — callers must branch on it. Only
    /// lifecycle misuse and trace failures are `Err`.
    pub fn verify(&mut self, claim_id: ClaimId) -> ClaimResult<VerificationResult> {
        let record = self
            .store
            .get(&claim_id)
            .ok_or(ClaimError::NotFound { claim_id })?;

        let state = record.claim.lifecycle_state;
        let evidence = match (state, record.evidence.clone()) {
            (LifecycleState::EvidenceBound, Some(evidence)) => evidence,
            _ => {
                return Err(ClaimError::InvalidState {
                    claim_id,
                    expected: LifecycleState::EvidenceBound,
                    actual: state,
                });
            }
        };
        let claim = record.claim.clone();

        // ── Nonce replay check (controller-scoped state) ─────────────────────
        //
        // The nonce is consumed on first sight, whatever the verifier later
        // says about the rest of the evidence.
        if let Some(nonce) = &evidence.nonce {
            if !self.seen_nonces.insert(nonce.clone()) {
                return self.reject(claim_id, InvalidReason::ReplayedNonce);
            }
        }

        // ── Cryptographic checks (pure, replayable) ──────────────────────────
        match self.verifier.verify(&claim, &evidence, &self.ctx) {
            VerificationResult::Valid { payload } => {
                let payload_hash = hex::encode(Sha256::digest(&payload));

                info!(
                    claim_id = %claim_id,
                    claim_type = %claim.claim_type,
                    payload_hash = %payload_hash,
                    "claim verified"
                );

                if let Some(record) = self.store.get_mut(&claim_id) {
                    record.payload = Some(payload.clone());
                    record.claim.lifecycle_state = LifecycleState::Verified;
                }

                self.append_trace(claim_id, TraceEventKind::Verified { payload_hash })?;

                Ok(VerificationResult::Valid { payload })
            }
            VerificationResult::Invalid { reason } => self.reject(claim_id, reason),
        }
    }

    /// Transition a claim to `Rejected` with the given reason and trace it.
    fn reject(
        &mut self,
        claim_id: ClaimId,
        reason: InvalidReason,
    ) -> ClaimResult<VerificationResult> {
        warn!(claim_id = %claim_id, reason = %reason, "claim rejected");

        self.set_state(claim_id, LifecycleState::Rejected);
        self.append_trace(claim_id, TraceEventKind::Rejected { reason })?;

        Ok(VerificationResult::Invalid { reason })
    }

    // ── Query ────────────────────────────────────────────────────────────────

    /// Hand the verified payload to business logic, exactly once.
    ///
    /// Returns the payload captured at `verify()` time, byte-identical to
    /// what the trace committed to — it is never re-derived or re-fetched.
    /// The claim transitions to `Consumed`.
    ///
    /// # Errors
    ///
    /// `AlreadyConsumed` on a second call, `InvalidState` before
    /// verification, `NotFound` for an unknown claim.
    pub fn query(&mut self, claim_id: ClaimId) -> ClaimResult<Vec<u8>> {
        let record = self
            .store
            .get_mut(&claim_id)
            .ok_or(ClaimError::NotFound { claim_id })?;

        let state = record.claim.lifecycle_state;
        let payload = match (state, record.payload.clone()) {
            (LifecycleState::Verified, Some(payload)) => payload,
            (LifecycleState::Consumed, _) => {
                return Err(ClaimError::AlreadyConsumed { claim_id });
            }
            _ => {
                return Err(ClaimError::InvalidState {
                    claim_id,
                    expected: LifecycleState::Verified,
                    actual: state,
                });
            }
        };
        record.claim.lifecycle_state = LifecycleState::Consumed;

        debug!(claim_id = %claim_id, payload_len = payload.len(), "payload consumed");

        self.append_trace(claim_id, TraceEventKind::PayloadConsumed)?;

        Ok(payload)
    }

    // ── Composed entry point ─────────────────────────────────────────────────

    /// Declare, bind, verify, and query in one call, surfacing the first
    /// failure.
    ///
    /// This is the entry point most callers use. A verification failure is
    /// folded into `ClaimError::VerificationFailed` so a single `?`
    /// propagates it; callers that need to branch on individual check
    /// failures use the step-by-step operations instead.
    pub fn validate_and_query(
        &mut self,
        claim_type: ClaimType,
        source: impl Into<String>,
        query_params: Vec<(String, String)>,
        draft: EvidenceDraft,
    ) -> ClaimResult<Vec<u8>> {
        self.run_claim(claim_type, source, query_params, draft)
            .map(|(_, payload)| payload)
    }

    /// Like [`validate_and_query`](Self::validate_and_query), but also
    /// returns the allocated claim ID so orchestration layers can reference
    /// the claim's transitions on the trace.
    pub fn run_claim(
        &mut self,
        claim_type: ClaimType,
        source: impl Into<String>,
        query_params: Vec<(String, String)>,
        draft: EvidenceDraft,
    ) -> ClaimResult<(ClaimId, Vec<u8>)> {
        let claim_id = self.declare(claim_type, source, query_params)?;
        self.bind_evidence(claim_id, draft.for_claim(claim_id))?;
        match self.verify(claim_id)? {
            VerificationResult::Valid { .. } => {
                let payload = self.query(claim_id)?;
                Ok((claim_id, payload))
            }
            VerificationResult::Invalid { reason } => {
                Err(ClaimError::VerificationFailed { reason })
            }
        }
    }

    // ── Trace plumbing ───────────────────────────────────────────────────────

    /// Seal the trace for this execution.
    ///
    /// Call when the surrounding execution completes. The controller itself
    /// never decides when an execution is over.
    pub fn seal_trace(&self) -> ClaimResult<()> {
        self.trace.finalize(&self.ctx.execution_id.0.to_string())
    }

    fn set_state(&mut self, claim_id: ClaimId, state: LifecycleState) {
        if let Some(record) = self.store.get_mut(&claim_id) {
            record.claim.lifecycle_state = state;
        }
    }

    fn append_trace(&self, claim_id: ClaimId, kind: TraceEventKind) -> ClaimResult<()> {
        self.trace.append(&TraceEvent {
            claim_id,
            logical_time: self.ctx.logical_time,
            kind,
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
