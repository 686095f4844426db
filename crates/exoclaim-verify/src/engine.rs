//! The evidence verification rules, one per claim type.
//!
//! `ProtocolVerifier` implements the `EvidenceVerifier` trait from
//! `exoclaim-core`. All checks are pure and total: the same (claim,
//! evidence, context) always yields the same result, in any process, which
//! is what lets a verifying node replay the check from the trace without
//! contacting the original source.
//!
//! Check order, for every claim type:
//!
//! 1. **Freshness** — an evidence timestamp, when present, must fall inside
//!    the execution's freshness window (`Stale` otherwise).
//! 2. **Content hash** — `response_hash` must equal SHA-256 of the payload
//!    (`HashMismatch` otherwise).
//! 3. **Type rule** — matched exhaustively on the closed `ClaimType` enum:
//!    Ed25519 signature for `ApiResponse`, Merkle inclusion for
//!    `DatabaseQuery`, nothing further for `FileContent`.
//!
//! All hash comparisons are constant-time (`subtle`); signature
//! verification is constant-time inside `ed25519-dalek`.

use ed25519_dalek::{Signature, Verifier as _, VerifyingKey};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::debug;

use exoclaim_contracts::{
    claim::{ClaimType, ExternalStateClaim},
    context::ExecutionContext,
    evidence::Evidence,
    verify::{InvalidReason, VerificationResult},
};
use exoclaim_core::traits::EvidenceVerifier;

use crate::{anchors::TrustAnchorRegistry, canonical::signing_bytes, merkle::verify_inclusion};

/// The EXOCLAIM evidence verifier.
///
/// Stateless apart from the optional trust-anchor registry, which is fixed
/// at construction and never mutated during an execution.
#[derive(Debug, Default)]
pub struct ProtocolVerifier {
    anchors: TrustAnchorRegistry,
}

impl ProtocolVerifier {
    /// A verifier that trusts only evidence-carried keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// A verifier whose registered anchors override evidence-carried keys.
    pub fn with_anchors(anchors: TrustAnchorRegistry) -> Self {
        Self { anchors }
    }

    /// Resolve the signing key for a claim's source: a pinned anchor when
    /// one is configured, otherwise the key the evidence carries.
    fn resolve_key(&self, source: &str, evidence: &Evidence) -> Option<[u8; 32]> {
        if let Some(pinned) = self.anchors.key_for(source) {
            return Some(*pinned);
        }
        evidence.public_key.as_slice().try_into().ok()
    }

    fn check_signature(&self, claim: &ExternalStateClaim, evidence: &Evidence) -> bool {
        let Some(key_bytes) = self.resolve_key(&claim.source, evidence) else {
            return false;
        };
        let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(&evidence.signature) else {
            return false;
        };

        let preimage = signing_bytes(
            &claim.source,
            &claim.query_params,
            &evidence.response_payload,
        );
        key.verify(&preimage, &signature).is_ok()
    }
}

impl EvidenceVerifier for ProtocolVerifier {
    fn verify(
        &self,
        claim: &ExternalStateClaim,
        evidence: &Evidence,
        ctx: &ExecutionContext,
    ) -> VerificationResult {
        debug!(
            claim_id = %claim.claim_id,
            claim_type = %claim.claim_type,
            "verifying evidence"
        );

        let invalid = |reason| VerificationResult::Invalid { reason };

        // ── Check 1: freshness ───────────────────────────────────────────────
        if let Some(timestamp) = evidence.timestamp {
            if !ctx.is_fresh(timestamp) {
                return invalid(InvalidReason::Stale);
            }
        }

        // ── Check 2: content hash ────────────────────────────────────────────
        let computed: [u8; 32] = Sha256::digest(&evidence.response_payload).into();
        if !bool::from(computed.ct_eq(&evidence.response_hash)) {
            return invalid(InvalidReason::HashMismatch);
        }

        // ── Check 3: type rule (exhaustive on the closed enum) ───────────────
        match claim.claim_type {
            ClaimType::ApiResponse => {
                if !self.check_signature(claim, evidence) {
                    return invalid(InvalidReason::BadSignature);
                }
            }
            ClaimType::DatabaseQuery => {
                let Some(proof) = &evidence.integrity_proof else {
                    return invalid(InvalidReason::ProofInvalid);
                };
                if !verify_inclusion(&evidence.response_hash, proof) {
                    return invalid(InvalidReason::ProofInvalid);
                }
            }
            ClaimType::FileContent => {
                // The content hash check above is the whole rule.
            }
        }

        VerificationResult::Valid {
            payload: evidence.response_payload.clone(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signer, SigningKey};
    use sha2::{Digest, Sha256};

    use exoclaim_contracts::{
        claim::{ClaimId, ClaimType, ExecutionId, ExternalStateClaim, LifecycleState},
        context::ExecutionContext,
        evidence::{Evidence, MerkleProof, ProofNode, Side},
        verify::{InvalidReason, VerificationResult},
    };
    use exoclaim_core::traits::EvidenceVerifier;

    use crate::{anchors::TrustAnchorRegistry, canonical::signing_bytes, merkle::node_hash};

    use super::ProtocolVerifier;

    // ── Fixtures ─────────────────────────────────────────────────────────────

    /// Deterministic test keypair. Test-only; never a real anchor.
    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    fn make_ctx() -> ExecutionContext {
        ExecutionContext {
            execution_id: ExecutionId::new(),
            caller: "addr-caller".to_string(),
            logical_time: 100,
            freshness_window: 10,
        }
    }

    fn make_claim(claim_type: ClaimType, source: &str) -> ExternalStateClaim {
        ExternalStateClaim {
            claim_id: ClaimId::new(),
            claim_type,
            source: source.to_string(),
            query_params: vec![("symbol".to_string(), "BTC".to_string())],
            declared_at: 100,
            lifecycle_state: LifecycleState::EvidenceBound,
        }
    }

    /// Evidence properly signed by the fixture key over the canonical
    /// encoding of the claim's identity and the payload.
    fn signed_evidence(claim: &ExternalStateClaim, payload: &[u8]) -> Evidence {
        let key = signing_key();
        let preimage = signing_bytes(&claim.source, &claim.query_params, payload);
        let signature = key.sign(&preimage);

        Evidence {
            claim_id: claim.claim_id,
            public_key: key.verifying_key().to_bytes().to_vec(),
            signature: signature.to_bytes().to_vec(),
            response_hash: Sha256::digest(payload).into(),
            response_payload: payload.to_vec(),
            integrity_proof: None,
            timestamp: None,
            nonce: None,
        }
    }

    // ── ApiResponse ──────────────────────────────────────────────────────────

    #[test]
    fn api_response_valid_signature_passes() {
        let verifier = ProtocolVerifier::new();
        let claim = make_claim(ClaimType::ApiResponse, "https://x/price");
        let evidence = signed_evidence(&claim, b"{\"price\":\"42000\"}");

        match verifier.verify(&claim, &evidence, &make_ctx()) {
            VerificationResult::Valid { payload } => {
                assert_eq!(payload, b"{\"price\":\"42000\"}".to_vec());
            }
            other => panic!("expected Valid, got {:?}", other),
        }
    }

    #[test]
    fn api_response_tampered_payload_fails_hash_first() {
        let verifier = ProtocolVerifier::new();
        let claim = make_claim(ClaimType::ApiResponse, "https://x/price");
        let mut evidence = signed_evidence(&claim, b"{\"price\":\"42000\"}");

        // Tamper with the payload after signing: the content-hash check
        // trips before the signature is even examined.
        evidence.response_payload = b"{\"price\":\"99999\"}".to_vec();

        assert_eq!(
            verifier.verify(&claim, &evidence, &make_ctx()),
            VerificationResult::Invalid { reason: InvalidReason::HashMismatch }
        );
    }

    #[test]
    fn api_response_tampered_hash_fails() {
        let verifier = ProtocolVerifier::new();
        let claim = make_claim(ClaimType::ApiResponse, "https://x/price");
        let mut evidence = signed_evidence(&claim, b"{\"price\":\"42000\"}");
        evidence.response_hash[0] ^= 0x01;

        assert_eq!(
            verifier.verify(&claim, &evidence, &make_ctx()),
            VerificationResult::Invalid { reason: InvalidReason::HashMismatch }
        );
    }

    #[test]
    fn api_response_wrong_key_fails_signature() {
        let verifier = ProtocolVerifier::new();
        let claim = make_claim(ClaimType::ApiResponse, "https://x/price");
        let mut evidence = signed_evidence(&claim, b"{\"price\":\"42000\"}");

        // Swap in a different (valid) public key: hash still matches, but
        // the signature no longer verifies.
        let other = SigningKey::from_bytes(&[9u8; 32]);
        evidence.public_key = other.verifying_key().to_bytes().to_vec();

        assert_eq!(
            verifier.verify(&claim, &evidence, &make_ctx()),
            VerificationResult::Invalid { reason: InvalidReason::BadSignature }
        );
    }

    #[test]
    fn api_response_signature_over_different_params_fails() {
        let verifier = ProtocolVerifier::new();
        let mut claim = make_claim(ClaimType::ApiResponse, "https://x/price");
        let evidence = signed_evidence(&claim, b"{\"price\":\"42000\"}");

        // The evidence attests to {"symbol": "BTC"}; the claim now asks for
        // something else, so the canonical preimage differs.
        claim.query_params = vec![("symbol".to_string(), "ETH".to_string())];

        assert_eq!(
            verifier.verify(&claim, &evidence, &make_ctx()),
            VerificationResult::Invalid { reason: InvalidReason::BadSignature }
        );
    }

    // ── Trust anchors ────────────────────────────────────────────────────────

    /// A pinned anchor overrides the evidence-carried key: evidence signed
    /// by an imposter key fails even though it carries that imposter key.
    #[test]
    fn pinned_anchor_overrides_evidence_key() {
        let genuine = signing_key();
        let mut anchors = TrustAnchorRegistry::new();
        anchors.pin("https://x/price", genuine.verifying_key().to_bytes());
        let verifier = ProtocolVerifier::with_anchors(anchors);

        let claim = make_claim(ClaimType::ApiResponse, "https://x/price");

        // Imposter signs consistently with its own key.
        let imposter = SigningKey::from_bytes(&[11u8; 32]);
        let payload = b"{\"price\":\"1\"}";
        let preimage = signing_bytes(&claim.source, &claim.query_params, payload);
        let evidence = Evidence {
            claim_id: claim.claim_id,
            public_key: imposter.verifying_key().to_bytes().to_vec(),
            signature: imposter.sign(&preimage).to_bytes().to_vec(),
            response_hash: Sha256::digest(payload).into(),
            response_payload: payload.to_vec(),
            integrity_proof: None,
            timestamp: None,
            nonce: None,
        };

        assert_eq!(
            verifier.verify(&claim, &evidence, &make_ctx()),
            VerificationResult::Invalid { reason: InvalidReason::BadSignature }
        );

        // The same evidence signed by the genuine anchor passes.
        let evidence = signed_evidence(&claim, b"{\"price\":\"42000\"}");
        assert!(verifier.verify(&claim, &evidence, &make_ctx()).is_valid());
    }

    // ── DatabaseQuery ────────────────────────────────────────────────────────

    fn db_evidence_with_proof(claim: &ExternalStateClaim, payload: &[u8]) -> Evidence {
        let mut evidence = signed_evidence(claim, payload);

        // Two-leaf tree: response_hash plus one sibling.
        let sibling: [u8; 32] = Sha256::digest(b"other-row").into();
        let root = node_hash(&evidence.response_hash, &sibling);
        evidence.integrity_proof = Some(MerkleProof {
            path: vec![ProofNode { hash: sibling, side: Side::Right }],
            expected_root: root,
        });
        evidence
    }

    #[test]
    fn database_query_valid_proof_passes() {
        let verifier = ProtocolVerifier::new();
        let claim = make_claim(ClaimType::DatabaseQuery, "db://accounts");
        let evidence = db_evidence_with_proof(&claim, b"row:alice:100");

        assert!(verifier.verify(&claim, &evidence, &make_ctx()).is_valid());
    }

    #[test]
    fn database_query_missing_proof_fails() {
        let verifier = ProtocolVerifier::new();
        let claim = make_claim(ClaimType::DatabaseQuery, "db://accounts");
        let evidence = signed_evidence(&claim, b"row:alice:100"); // no proof

        assert_eq!(
            verifier.verify(&claim, &evidence, &make_ctx()),
            VerificationResult::Invalid { reason: InvalidReason::ProofInvalid }
        );
    }

    #[test]
    fn database_query_wrong_root_fails() {
        let verifier = ProtocolVerifier::new();
        let claim = make_claim(ClaimType::DatabaseQuery, "db://accounts");
        let mut evidence = db_evidence_with_proof(&claim, b"row:alice:100");
        if let Some(proof) = &mut evidence.integrity_proof {
            proof.expected_root[0] ^= 0x01;
        }

        assert_eq!(
            verifier.verify(&claim, &evidence, &make_ctx()),
            VerificationResult::Invalid { reason: InvalidReason::ProofInvalid }
        );
    }

    // ── FileContent ──────────────────────────────────────────────────────────

    #[test]
    fn file_content_hash_match_passes() {
        let verifier = ProtocolVerifier::new();
        let claim = make_claim(ClaimType::FileContent, "file://ledger.csv");
        let evidence = signed_evidence(&claim, b"a,b,c\n1,2,3\n");

        assert!(verifier.verify(&claim, &evidence, &make_ctx()).is_valid());
    }

    #[test]
    fn file_content_hash_mismatch_fails() {
        let verifier = ProtocolVerifier::new();
        let claim = make_claim(ClaimType::FileContent, "file://ledger.csv");
        let mut evidence = signed_evidence(&claim, b"a,b,c\n1,2,3\n");
        evidence.response_hash = Sha256::digest(b"different bytes").into();

        assert_eq!(
            verifier.verify(&claim, &evidence, &make_ctx()),
            VerificationResult::Invalid { reason: InvalidReason::HashMismatch }
        );
    }

    // ── Freshness ────────────────────────────────────────────────────────────

    #[test]
    fn stale_timestamp_fails_before_other_checks() {
        let verifier = ProtocolVerifier::new();
        let claim = make_claim(ClaimType::FileContent, "file://ledger.csv");
        let mut evidence = signed_evidence(&claim, b"content");
        evidence.timestamp = Some(50); // window is [90, 100]

        assert_eq!(
            verifier.verify(&claim, &evidence, &make_ctx()),
            VerificationResult::Invalid { reason: InvalidReason::Stale }
        );
    }

    #[test]
    fn fresh_timestamp_passes() {
        let verifier = ProtocolVerifier::new();
        let claim = make_claim(ClaimType::FileContent, "file://ledger.csv");
        let mut evidence = signed_evidence(&claim, b"content");
        evidence.timestamp = Some(95);

        assert!(verifier.verify(&claim, &evidence, &make_ctx()).is_valid());
    }

    // ── Replay determinism ───────────────────────────────────────────────────

    /// Verification is a pure function: the same (claim, evidence, context)
    /// yields the same result on repeated calls and on a second verifier
    /// instance.
    #[test]
    fn verification_is_deterministic() {
        let claim = make_claim(ClaimType::ApiResponse, "https://x/price");
        let evidence = signed_evidence(&claim, b"{\"price\":\"42000\"}");
        let ctx = make_ctx();

        let first = ProtocolVerifier::new().verify(&claim, &evidence, &ctx);
        let second = ProtocolVerifier::new().verify(&claim, &evidence, &ctx);
        assert_eq!(first, second);

        let mut tampered = evidence.clone();
        tampered.response_hash[0] ^= 0x01;
        let first = ProtocolVerifier::new().verify(&claim, &tampered, &ctx);
        let second = ProtocolVerifier::new().verify(&claim, &tampered, &ctx);
        assert_eq!(first, second);
    }
}
