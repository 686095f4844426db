//! Evidence types: the cryptographic material justifying one claim.
//!
//! Evidence is assembled entirely outside the execution sandbox — whatever
//! process actually called the API, queried the database, or read the file
//! produces these bytes before `bind_evidence()` is invoked. The protocol
//! never performs the fetch itself.

use serde::{Deserialize, Serialize};

use crate::claim::ClaimId;

/// Cryptographic attestation bound to exactly one claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    /// The claim this evidence attests to. Must match the claim it is bound
    /// to; a mismatch is rejected at bind time.
    pub claim_id: ClaimId,
    /// Ed25519 public key of the source's trust anchor (32 bytes).
    ///
    /// Used only when the verifier has no registered anchor for the claim's
    /// source — a registered anchor always takes precedence.
    pub public_key: Vec<u8>,
    /// Ed25519 signature (64 bytes) over the canonical encoding of
    /// (source, query_params, response_payload).
    pub signature: Vec<u8>,
    /// The raw external response. Opaque bytes; internal structure (JSON,
    /// protobuf, …) is the business layer's concern.
    pub response_payload: Vec<u8>,
    /// SHA-256 of `response_payload`.
    pub response_hash: [u8; 32],
    /// Merkle inclusion proof. Required for `ClaimType::DatabaseQuery`,
    /// ignored otherwise.
    pub integrity_proof: Option<MerkleProof>,
    /// Optional anti-replay logical timestamp. When present it must fall
    /// inside the execution's freshness window.
    pub timestamp: Option<u64>,
    /// Optional anti-replay nonce. When present it must be unique among all
    /// evidence verified within one execution.
    pub nonce: Option<Vec<u8>>,
}

/// Evidence as assembled out-of-band, before a claim ID exists.
///
/// Claim IDs are controller-generated at declaration, so the process that
/// fetches external data and signs it cannot know the ID in advance. It
/// produces a draft; the composed entry points stamp the freshly allocated
/// ID onto it at bind time. The signature covers (source, query_params,
/// payload), never the claim ID, so stamping does not invalidate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceDraft {
    /// See [`Evidence::public_key`].
    pub public_key: Vec<u8>,
    /// See [`Evidence::signature`].
    pub signature: Vec<u8>,
    /// See [`Evidence::response_payload`].
    pub response_payload: Vec<u8>,
    /// See [`Evidence::response_hash`].
    pub response_hash: [u8; 32],
    /// See [`Evidence::integrity_proof`].
    pub integrity_proof: Option<MerkleProof>,
    /// See [`Evidence::timestamp`].
    pub timestamp: Option<u64>,
    /// See [`Evidence::nonce`].
    pub nonce: Option<Vec<u8>>,
}

impl EvidenceDraft {
    /// Stamp this draft with the claim it is being bound to.
    pub fn for_claim(self, claim_id: ClaimId) -> Evidence {
        Evidence {
            claim_id,
            public_key: self.public_key,
            signature: self.signature,
            response_payload: self.response_payload,
            response_hash: self.response_hash,
            integrity_proof: self.integrity_proof,
            timestamp: self.timestamp,
            nonce: self.nonce,
        }
    }
}

/// A Merkle inclusion proof: the sibling path from a leaf to an expected
/// root.
///
/// The leaf is the evidence's `response_hash`; the verifier folds the path
/// bottom-up with domain-separated node hashing and compares the result to
/// `expected_root` in constant time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Sibling hashes from leaf level to just below the root.
    pub path: Vec<ProofNode>,
    /// The root this proof must fold to. Supplied with the evidence (or
    /// copied from claim context by the evidence assembler).
    pub expected_root: [u8; 32],
}

/// One step of a Merkle path: the sibling hash and which side it sits on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofNode {
    /// The sibling subtree hash.
    pub hash: [u8; 32],
    /// Whether the sibling is the left or right child at this level.
    pub side: Side,
}

/// Position of a Merkle sibling relative to the running hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    Left,
    Right,
}
