//! Merkle inclusion-proof verification.
//!
//! Database-backed evidence carries a sibling path from the response hash
//! (the leaf) up to a root the evidence assembler obtained out-of-band.
//! Node hashing is domain-separated from leaf content so a leaf can never
//! be confused with an internal node.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use exoclaim_contracts::evidence::{MerkleProof, Side};

/// Domain prefix for internal Merkle nodes.
const DOMAIN_NODE: &[u8] = b"XCLM_NODE_V1";

/// Hash two child hashes into their parent node.
///
/// `node = SHA256(XCLM_NODE_V1 ‖ left ‖ right)`
pub fn node_hash(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_NODE);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Fold a sibling path from `leaf` up to a root candidate.
pub fn fold_path(leaf: &[u8; 32], proof: &MerkleProof) -> [u8; 32] {
    let mut current = *leaf;
    for node in &proof.path {
        current = match node.side {
            Side::Left => node_hash(&node.hash, &current),
            Side::Right => node_hash(&current, &node.hash),
        };
    }
    current
}

/// True when `proof` places `leaf` under its expected root.
///
/// The root comparison is constant-time: the verifier runs inside contract
/// execution that an adversarial caller may probe with near-valid evidence,
/// and comparison timing must not leak how close a forgery got.
pub fn verify_inclusion(leaf: &[u8; 32], proof: &MerkleProof) -> bool {
    let folded = fold_path(leaf, proof);
    folded.ct_eq(&proof.expected_root).into()
}
