//! Simulated external sources for the tokenization reference runtime.
//!
//! Everything here is hardcoded and fictional. No external system is
//! contacted: these functions play the role of the out-of-band process
//! that, in production, calls the oracle API, queries the governance
//! database, and assembles signed evidence before the contract runs.

use ed25519_dalek::{Signer, SigningKey};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use exoclaim_contracts::{
    error::{ClaimError, ClaimResult},
    evidence::{EvidenceDraft, MerkleProof, ProofNode, Side},
};
use exoclaim_verify::{canonical::signing_bytes, merkle::node_hash};

// ── Source identifiers ────────────────────────────────────────────────────────

/// The price oracle endpoint.
pub const PRICE_ORACLE: &str = "https://oracle.exo/price";

/// The title validator endpoint.
pub const TITLE_VALIDATOR: &str = "https://validator.exo/title";

/// The asset appraiser endpoint.
pub const APPRAISER: &str = "https://appraiser.exo/valuation";

/// The governance vote database.
pub const VOTE_DB: &str = "db://governance/votes";

// ── Signing keys (mock) ───────────────────────────────────────────────────────

/// Deterministic oracle keypair. Test fixture only; never a real anchor.
pub fn oracle_key() -> SigningKey {
    SigningKey::from_bytes(&[21u8; 32])
}

/// Deterministic title-validator keypair.
pub fn validator_key() -> SigningKey {
    SigningKey::from_bytes(&[22u8; 32])
}

/// Deterministic appraiser keypair.
pub fn appraiser_key() -> SigningKey {
    SigningKey::from_bytes(&[23u8; 32])
}

/// Anchor configuration pinning every mock source's key, rendered as the
/// TOML document a host would ship alongside its contract.
pub fn anchor_config_toml() -> String {
    let entry = |source: &str, key: &SigningKey| {
        format!(
            "[[anchor]]\nsource = \"{}\"\npublic_key = \"{}\"\n",
            source,
            hex::encode(key.verifying_key().to_bytes())
        )
    };
    format!(
        "{}\n{}\n{}",
        entry(PRICE_ORACLE, &oracle_key()),
        entry(TITLE_VALIDATOR, &validator_key()),
        entry(APPRAISER, &appraiser_key()),
    )
}

// ── External responses (mock) ─────────────────────────────────────────────────

/// A price oracle response for the given symbol.
pub fn price_response(symbol: &str, price_usd_cents: u64) -> Value {
    json!({
        "symbol": symbol,
        "price_usd_cents": price_usd_cents,
        "oracle": "exo-price-v1"
    })
}

/// A title validator response: whether the asset's title is clear of liens.
pub fn title_response(asset_ref: &str, clear: bool) -> Value {
    json!({
        "asset_ref": asset_ref,
        "title_status": if clear { "clear" } else { "encumbered" },
        "registry": "county-records-mock"
    })
}

/// An appraiser response valuing the asset.
pub fn valuation_response(asset_ref: &str, value_usd: u64) -> Value {
    json!({
        "asset_ref": asset_ref,
        "value_usd": value_usd,
        "method": "comparable-sales"
    })
}

/// A governance vote row as stored in the (mock) vote database.
pub fn vote_row(proposal: &str, voter: &str, choice: &str) -> Vec<u8> {
    format!("{}|{}|{}", proposal, voter, choice).into_bytes()
}

// ── Evidence assembly ─────────────────────────────────────────────────────────

/// Assemble a signed API-response evidence draft.
///
/// Signs the canonical (source, params, payload) encoding with `key`,
/// exactly as the real source's trust anchor would.
pub fn signed_api_draft(
    key: &SigningKey,
    source: &str,
    query_params: &[(String, String)],
    payload: Value,
) -> EvidenceDraft {
    let payload = serde_json::to_vec(&payload).unwrap_or_default();
    let preimage = signing_bytes(source, query_params, &payload);
    let signature = key.sign(&preimage);

    EvidenceDraft {
        public_key: key.verifying_key().to_bytes().to_vec(),
        signature: signature.to_bytes().to_vec(),
        response_hash: Sha256::digest(&payload).into(),
        response_payload: payload,
        integrity_proof: None,
        timestamp: None,
        nonce: None,
    }
}

/// Assemble a database-query evidence draft for `rows[index]`, carrying a
/// Merkle inclusion proof against the tree built over all `rows`.
///
/// The row count must be a power of two (the mock database stores its
/// pages that way); anything else, or an out-of-range index, is an
/// `InvalidParams` error.
pub fn db_draft(rows: &[Vec<u8>], index: usize) -> ClaimResult<EvidenceDraft> {
    if !rows.len().is_power_of_two() {
        return Err(ClaimError::InvalidParams {
            reason: format!("row count {} is not a power of two", rows.len()),
        });
    }
    if index >= rows.len() {
        return Err(ClaimError::InvalidParams {
            reason: format!("row index {} out of range for {} rows", index, rows.len()),
        });
    }

    let leaves: Vec<[u8; 32]> = rows.iter().map(|r| Sha256::digest(r).into()).collect();
    let proof = build_proof(&leaves, index);

    Ok(EvidenceDraft {
        public_key: vec![0u8; 32],
        signature: vec![0u8; 64],
        response_hash: leaves[index],
        response_payload: rows[index].clone(),
        integrity_proof: Some(proof),
        timestamp: None,
        nonce: None,
    })
}

/// Assemble a file-content evidence draft: payload plus its hash.
pub fn file_draft(content: &[u8]) -> EvidenceDraft {
    EvidenceDraft {
        public_key: vec![0u8; 32],
        signature: vec![0u8; 64],
        response_hash: Sha256::digest(content).into(),
        response_payload: content.to_vec(),
        integrity_proof: None,
        timestamp: None,
        nonce: None,
    }
}

/// Build the sibling path for `leaves[index]` over a complete binary tree.
///
/// `leaves.len()` is a power of two and `index` is in range; `db_draft`
/// checks both before calling.
fn build_proof(leaves: &[[u8; 32]], index: usize) -> MerkleProof {
    let mut level: Vec<[u8; 32]> = leaves.to_vec();
    let mut idx = index;
    let mut path = Vec::new();

    while level.len() > 1 {
        let sibling = idx ^ 1;
        let side = if sibling < idx { Side::Left } else { Side::Right };
        path.push(ProofNode {
            hash: level[sibling],
            side,
        });

        level = level
            .chunks(2)
            .map(|pair| node_hash(&pair[0], &pair[1]))
            .collect();
        idx /= 2;
    }

    MerkleProof {
        path,
        expected_root: level[0],
    }
}

#[cfg(test)]
mod tests {
    use sha2::{Digest, Sha256};

    use exoclaim_verify::merkle::verify_inclusion;

    use super::{build_proof, db_draft, vote_row, ClaimError};

    #[test]
    fn built_proofs_verify_for_every_leaf() {
        let rows: Vec<Vec<u8>> = (0..8).map(|i| vote_row("prop-1", &format!("voter-{}", i), "yes")).collect();
        let leaves: Vec<[u8; 32]> = rows.iter().map(|r| Sha256::digest(r).into()).collect();

        for (i, leaf) in leaves.iter().enumerate() {
            let proof = build_proof(&leaves, i);
            assert!(verify_inclusion(leaf, &proof), "leaf {} failed", i);
        }
    }

    #[test]
    fn db_draft_carries_matching_proof() {
        let rows = vec![
            vote_row("prop-1", "alice", "yes"),
            vote_row("prop-1", "bob", "no"),
            vote_row("prop-1", "carol", "yes"),
            vote_row("prop-1", "dave", "yes"),
        ];
        let draft = db_draft(&rows, 2).unwrap();

        assert_eq!(draft.response_payload, rows[2]);
        let proof = draft.integrity_proof.unwrap();
        assert!(verify_inclusion(&draft.response_hash, &proof));
    }

    #[test]
    fn proof_against_wrong_row_fails() {
        let rows = vec![
            vote_row("prop-1", "alice", "yes"),
            vote_row("prop-1", "bob", "no"),
        ];
        let draft = db_draft(&rows, 0).unwrap();
        let proof = draft.integrity_proof.unwrap();

        let other_leaf: [u8; 32] = Sha256::digest(&rows[1]).into();
        assert!(!verify_inclusion(&other_leaf, &proof));
    }

    #[test]
    fn db_draft_rejects_uneven_page() {
        let rows = vec![
            vote_row("prop-1", "alice", "yes"),
            vote_row("prop-1", "bob", "no"),
            vote_row("prop-1", "carol", "yes"),
        ];
        assert!(matches!(
            db_draft(&rows, 0),
            Err(ClaimError::InvalidParams { .. })
        ));
    }

    #[test]
    fn db_draft_rejects_out_of_range_index() {
        let rows = vec![
            vote_row("prop-1", "alice", "yes"),
            vote_row("prop-1", "bob", "no"),
        ];
        assert!(matches!(
            db_draft(&rows, 2),
            Err(ClaimError::InvalidParams { .. })
        ));
    }
}
