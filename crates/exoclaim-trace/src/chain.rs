//! Link digests and chain verification.
//!
//! Every link digest commits to a canonical binary encoding of the link's
//! content. Variable-width fields are length-delimited and enum variants
//! carry tag bytes, so no two distinct links share a preimage. JSON never
//! enters the hash: the export format of a sealed log can evolve without
//! invalidating digests recorded under earlier versions.
//!
//! Digest preimage, in order:
//!
//! 1. domain tag `XCLM_LINK_V1`
//! 2. u64-BE length of the execution id, then its UTF-8 bytes
//! 3. the link's sequence number as u64-BE
//! 4. the previous link's digest (32 bytes; all zeroes at genesis)
//! 5. the event encoding: claim id (16 bytes), logical time (u64-BE), a
//!    kind tag byte, then kind-specific fields, length-delimited

use sha2::{Digest, Sha256};

use exoclaim_contracts::{
    claim::ClaimType,
    trace::{TraceEvent, TraceEventKind},
    verify::InvalidReason,
};

use crate::link::{TraceLink, GENESIS_DIGEST};

/// Domain prefix for link digests. Distinct from the signing and Merkle
/// domains so a digest from one context can never validate in another.
const DOMAIN_LINK: &[u8] = b"XCLM_LINK_V1";

/// Compute the digest of one trace link.
pub fn link_digest(
    execution_id: &str,
    sequence: u64,
    prev_digest: &[u8; 32],
    event: &TraceEvent,
) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN_LINK);
    hasher.update((execution_id.len() as u64).to_be_bytes());
    hasher.update(execution_id.as_bytes());
    hasher.update(sequence.to_be_bytes());
    hasher.update(prev_digest);
    hasher.update(event_bytes(event));
    hasher.finalize().into()
}

/// Canonical binary encoding of a trace event.
///
/// Claim id and logical time are fixed-width; each kind gets a distinct
/// tag byte; string fields are length-delimited so field boundaries are
/// unambiguous.
fn event_bytes(event: &TraceEvent) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(event.claim_id.0.as_bytes());
    out.extend_from_slice(&event.logical_time.to_be_bytes());

    match &event.kind {
        TraceEventKind::ClaimDeclared { claim_type, source } => {
            out.push(0x01);
            out.push(claim_type_tag(*claim_type));
            push_delimited(&mut out, source.as_bytes());
        }
        TraceEventKind::EvidenceBound { response_hash } => {
            out.push(0x02);
            push_delimited(&mut out, response_hash.as_bytes());
        }
        TraceEventKind::Verified { payload_hash } => {
            out.push(0x03);
            push_delimited(&mut out, payload_hash.as_bytes());
        }
        TraceEventKind::BindRejected { detail } => {
            out.push(0x04);
            push_delimited(&mut out, detail.as_bytes());
        }
        TraceEventKind::Rejected { reason } => {
            out.push(0x05);
            out.push(reason_tag(*reason));
        }
        TraceEventKind::PayloadConsumed => {
            out.push(0x06);
        }
    }

    out
}

fn claim_type_tag(claim_type: ClaimType) -> u8 {
    match claim_type {
        ClaimType::ApiResponse => 0x01,
        ClaimType::DatabaseQuery => 0x02,
        ClaimType::FileContent => 0x03,
    }
}

fn reason_tag(reason: InvalidReason) -> u8 {
    match reason {
        InvalidReason::BadSignature => 0x01,
        InvalidReason::HashMismatch => 0x02,
        InvalidReason::ProofInvalid => 0x03,
        InvalidReason::Stale => 0x04,
        InvalidReason::ReplayedNonce => 0x05,
    }
}

fn push_delimited(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
    out.extend_from_slice(bytes);
}

/// Verify a chain against the execution it claims to record.
///
/// Three rules, each checked for every link:
///
/// 1. `sequence` equals the link's position in the slice.
/// 2. `prev_digest` equals the previous link's `this_digest`
///    ([`GENESIS_DIGEST`] for the first link).
/// 3. `this_digest` recomputes from the link's own content.
///
/// An empty chain is valid.
pub fn verify_chain(execution_id: &str, links: &[TraceLink]) -> bool {
    let mut prev = GENESIS_DIGEST;

    for (position, link) in links.iter().enumerate() {
        if link.sequence != position as u64 || link.prev_digest != prev {
            return false;
        }

        let recomputed = link_digest(execution_id, link.sequence, &link.prev_digest, &link.event);
        if link.this_digest != recomputed {
            return false;
        }

        prev = link.this_digest;
    }

    true
}

// ── Tests ─────────────────────────────────────────────────────────────────────
