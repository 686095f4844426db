//! Scenario 2: Oracle Price Feed
//!
//! Demonstrates a single API-response claim feeding a recorded ledger
//! state entry, plus the two anti-replay defenses:
//!
//!   1. A fresh, nonce-carrying price quote verifies and its value is
//!      recorded under a structured state key.
//!   2. The same evidence presented again is rejected for nonce reuse —
//!      the nonce was consumed the first time it was seen.
//!   3. A quote whose timestamp falls outside the freshness window is
//!      rejected as stale.

use std::sync::Arc;

use exoclaim_contracts::{
    claim::{ClaimType, ExecutionId, StateKey, StateKeyKind},
    context::ExecutionContext,
    error::{ClaimError, ClaimResult},
    evidence::EvidenceDraft,
};
use exoclaim_core::{traits::Ledger, ClaimController};
use exoclaim_trace::InMemoryTraceRecorder;
use exoclaim_verify::{ProtocolVerifier, TrustAnchorRegistry};

use crate::fixtures::{anchor_config_toml, oracle_key, price_response, signed_api_draft, PRICE_ORACLE};
use crate::ledger::InMemoryLedger;
use crate::scenarios::SharedTrace;

const SYMBOL: &str = "EXO";
const LOGICAL_TIME: u64 = 2000;

/// A signed oracle quote carrying a nonce and timestamp.
fn quote_draft(price_usd_cents: u64, nonce: &[u8], timestamp: u64) -> EvidenceDraft {
    let params = vec![("symbol".to_string(), SYMBOL.to_string())];
    let mut draft = signed_api_draft(
        &oracle_key(),
        PRICE_ORACLE,
        &params,
        price_response(SYMBOL, price_usd_cents),
    );
    draft.nonce = Some(nonce.to_vec());
    draft.timestamp = Some(timestamp);
    draft
}

fn feed_params() -> Vec<(String, String)> {
    vec![("symbol".to_string(), SYMBOL.to_string())]
}

/// Run Scenario 2: Oracle Price Feed.
pub fn run_scenario() -> ClaimResult<()> {
    println!("=== Scenario 2: Oracle Price Feed ===");
    println!();

    let anchors = TrustAnchorRegistry::from_toml_str(&anchor_config_toml())?;
    let ctx = ExecutionContext {
        execution_id: ExecutionId::new(),
        caller: "addr-feed-keeper".to_string(),
        logical_time: LOGICAL_TIME,
        freshness_window: 25,
    };
    let trace = Arc::new(InMemoryTraceRecorder::new("price-feed"));
    let mut controller = ClaimController::new(
        ctx,
        Box::new(ProtocolVerifier::with_anchors(anchors)),
        Box::new(SharedTrace(Arc::clone(&trace))),
    );
    let ledger = InMemoryLedger::new();

    // ── Fresh quote verifies and is recorded ──────────────────────────────────

    let draft = quote_draft(4217, b"quote-0001", LOGICAL_TIME - 3);
    let (claim_id, payload) = controller.run_claim(
        ClaimType::ApiResponse,
        PRICE_ORACLE.to_string(),
        feed_params(),
        draft,
    )?;

    let quote: serde_json::Value = serde_json::from_slice(&payload).unwrap_or_default();
    let price = quote["price_usd_cents"].as_u64().unwrap_or(0);

    let key = StateKey::new(StateKeyKind::ClaimOutcome, claim_id.0, LOGICAL_TIME);
    let payload_hash: [u8; 32] = {
        use sha2::{Digest, Sha256};
        Sha256::digest(&payload).into()
    };
    ledger.record_state(&key, price, &payload_hash)?;

    println!("  Quote:               {} = {} USD cents (claim {})", SYMBOL, price, claim_id);
    println!("  Recorded under key:  {}", key);
    println!();

    // ── Replayed nonce rejected ───────────────────────────────────────────────

    let replay = quote_draft(4217, b"quote-0001", LOGICAL_TIME - 2);
    match controller.run_claim(
        ClaimType::ApiResponse,
        PRICE_ORACLE.to_string(),
        feed_params(),
        replay,
    ) {
        Err(ClaimError::VerificationFailed { reason }) => {
            println!("  Replay attempt:      rejected ({})", reason);
        }
        Ok(_) => {
            return Err(ClaimError::InvalidParams {
                reason: "replayed quote nonce was accepted".to_string(),
            })
        }
        Err(other) => return Err(other),
    }
    println!();

    // ── Stale quote rejected ──────────────────────────────────────────────────

    let stale = quote_draft(4190, b"quote-0002", LOGICAL_TIME - 100);
    match controller.run_claim(
        ClaimType::ApiResponse,
        PRICE_ORACLE.to_string(),
        feed_params(),
        stale,
    ) {
        Err(ClaimError::VerificationFailed { reason }) => {
            println!("  Stale quote:         rejected ({})", reason);
        }
        Ok(_) => {
            return Err(ClaimError::InvalidParams {
                reason: "stale quote was accepted".to_string(),
            })
        }
        Err(other) => return Err(other),
    }

    controller.seal_trace()?;

    println!();
    println!("  Recorded entries:    {}", ledger.recorded_count());
    println!(
        "  Trace integrity:     {} ({} link(s) in chain)",
        if trace.verify_integrity() { "VERIFIED" } else { "FAILED" },
        trace.export_log().links.len()
    );
    println!();
    println!("  Scenario 2 complete.");
    println!();

    Ok(())
}
