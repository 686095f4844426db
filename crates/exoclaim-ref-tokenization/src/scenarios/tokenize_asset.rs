//! Scenario 1: Asset Tokenization
//!
//! Demonstrates a two-claim bundle driving a single irreversible ledger
//! effect. A contract mints fractional ownership tokens for a real-world
//! asset only after two independent external facts are verified:
//!
//!   1. The title validator attests the asset's title is clear of liens.
//!   2. The appraiser attests the asset's market valuation.
//!
//! Pipeline walk-through for the demo run:
//!   1. Trust anchors loaded from TOML (validator + appraiser keys pinned)
//!   2. Bundle step "validate-title"  → claim declared, evidence bound, verified
//!   3. Bundle step "value-asset"     → same, carrying the valuation payload
//!   4. Mint runs only after the bundle returns Ok
//!   5. A second run with tampered valuation evidence aborts before the mint
//!   6. Trace chain integrity verified at the end

use std::sync::Arc;

use exoclaim_bundle::{run_bundle, BundleStep};
use exoclaim_contracts::{
    claim::{ClaimType, ExecutionId, StateKey, StateKeyKind},
    context::ExecutionContext,
    error::{ClaimError, ClaimResult},
};
use exoclaim_core::{traits::Ledger, ClaimController};
use exoclaim_trace::InMemoryTraceRecorder;
use exoclaim_verify::{ProtocolVerifier, TrustAnchorRegistry};

use crate::fixtures::{
    anchor_config_toml, appraiser_key, signed_api_draft, title_response, validator_key,
    valuation_response, APPRAISER, TITLE_VALIDATOR,
};
use crate::ledger::InMemoryLedger;
use crate::scenarios::SharedTrace;

const ASSET_REF: &str = "deed-4471";
const OWNER: &str = "addr-owner-1";
const TOKEN_ID: &str = "EXO-DEED-4471";

/// Build the two bundle steps for tokenizing `ASSET_REF`.
///
/// `valuation_usd` parameterizes the appraiser's answer so the failing run
/// can tamper with it after signing.
fn tokenization_steps(valuation_usd: u64) -> Vec<BundleStep> {
    let title_params = vec![("asset_ref".to_string(), ASSET_REF.to_string())];
    let value_params = vec![("asset_ref".to_string(), ASSET_REF.to_string())];

    vec![
        BundleStep {
            label: "validate-title".to_string(),
            claim_type: ClaimType::ApiResponse,
            source: TITLE_VALIDATOR.to_string(),
            query_params: title_params.clone(),
            evidence: signed_api_draft(
                &validator_key(),
                TITLE_VALIDATOR,
                &title_params,
                title_response(ASSET_REF, true),
            ),
        },
        BundleStep {
            label: "value-asset".to_string(),
            claim_type: ClaimType::ApiResponse,
            source: APPRAISER.to_string(),
            query_params: value_params.clone(),
            evidence: signed_api_draft(
                &appraiser_key(),
                APPRAISER,
                &value_params,
                valuation_response(ASSET_REF, valuation_usd),
            ),
        },
    ]
}

fn new_controller(trace: Arc<InMemoryTraceRecorder>) -> ClaimResult<ClaimController> {
    let anchors = TrustAnchorRegistry::from_toml_str(&anchor_config_toml())?;
    let ctx = ExecutionContext {
        execution_id: ExecutionId::new(),
        caller: OWNER.to_string(),
        logical_time: 1000,
        freshness_window: 50,
    };
    Ok(ClaimController::new(
        ctx,
        Box::new(ProtocolVerifier::with_anchors(anchors)),
        Box::new(SharedTrace(trace)),
    ))
}

/// Run the tokenization bundle and, only on success, mint shares and
/// record the asset state.
///
/// Returns the number of shares minted (one per $1000 of appraised
/// value). On any bundle failure the error propagates before the ledger
/// is touched.
fn tokenize(
    controller: &mut ClaimController,
    ledger: &InMemoryLedger,
    steps: Vec<BundleStep>,
) -> ClaimResult<u64> {
    let result = run_bundle(controller, steps)?;

    let valuation: serde_json::Value =
        serde_json::from_slice(result.payload("value-asset").unwrap_or_default())
            .unwrap_or_default();
    let value_usd = valuation["value_usd"].as_u64().unwrap_or(0);

    // The irreversible effect, strictly after the bundle succeeded.
    let shares = value_usd / 1000;
    ledger.mint(OWNER, TOKEN_ID, shares)?;

    let asset_key = StateKey::new(StateKeyKind::AssetToken, uuid::Uuid::new_v4(), 0);
    let payload_hash: [u8; 32] = {
        use sha2::{Digest, Sha256};
        Sha256::digest(result.payload("value-asset").unwrap_or_default()).into()
    };
    ledger.record_state(&asset_key, value_usd, &payload_hash)?;

    Ok(shares)
}

/// Run Scenario 1: Asset Tokenization.
///
/// The successful run mints one token per $1000 of appraised value. The
/// failing run tampers with the valuation payload after signing and shows
/// the ledger untouched afterwards. A tampered bundle slipping through is
/// an error, not a printout.
pub fn run_scenario() -> ClaimResult<()> {
    println!("=== Scenario 1: Asset Tokenization ===");
    println!();

    // ── Successful run ────────────────────────────────────────────────────────

    let trace = Arc::new(InMemoryTraceRecorder::new("tokenize-asset-ok"));
    let mut controller = new_controller(Arc::clone(&trace))?;
    let ledger = InMemoryLedger::new();

    println!("  Asset:  {} (owner {})", ASSET_REF, OWNER);
    println!("  Claims: validate-title ({}), value-asset ({})", TITLE_VALIDATOR, APPRAISER);
    println!();

    let shares = tokenize(&mut controller, &ledger, tokenization_steps(500_000))?;

    controller.seal_trace()?;

    println!("  Title status:        clear (verified)");
    println!("  Minted:              {} {} -> {}", shares, TOKEN_ID, OWNER);
    println!("  Owner balance:       {}", ledger.query_balance(OWNER, TOKEN_ID));
    println!(
        "  Trace integrity:     {} ({} link(s) in chain)",
        if trace.verify_integrity() { "VERIFIED" } else { "FAILED" },
        trace.export_log().links.len()
    );
    println!();

    // ── Failing run: tampered valuation ──────────────────────────────────────

    let trace = Arc::new(InMemoryTraceRecorder::new("tokenize-asset-tampered"));
    let mut controller = new_controller(Arc::clone(&trace))?;
    let ledger = InMemoryLedger::new();

    let mut steps = tokenization_steps(500_000);
    // Inflate the appraisal after the appraiser signed: hash and signature
    // both cover the original payload, so verification must fail.
    steps[1].evidence.response_payload =
        serde_json::to_vec(&valuation_response(ASSET_REF, 9_000_000)).unwrap_or_default();

    println!("  Tampered run: valuation inflated to $9,000,000 after signing");
    match tokenize(&mut controller, &ledger, steps) {
        Ok(_) => {
            return Err(ClaimError::InvalidParams {
                reason: "tampered valuation evidence passed verification".to_string(),
            })
        }
        Err(e) => println!("  Bundle aborted:      {}", e),
    }

    println!("  Owner balance:       {} (mint never ran)", ledger.query_balance(OWNER, TOKEN_ID));
    println!("  Recorded entries:    {}", ledger.recorded_count());
    println!(
        "  Trace integrity:     {} ({} link(s) in chain)",
        if trace.verify_integrity() { "VERIFIED" } else { "FAILED" },
        trace.export_log().links.len()
    );
    println!();
    println!("  Scenario 1 complete.");
    println!();

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use exoclaim_contracts::verify::InvalidReason;

    use super::*;

    #[test]
    fn tokenization_mints_after_verified_bundle() {
        let trace = Arc::new(InMemoryTraceRecorder::new("tokenize-mint"));
        let mut controller = new_controller(Arc::clone(&trace)).unwrap();
        let ledger = InMemoryLedger::new();

        let shares = tokenize(&mut controller, &ledger, tokenization_steps(500_000)).unwrap();

        assert_eq!(shares, 500);
        assert_eq!(ledger.query_balance(OWNER, TOKEN_ID), 500);
        assert_eq!(ledger.recorded_count(), 1);
        assert!(trace.verify_integrity());
    }

    #[test]
    fn aborted_bundle_leaves_the_ledger_untouched() {
        let trace = Arc::new(InMemoryTraceRecorder::new("tokenize-aborted"));
        let mut controller = new_controller(Arc::clone(&trace)).unwrap();
        let ledger = InMemoryLedger::new();

        let mut steps = tokenization_steps(500_000);
        steps[1].evidence.response_payload =
            serde_json::to_vec(&valuation_response(ASSET_REF, 9_000_000)).unwrap();

        let outcome = tokenize(&mut controller, &ledger, steps);

        assert!(matches!(
            outcome,
            Err(ClaimError::VerificationFailed {
                reason: InvalidReason::HashMismatch
            })
        ));
        assert_eq!(
            ledger.query_balance(OWNER, TOKEN_ID),
            0,
            "no shares may exist after an aborted bundle"
        );
        assert_eq!(
            ledger.recorded_count(),
            0,
            "no state may be recorded after an aborted bundle"
        );
    }
}
