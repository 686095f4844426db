//! # exoclaim-ref-tokenization
//!
//! Asset tokenization reference runtime for the EXOCLAIM controlled
//! external claim protocol.
//!
//! Demonstrates three on-chain scenarios using mock external sources:
//!
//! 1. **Asset Tokenization** — a two-claim bundle (title check + appraisal)
//!    gating a token mint, with a tampered-evidence run showing the mint
//!    never fires.
//! 2. **Oracle Price Feed** — a single signed oracle quote recorded under a
//!    structured state key, with nonce-replay and staleness rejections.
//! 3. **Threshold Governance Vote** — independent Merkle-proved vote claims
//!    combined with a tally recorded by a previous execution.
//!
//! All data is hardcoded and fictional. No external calls are made.

pub mod fixtures;
pub mod ledger;
pub mod scenarios;

#[cfg(test)]
mod tests {
    use crate::scenarios;

    // Each scenario is deterministic end to end; running it is the
    // integration test.

    #[test]
    fn tokenize_asset_scenario_runs() {
        scenarios::tokenize_asset::run_scenario().unwrap();
    }

    #[test]
    fn price_feed_scenario_runs() {
        scenarios::price_feed::run_scenario().unwrap();
    }

    #[test]
    fn threshold_vote_scenario_runs() {
        scenarios::threshold_vote::run_scenario().unwrap();
    }
}
