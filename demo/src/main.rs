//! EXOCLAIM Tokenization Reference Runtime — Demo CLI
//!
//! Runs one or all of the three tokenization demo scenarios.  Each scenario
//! uses real EXOCLAIM components (controller, protocol verifier, trace
//! recorder, ledger) wired together with mock external sources.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- tokenize-asset
//!   cargo run -p demo -- price-feed
//!   cargo run -p demo -- threshold-vote

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exoclaim_ref_tokenization::scenarios::{price_feed, threshold_vote, tokenize_asset};

// ── CLI definition ────────────────────────────────────────────────────────────

/// EXOCLAIM — Controlled external claim protocol tokenization demo.
///
/// Each subcommand runs one or all of the three on-chain scenarios,
/// demonstrating claim declaration, evidence verification, one-shot payload
/// consumption, and trace chain integrity.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "EXOCLAIM tokenization reference runtime demo",
    long_about = "Runs EXOCLAIM tokenization demo scenarios showing claim lifecycle\n\
                  enforcement, cryptographic evidence verification, anti-replay\n\
                  defenses, and trace chain integrity."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three tokenization scenarios in sequence.
    RunAll,
    /// Scenario 1: Asset Tokenization (two-claim bundle gating a mint).
    TokenizeAsset,
    /// Scenario 2: Oracle Price Feed (nonce-replay and staleness rejections).
    PriceFeed,
    /// Scenario 3: Threshold Governance Vote (Merkle-proved vote claims).
    ThresholdVote,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::TokenizeAsset => tokenize_asset::run_scenario(),
        Command::PriceFeed => price_feed::run_scenario(),
        Command::ThresholdVote => threshold_vote::run_scenario(),
    };

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run_all() -> exoclaim_contracts::error::ClaimResult<()> {
    tokenize_asset::run_scenario()?;
    price_feed::run_scenario()?;
    threshold_vote::run_scenario()?;
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("EXOCLAIM — Controlled External Claim Protocol");
    println!("Tokenization Reference Demo");
    println!("=============================================");
    println!();
    println!("Claim lifecycle per external fact:");
    println!("  [1] declare() allocates a claim ID and records intent on the trace");
    println!("  [2] bind_evidence() attaches out-of-band cryptographic evidence");
    println!("  [3] verify() replays pure checks: freshness, content hash, type rule");
    println!("  [4] query() releases the verified payload exactly once");
    println!("  [5] Every transition appended to the SHA-256 trace chain");
    println!();
}
