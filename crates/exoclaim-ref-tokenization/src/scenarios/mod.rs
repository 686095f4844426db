//! Tokenization reference runtime demo scenarios.
//!
//! Each scenario is a self-contained module that wires up real EXOCLAIM
//! components (controller, protocol verifier, trace recorder, ledger) with
//! mock external sources and demonstrates a distinct claim pattern.

use std::sync::Arc;

use exoclaim_contracts::{error::ClaimResult, trace::TraceEvent};
use exoclaim_core::traits::TraceRecorder;
use exoclaim_trace::InMemoryTraceRecorder;

pub mod price_feed;
pub mod threshold_vote;
pub mod tokenize_asset;

/// Thin newtype allowing an `Arc<InMemoryTraceRecorder>` to be used as
/// `Box<dyn TraceRecorder>`. This lets a scenario retain an inspectable
/// handle after the controller takes ownership via the Box.
pub(crate) struct SharedTrace(pub(crate) Arc<InMemoryTraceRecorder>);

impl TraceRecorder for SharedTrace {
    fn append(&self, event: &TraceEvent) -> ClaimResult<()> {
        self.0.append(event)
    }
    fn finalize(&self, execution_id: &str) -> ClaimResult<()> {
        self.0.finalize(execution_id)
    }
}
