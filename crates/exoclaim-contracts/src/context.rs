//! The explicit execution context.
//!
//! Everything the controller needs from the surrounding deterministic
//! execution is passed in here — caller address, logical time, freshness
//! window. Nothing is read from ambient process-wide state, which is what
//! keeps verification replayable on a node that was not the original
//! executor.

use serde::{Deserialize, Serialize};

use crate::claim::ExecutionId;

/// A snapshot of the deterministic execution environment.
///
/// Constructed once per execution by the host and handed to the controller.
/// All fields must come from the replicated execution state (block height,
/// transaction sender), never from wall clocks or environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// The execution this context belongs to.
    pub execution_id: ExecutionId,
    /// Address of the caller that initiated the execution.
    pub caller: String,
    /// Logical timestamp of the execution (e.g. block height). Claims record
    /// this as `declared_at`, and evidence timestamps are judged against it.
    pub logical_time: u64,
    /// How far behind `logical_time` an evidence timestamp may lag and still
    /// be considered fresh.
    pub freshness_window: u64,
}

impl ExecutionContext {
    /// True when `timestamp` falls inside the freshness window:
    /// `logical_time - freshness_window <= timestamp <= logical_time`.
    ///
    /// Timestamps from the future (greater than `logical_time`) are never
    /// fresh — evidence cannot predate its own verification window.
    pub fn is_fresh(&self, timestamp: u64) -> bool {
        timestamp <= self.logical_time
            && timestamp >= self.logical_time.saturating_sub(self.freshness_window)
    }
}
