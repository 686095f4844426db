//! # exoclaim-trace
//!
//! Hash-chained, append-only execution trace for the EXOCLAIM protocol.
//!
//! ## Overview
//!
//! Every lifecycle transition the controller records becomes a
//! [`TraceLink`] whose SHA-256 digest commits to a canonical binary
//! encoding of the event, the link's position, the execution id, and the
//! previous link's digest. Doctoring any stored link — or reordering the
//! chain — is detected by [`verify_chain`]. The sealed [`TraceLog`] is
//! what an external proof system consumes: its `terminal_digest` is a
//! single 32-byte commitment to every transition the execution took.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use exoclaim_trace::InMemoryTraceRecorder;
//! use exoclaim_core::traits::TraceRecorder;
//!
//! let recorder = InMemoryTraceRecorder::new("exec-001");
//! recorder.append(&event)?;
//! recorder.finalize("exec-001")?;
//!
//! assert!(recorder.verify_integrity());
//! let log = recorder.export_log();
//! ```

pub mod chain;
pub mod link;
pub mod memory;

pub use chain::{link_digest, verify_chain};
pub use link::{TraceLink, TraceLog, GENESIS_DIGEST};
pub use memory::InMemoryTraceRecorder;

// ── Tests ─────────────────────────────────────────────────────────────────────
