//! # exoclaim-core
//!
//! The claim lifecycle controller for the EXOCLAIM external-claim protocol.
//!
//! This crate provides:
//! - The three trait seams (`EvidenceVerifier`, `TraceRecorder`, `Ledger`)
//! - The execution-scoped `ClaimStore`
//! - The `ClaimController` that enforces the claim state machine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use exoclaim_core::{ClaimController, traits::{EvidenceVerifier, TraceRecorder}};
//! ```

pub mod controller;
pub mod store;
pub mod traits;

pub use controller::ClaimController;
pub use store::{ClaimRecord, ClaimStore};
