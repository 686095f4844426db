//! # exoclaim-verify
//!
//! Evidence verification for the EXOCLAIM protocol.
//!
//! This crate provides [`engine::ProtocolVerifier`], which implements the
//! [`exoclaim_core::traits::EvidenceVerifier`] trait. Each claim type has
//! exactly one verification rule, matched exhaustively:
//!
//! - `ApiResponse` — Ed25519 signature over the canonical encoding of
//!   (source, query_params, payload).
//! - `DatabaseQuery` — Merkle inclusion proof placing the response hash
//!   under an expected root.
//! - `FileContent` — SHA-256 content hash of the payload.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use exoclaim_verify::{ProtocolVerifier, TrustAnchorRegistry};
//!
//! let anchors = TrustAnchorRegistry::from_file(Path::new("anchors/prod.toml"))?;
//! let verifier = ProtocolVerifier::with_anchors(anchors);
//! // Pass `verifier` to `exoclaim_core::ClaimController::new(...)`.
//! ```

pub mod anchors;
pub mod canonical;
pub mod engine;
pub mod merkle;

pub use anchors::TrustAnchorRegistry;
pub use engine::ProtocolVerifier;
