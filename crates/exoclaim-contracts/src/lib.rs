//! # exoclaim-contracts
//!
//! Shared types and contracts for the EXOCLAIM external-claim protocol.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions and error types.

pub mod claim;
pub mod context;
pub mod error;
pub mod evidence;
pub mod trace;
pub mod verify;
