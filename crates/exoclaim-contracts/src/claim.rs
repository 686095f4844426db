//! Claim identity and lifecycle types.
//!
//! An `ExternalStateClaim` is a declared intent to incorporate one piece of
//! externally-sourced data into a deterministic execution. Claims are created
//! by the controller, mutated only through the fixed lifecycle sequence, and
//! become unreachable when the execution that created them ends.

use serde::{Deserialize, Serialize};

/// Unique identifier for a single contract execution.
///
/// One claim store, one nonce set, and one trace exist per execution.
/// The ID appears in every trace link for that execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(pub uuid::Uuid);

impl ExecutionId {
    /// Create a new, unique execution ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque identifier for one claim, unique within its execution.
///
/// Always generated by the controller on `declare()` — never caller-supplied,
/// so a caller cannot replay or collide an existing claim's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimId(pub uuid::Uuid);

impl ClaimId {
    /// Allocate a fresh claim ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ClaimId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClaimId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The kind of external source a claim draws from.
///
/// This is a closed set: each variant has exactly one verification rule in
/// the verifier, matched exhaustively. Adding a source kind is a
/// compile-time-checked change — there is no default or fallback rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimType {
    /// A signed response from an external API endpoint.
    ApiResponse,
    /// A database record accompanied by a Merkle inclusion proof.
    DatabaseQuery,
    /// File contents attested by a content hash.
    FileContent,
}

impl std::fmt::Display for ClaimType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClaimType::ApiResponse => "api-response",
            ClaimType::DatabaseQuery => "database-query",
            ClaimType::FileContent => "file-content",
        };
        f.write_str(s)
    }
}

/// Where a claim currently sits in its lifecycle.
///
/// The only legal transitions are:
///
/// ```text
/// Declared → EvidenceBound → Verified → Consumed
/// Declared → Rejected            (malformed bind input)
/// EvidenceBound → Rejected       (verification failure)
/// ```
///
/// `Rejected` and `Consumed` are terminal. No transition is ever taken twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleState {
    /// Declared, waiting for evidence.
    Declared,
    /// Evidence bound, waiting for verification.
    EvidenceBound,
    /// Evidence verified; the payload is available exactly once via query.
    Verified,
    /// Evidence failed verification, or bind input was malformed. Terminal.
    Rejected,
    /// The payload has been queried. Terminal.
    Consumed,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LifecycleState::Declared => "declared",
            LifecycleState::EvidenceBound => "evidence-bound",
            LifecycleState::Verified => "verified",
            LifecycleState::Rejected => "rejected",
            LifecycleState::Consumed => "consumed",
        };
        f.write_str(s)
    }
}

/// One request to incorporate external data into the execution.
///
/// `source` and `query_params` are opaque to the protocol — they are
/// meaningful only to the out-of-band process that fetched the data and to
/// the signature that attests to it. `query_params` is an ordered list, not
/// a map: the order is part of the canonical signing encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalStateClaim {
    /// Controller-generated identifier, unique within the execution.
    pub claim_id: ClaimId,
    /// Which source kind this claim draws from.
    pub claim_type: ClaimType,
    /// Origin identifier (API URL, database id, file id). Never dereferenced
    /// by the protocol.
    pub source: String,
    /// Ordered key → value pairs describing what was requested.
    pub query_params: Vec<(String, String)>,
    /// Logical timestamp from the deterministic execution context at
    /// declaration time. Not wall-clock.
    pub declared_at: u64,
    /// Current lifecycle state.
    pub lifecycle_state: LifecycleState,
}

/// A structured key for durable ledger state entries.
///
/// Composite of a kind tag plus fixed-width fields, so two keys of different
/// kinds can never collide the way ad hoc string concatenation can. The byte
/// encoding is `[kind tag (1)] [claim/subject uuid (16)] [qualifier (8 BE)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateKey {
    /// What kind of state this key addresses.
    pub kind: StateKeyKind,
    /// The subject UUID (a claim ID, asset ID, or proposal ID).
    pub subject: uuid::Uuid,
    /// Kind-specific qualifier (e.g. a vote round or token index).
    pub qualifier: u64,
}

/// Kind tag for `StateKey`. One byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateKeyKind {
    /// A verified claim's recorded outcome.
    ClaimOutcome,
    /// A tokenized asset record.
    AssetToken,
    /// An accumulated vote tally for a proposal.
    VoteTally,
}

impl StateKeyKind {
    fn tag(self) -> u8 {
        match self {
            StateKeyKind::ClaimOutcome => 0x01,
            StateKeyKind::AssetToken => 0x02,
            StateKeyKind::VoteTally => 0x03,
        }
    }
}

impl StateKey {
    /// Build a state key.
    pub fn new(kind: StateKeyKind, subject: uuid::Uuid, qualifier: u64) -> Self {
        Self { kind, subject, qualifier }
    }

    /// Fixed-width byte encoding: tag ‖ subject ‖ qualifier (big-endian).
    pub fn to_bytes(&self) -> [u8; 25] {
        let mut out = [0u8; 25];
        out[0] = self.kind.tag();
        out[1..17].copy_from_slice(self.subject.as_bytes());
        out[17..25].copy_from_slice(&self.qualifier.to_be_bytes());
        out
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}
