//! Canonical signing encoding.
//!
//! A source's trust anchor signs over a single unambiguous byte sequence
//! covering what was asked of it and what it answered. Every field is
//! length-delimited and the whole preimage is domain-prefixed, so no two
//! distinct (source, params, payload) triples can encode to the same bytes.
//!
//! Preimage layout (bytes, in order):
//!   1. domain tag `XCLM_SIG_V1`
//!   2. u64-BE length of source, then source UTF-8 bytes
//!   3. u64-BE param count, then per param: u64-BE key length, key bytes,
//!      u64-BE value length, value bytes (in declared order)
//!   4. u64-BE payload length, then payload bytes

/// Domain prefix for signature preimages.
const DOMAIN_SIG: &[u8] = b"XCLM_SIG_V1";

/// Build the canonical byte sequence a trust anchor signs.
///
/// Parameter order matters: `query_params` is an ordered list and two
/// orderings produce two different preimages.
pub fn signing_bytes(source: &str, query_params: &[(String, String)], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        DOMAIN_SIG.len() + 8 + source.len() + 8 + payload.len() + query_params.len() * 16,
    );
    out.extend_from_slice(DOMAIN_SIG);

    push_delimited(&mut out, source.as_bytes());

    out.extend_from_slice(&(query_params.len() as u64).to_be_bytes());
    for (key, value) in query_params {
        push_delimited(&mut out, key.as_bytes());
        push_delimited(&mut out, value.as_bytes());
    }

    push_delimited(&mut out, payload);
    out
}

fn push_delimited(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
    out.extend_from_slice(bytes);
}
