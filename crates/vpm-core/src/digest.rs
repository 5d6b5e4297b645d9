//! # Canonical Digests
//!
//! Proof leaf target hashes are SHA-256 digests of canonical bytes,
//! rendered as 64-character lowercase hex strings.
//!
//! ## Security Invariant
//!
//! `sha256_hex()` accepts only `&CanonicalBytes`, so every structured value
//! that is hashed has gone through the JCS pipeline. Opaque evidence
//! payloads are hashed separately in `vpm-crypto`.

use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// SHA-256 of canonical bytes as lowercase hex.
///
/// This is the representation stored in `targetHash`.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    Sha256::digest(data.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
