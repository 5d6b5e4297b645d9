//! # vpm-crypto: Cryptographic Primitives
//!
//! Building blocks for credential proofs and evidence integrity:
//!
//! - **Ed25519** signing and verification over `CanonicalBytes`, used for
//!   Merkle-root signatures and consent grants.
//! - **Merkle inclusion paths** linking each proof leaf's target hash to the
//!   credential's Merkle root.
//! - **Evidence payload hashing**: data-URI stripping, base64 decoding, and
//!   SHA-256 over the decoded bytes.
//!
//! ## Crate Policy
//!
//! - Depends only on `vpm-core` internally.
//! - No mocking of cryptographic operations in tests; all tests use real
//!   SHA-256 and real Ed25519 keys.

pub mod ed25519;
mod hex;
pub mod merkle;
pub mod payload;

pub use ed25519::{verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use merkle::{fold_path, node_hash, MerkleStep, MerkleTree};
pub use payload::{decode_base64_payload, payload_sha256_hex, strip_data_uri};
