//! # vpm-core: Foundational Types for the Verifiable Presentation Manager
//!
//! This crate is the leaf of the workspace DAG. It defines the primitives
//! every other `vpm-*` crate builds on:
//!
//! 1. **`CanonicalBytes` newtype.** All digest and signature inputs flow
//!    through `CanonicalBytes::new()` (JCS, RFC 8785). Proof target hashes,
//!    signing inputs and consent grants are computed over canonical bytes
//!    only, so issuer and verifier can never disagree on serialization.
//!
//! 2. **`sha256_hex`.** SHA-256 over canonical bytes, rendered as
//!    lowercase hex, the form proof target hashes take.
//!
//! 3. **Claim path resolution.** Claim subjects are arbitrarily shaped, so
//!    they are carried as `serde_json::Value` trees. The [`path`] module
//!    resolves dotted paths into those trees and matches partial search
//!    criteria by flattening both sides into leaf paths.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vpm-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod path;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::sha256_hex;
pub use error::{CanonicalizationError, CryptoError};
pub use path::{flatten_leaf_paths, matches_criteria, resolve_path};
