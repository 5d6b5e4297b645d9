//! # Error Types: Leaf Error Hierarchy
//!
//! Errors shared by every crate in the workspace. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! Verification outcomes are NOT errors at this level: a credential or an
//! evidence that fails a check yields `false` from the verifier. These types
//! cover malformed inputs to the primitives themselves (non-canonical data,
//! undecodable keys, bad hex).

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Claim values must be strings, integers, booleans, or containers.
    #[error("float values are not permitted in canonical representations; use string or integer: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Digest computation failed or a digest string is malformed.
    #[error("digest error: {0}")]
    DigestError(String),

    /// A payload could not be decoded (base64, hex).
    #[error("decoding error: {0}")]
    Decoding(String),
}
