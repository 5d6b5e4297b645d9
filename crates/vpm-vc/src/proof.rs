//! # Structural Proof Checks
//!
//! The checks that need no network and no issuer key: every leaf's target
//! hash is recomputed from its claim, folded through its inclusion path to
//! the Merkle root, and compared against the subject value it claims to
//! prove.
//!
//! ## Signing Inputs
//!
//! | Object          | Canonical input                                  |
//! |-----------------|--------------------------------------------------|
//! | leaf target     | `{"claimPath", "identifier", "value"}`           |
//! | issuer proof    | `{"merkleRoot"}`                                 |
//! | consent grant   | `{"merkleRoot", "requestId", "requesterId"}`     |
//!
//! Issuance ([`crate::issue`]) and verification ([`crate::verifier`]) both
//! build their inputs through the functions in this module.

use serde_json::{json, Value};
use thiserror::Error;

use vpm_core::{resolve_path, sha256_hex, CanonicalBytes};
use vpm_crypto::fold_path;

use crate::credential::{Credential, CredentialError, ProofLeaf};

/// Why a credential failed structural verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofDefect {
    /// The proof has no leaves.
    #[error("proof has no leaves")]
    NoLeaves,

    /// The credential carries no claim subject.
    #[error("credential has no claim subject")]
    NoSubject,

    /// A leaf's target hash does not match its claim.
    #[error("target hash mismatch for {claim_path:?}")]
    TargetHashMismatch {
        /// Path of the offending leaf.
        claim_path: String,
    },

    /// A leaf's inclusion path does not lead to the Merkle root.
    #[error("inclusion path for {claim_path:?} does not reach the merkle root")]
    RootMismatch {
        /// Path of the offending leaf.
        claim_path: String,
    },

    /// The subject value at the leaf's path differs from the leaf value.
    #[error("subject value at {claim_path:?} differs from the proven value")]
    ValueMismatch {
        /// Path of the offending leaf.
        claim_path: String,
    },

    /// A hash could not be computed or decoded.
    #[error("malformed proof for {claim_path:?}: {reason}")]
    Malformed {
        /// Path of the offending leaf.
        claim_path: String,
        /// Underlying failure.
        reason: String,
    },
}

/// SHA-256 (hex) of the canonical `{claimPath, identifier, value}` object.
pub fn leaf_target_hash(
    identifier: &str,
    claim_path: &str,
    value: &Value,
) -> Result<String, CredentialError> {
    let input = CanonicalBytes::new(&json!({
        "claimPath": claim_path,
        "identifier": identifier,
        "value": value,
    }))?;
    Ok(sha256_hex(&input))
}

/// Canonical input of the issuer signature over a Merkle root.
pub fn root_signing_input(merkle_root: &str) -> Result<CanonicalBytes, CredentialError> {
    Ok(CanonicalBytes::new(&json!({ "merkleRoot": merkle_root }))?)
}

/// Canonical input of a consent grant for one requester and request.
pub fn grant_signing_input(
    merkle_root: &str,
    requester_id: &str,
    request_id: &str,
) -> Result<CanonicalBytes, CredentialError> {
    Ok(CanonicalBytes::new(&json!({
        "merkleRoot": merkle_root,
        "requestId": request_id,
        "requesterId": requester_id,
    }))?)
}

/// Run every structural check, stopping at the first defect.
pub fn check_structure(credential: &Credential) -> Result<(), ProofDefect> {
    let proof = &credential.proof;
    if proof.leaves.is_empty() {
        return Err(ProofDefect::NoLeaves);
    }
    let subject = credential.subject().ok_or(ProofDefect::NoSubject)?;
    for leaf in &proof.leaves {
        check_leaf(leaf, &proof.merkle_root, subject)?;
    }
    Ok(())
}

fn check_leaf(leaf: &ProofLeaf, merkle_root: &str, subject: &Value) -> Result<(), ProofDefect> {
    let malformed = |reason: String| ProofDefect::Malformed {
        claim_path: leaf.claim_path.clone(),
        reason,
    };

    let expected = leaf_target_hash(&leaf.identifier, &leaf.claim_path, &leaf.value)
        .map_err(|e| malformed(e.to_string()))?;
    if !leaf.target_hash.eq_ignore_ascii_case(&expected) {
        return Err(ProofDefect::TargetHashMismatch {
            claim_path: leaf.claim_path.clone(),
        });
    }

    let root = fold_path(&leaf.target_hash, &leaf.node).map_err(|e| malformed(e.to_string()))?;
    if !root.eq_ignore_ascii_case(merkle_root) {
        return Err(ProofDefect::RootMismatch {
            claim_path: leaf.claim_path.clone(),
        });
    }

    if resolve_path(subject, &leaf.claim_path) != Some(&leaf.value) {
        return Err(ProofDefect::ValueMismatch {
            claim_path: leaf.claim_path.clone(),
        });
    }
    Ok(())
}
