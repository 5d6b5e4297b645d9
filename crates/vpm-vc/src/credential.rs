//! # Credential Structure
//!
//! A credential ("presentation" once shared) is an identifier-tagged claim
//! subject plus a proof. Each proof leaf binds one claim path to its value
//! through a target hash, and links that hash to the proof's Merkle root.
//!
//! ```json
//! {
//!   "id": "6b3f…",
//!   "identifier": "credential-cvc:Email-v1",
//!   "claim": { "contact": { "email": { "username": "alice", … } } },
//!   "proof": {
//!     "merkleRoot": "…",
//!     "anchor": { … },
//!     "leaves": [
//!       { "identifier": "claim-cvc:Contact.email-v1", "claimPath": "contact.email",
//!         "value": { … }, "targetHash": "…", "node": [ { "right": "…" } ] }
//!     ],
//!     "signature": { "publicKey": "…", "signatureValue": "…" }
//!   },
//!   "granted": "…"
//! }
//! ```
//!
//! The claim subject is accepted under the legacy `claim` key or under
//! `credentialSubject`. It is intentionally untyped.
//!
//! Hash and signature fields are kept as strings and parsed at verification
//! time, so a credential with a malformed proof can still be ingested and is
//! then reported as unverified rather than rejected at parse time.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use vpm_crypto::MerkleStep;

/// Errors from credential parsing and issuance.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Canonicalization of a hashed or signed value failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] vpm_core::CanonicalizationError),

    /// A cryptographic primitive rejected its input.
    #[error("crypto error: {0}")]
    Crypto(#[from] vpm_core::CryptoError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A draft declared a claim path that the subject does not contain.
    #[error("claim path {0:?} not present in the credential subject")]
    MissingClaim(String),

    /// A draft declared no claims; a credential needs at least one leaf.
    #[error("credential {0:?} declares no claims")]
    NoClaims(String),
}

/// A verifiable credential or presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Unique credential identifier.
    pub id: String,

    /// Credential type tag, e.g. `credential-cvc:Email-v1`.
    pub identifier: String,

    /// DID of the issuer, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// The claim subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim: Option<Value>,

    /// W3C spelling of the claim subject. Consulted only when `claim` is
    /// absent; a document may carry both.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_subject: Option<Value>,

    /// The Merkle proof over the claims.
    pub proof: CredentialProof,

    /// Hex Ed25519 consent signature for a requester/request pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted: Option<String>,
}

/// The proof section of a credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialProof {
    /// Proof type tag, if declared.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub proof_type: Option<String>,

    /// Root of the Merkle tree over all leaf target hashes (hex).
    #[serde(default)]
    pub merkle_root: String,

    /// Ledger anchor of the Merkle root. Opaque to this crate; interpreted by
    /// the injected anchor strategy. `anchor.subject.pub` carries the holder
    /// key that signs consent grants.
    #[serde(default)]
    pub anchor: Value,

    /// One leaf per presented claim, in issuance order.
    #[serde(default)]
    pub leaves: Vec<ProofLeaf>,

    /// Issuer signature over the Merkle root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<ProofSignature>,
}

/// One claim-proof leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofLeaf {
    /// Claim type tag, e.g. `claim-cvc:Contact.email-v1`.
    pub identifier: String,
    /// The claimed value; must equal the subject value at `claim_path`.
    pub value: Value,
    /// Dotted path of the claim inside the subject.
    pub claim_path: String,
    /// SHA-256 (hex) of the canonical `{claimPath, identifier, value}`.
    #[serde(default)]
    pub target_hash: String,
    /// Inclusion path from `target_hash` to the Merkle root.
    #[serde(default)]
    pub node: Vec<MerkleStep>,
}

/// Hex-encoded Ed25519 issuer signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofSignature {
    /// Issuer public key (64 hex chars).
    pub public_key: String,
    /// Signature over `{"merkleRoot": …}` (128 hex chars).
    pub signature_value: String,
}

impl Credential {
    /// Parse a credential from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, CredentialError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The claim subject tree: `claim`, else `credentialSubject`.
    pub fn subject(&self) -> Option<&Value> {
        self.claim.as_ref().or(self.credential_subject.as_ref())
    }

    /// The hex public key that signs consent grants, from `anchor.subject.pub`.
    pub fn holder_key_hex(&self) -> Option<&str> {
        self.proof.anchor.pointer("/subject/pub").and_then(Value::as_str)
    }
}
