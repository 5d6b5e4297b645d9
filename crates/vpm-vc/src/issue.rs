//! # Credential Issuance
//!
//! Mints credentials in the exact format [`crate::proof`] and
//! [`crate::verifier`] check: one leaf per declared claim, a Merkle tree over
//! the leaf target hashes, and an Ed25519 signature over the root.
//!
//! Holders answer a disclosure request by signing a consent grant with the
//! key published at `proof.anchor.subject.pub`
//! ([`Credential::sign_grant`]).

use serde_json::{json, Map, Value};

use vpm_core::resolve_path;
use vpm_crypto::{Ed25519KeyPair, Ed25519PublicKey, MerkleTree};

use crate::credential::{Credential, CredentialError, CredentialProof, ProofLeaf, ProofSignature};
use crate::proof::{grant_signing_input, leaf_target_hash, root_signing_input};

/// Proof type tag written on issued credentials.
pub const PROOF_TYPE: &str = "CvcMerkleProof2018";

/// A credential awaiting issuance.
#[derive(Debug, Clone)]
pub struct CredentialDraft {
    id: String,
    identifier: String,
    issuer: Option<String>,
    subject: Value,
    claims: Vec<(String, String)>,
    anchor: Value,
}

impl CredentialDraft {
    /// Start a draft with a subject tree and no claims.
    pub fn new(id: impl Into<String>, identifier: impl Into<String>, subject: Value) -> Self {
        Self {
            id: id.into(),
            identifier: identifier.into(),
            issuer: None,
            subject,
            claims: Vec::new(),
            anchor: Value::Object(Map::new()),
        }
    }

    /// Declare a claim: its type tag and its dotted path inside the subject.
    pub fn claim(mut self, identifier: impl Into<String>, claim_path: impl Into<String>) -> Self {
        self.claims.push((identifier.into(), claim_path.into()));
        self
    }

    /// Set the issuer DID.
    pub fn issuer(mut self, did: impl Into<String>) -> Self {
        self.issuer = Some(did.into());
        self
    }

    /// Replace the anchor document.
    pub fn anchor(mut self, anchor: Value) -> Self {
        self.anchor = anchor;
        self
    }

    /// Publish the holder's consent key at `anchor.subject.pub`.
    pub fn holder_key(mut self, key: &Ed25519PublicKey) -> Self {
        if !self.anchor.is_object() {
            self.anchor = Value::Object(Map::new());
        }
        if !self.anchor["subject"].is_object() {
            self.anchor["subject"] = Value::Object(Map::new());
        }
        self.anchor["subject"]["pub"] = json!(key.to_hex());
        self
    }
}

/// Issues Merkle-proofed credentials signed with one Ed25519 key.
#[derive(Debug)]
pub struct CredentialIssuer {
    signing_key: Ed25519KeyPair,
}

impl CredentialIssuer {
    pub fn new(signing_key: Ed25519KeyPair) -> Self {
        Self { signing_key }
    }

    /// The key verifiers should expect in `proof.signature.publicKey`.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.signing_key.public_key()
    }

    /// Issue a credential from a draft.
    ///
    /// # Errors
    ///
    /// - [`CredentialError::NoClaims`] if the draft declares no claims.
    /// - [`CredentialError::MissingClaim`] if a declared path is absent.
    /// - [`CredentialError::Canonicalization`] if a claim value holds a float.
    pub fn issue(&self, draft: CredentialDraft) -> Result<Credential, CredentialError> {
        if draft.claims.is_empty() {
            return Err(CredentialError::NoClaims(draft.id));
        }

        let mut leaves = Vec::with_capacity(draft.claims.len());
        for (identifier, claim_path) in draft.claims {
            let value = resolve_path(&draft.subject, &claim_path)
                .cloned()
                .ok_or_else(|| CredentialError::MissingClaim(claim_path.clone()))?;
            let target_hash = leaf_target_hash(&identifier, &claim_path, &value)?;
            leaves.push(ProofLeaf {
                identifier,
                value,
                claim_path,
                target_hash,
                node: Vec::new(),
            });
        }

        let targets: Vec<String> = leaves.iter().map(|l| l.target_hash.clone()).collect();
        let tree = MerkleTree::build(&targets)?;
        for (i, leaf) in leaves.iter_mut().enumerate() {
            leaf.node = tree.path(i).unwrap_or_default();
        }

        let merkle_root = tree.root().to_string();
        let signature = self.signing_key.sign(&root_signing_input(&merkle_root)?);

        Ok(Credential {
            id: draft.id,
            identifier: draft.identifier,
            issuer: draft.issuer,
            claim: Some(draft.subject),
            credential_subject: None,
            proof: CredentialProof {
                proof_type: Some(PROOF_TYPE.to_string()),
                merkle_root,
                anchor: draft.anchor,
                leaves,
                signature: Some(ProofSignature {
                    public_key: self.signing_key.public_key().to_hex(),
                    signature_value: signature.to_hex(),
                }),
            },
            granted: None,
        })
    }
}

impl Credential {
    /// Sign a consent grant for `requester_id`/`request_id` and store it in
    /// `granted`, replacing any earlier grant.
    pub fn sign_grant(
        &mut self,
        holder: &Ed25519KeyPair,
        requester_id: &str,
        request_id: &str,
    ) -> Result<(), CredentialError> {
        let input = grant_signing_input(&self.proof.merkle_root, requester_id, request_id)?;
        self.granted = Some(holder.sign(&input).to_hex());
        Ok(())
    }
}
