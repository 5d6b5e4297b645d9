//! # Presentation Verifier
//!
//! Verification runs in three stages, ANDed together:
//!
//! 1. **Structural** ([`PresentationVerifier::non_cryptographically_secure_verify`]):
//!    the checks in [`crate::proof`]. Local and synchronous.
//! 2. **Anchor** ([`AnchorVerifier`]): the Merkle root is anchored on a
//!    ledger. Pluggable; usually needs I/O.
//! 3. **Signature** ([`SignatureVerifier`]): the issuer signed the anchored
//!    root. Pluggable.
//!
//! Consent grants ([`PresentationVerifier::verify_grant`]) are checked
//! separately against the holder key published in the anchor.
//!
//! ## Permissive Defaults
//!
//! [`PresentationVerifier::new`] installs [`AlwaysValid`] for both anchor
//! and signature. A verifier built that way only proves internal
//! consistency: anyone can mint a structurally valid credential. Production
//! deployments must install real strategies, e.g.
//! [`Ed25519SignatureVerifier`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use vpm_crypto::{verify_with_public_key, Ed25519PublicKey, Ed25519Signature};

use crate::credential::{Credential, CredentialProof};
use crate::proof::{check_structure, grant_signing_input, root_signing_input};

/// Checks that a proof's Merkle root is anchored.
#[async_trait]
pub trait AnchorVerifier: Send + Sync {
    async fn verify_anchor(&self, proof: &CredentialProof) -> bool;
}

/// Checks that a proof's anchored root carries a valid issuer signature.
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    async fn verify_signature(&self, proof: &CredentialProof) -> bool;
}

/// Accepts every proof. The explicit permissive default.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysValid;

#[async_trait]
impl AnchorVerifier for AlwaysValid {
    async fn verify_anchor(&self, _proof: &CredentialProof) -> bool {
        true
    }
}

#[async_trait]
impl SignatureVerifier for AlwaysValid {
    async fn verify_signature(&self, _proof: &CredentialProof) -> bool {
        true
    }
}

/// Adapts a synchronous predicate into an anchor or signature strategy.
///
/// ```
/// use vpm_vc::{FnCheck, PresentationVerifier};
/// use std::sync::Arc;
///
/// let verifier = PresentationVerifier::new()
///     .with_anchor_verifier(Arc::new(FnCheck(|p: &vpm_vc::CredentialProof| {
///         p.anchor.get("network").is_some()
///     })));
/// ```
pub struct FnCheck<F>(pub F);

#[async_trait]
impl<F> AnchorVerifier for FnCheck<F>
where
    F: Fn(&CredentialProof) -> bool + Send + Sync,
{
    async fn verify_anchor(&self, proof: &CredentialProof) -> bool {
        (self.0)(proof)
    }
}

#[async_trait]
impl<F> SignatureVerifier for FnCheck<F>
where
    F: Fn(&CredentialProof) -> bool + Send + Sync,
{
    async fn verify_signature(&self, proof: &CredentialProof) -> bool {
        (self.0)(proof)
    }
}

/// Verifies `proof.signature` as an Ed25519 signature over the canonical
/// `{"merkleRoot": …}` object.
///
/// With `trusted_issuers` empty, any well-formed key is accepted; otherwise
/// the signing key must be one of them.
#[derive(Debug, Clone, Default)]
pub struct Ed25519SignatureVerifier {
    trusted_issuers: Vec<Ed25519PublicKey>,
}

impl Ed25519SignatureVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept signatures from these issuer keys.
    pub fn trusting(keys: impl IntoIterator<Item = Ed25519PublicKey>) -> Self {
        Self {
            trusted_issuers: keys.into_iter().collect(),
        }
    }

    fn check(&self, proof: &CredentialProof) -> Result<(), String> {
        let sig = proof.signature.as_ref().ok_or("proof carries no signature")?;
        let key = Ed25519PublicKey::from_hex(&sig.public_key).map_err(|e| e.to_string())?;
        if !self.trusted_issuers.is_empty() && !self.trusted_issuers.contains(&key) {
            return Err(format!("issuer key {key} is not trusted"));
        }
        let signature = Ed25519Signature::from_hex(&sig.signature_value).map_err(|e| e.to_string())?;
        let input = root_signing_input(&proof.merkle_root).map_err(|e| e.to_string())?;
        verify_with_public_key(&input, &signature, &key).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl SignatureVerifier for Ed25519SignatureVerifier {
    async fn verify_signature(&self, proof: &CredentialProof) -> bool {
        match self.check(proof) {
            Ok(()) => true,
            Err(reason) => {
                debug!(%reason, "issuer signature rejected");
                false
            }
        }
    }
}

/// Decides whether a presentation is authentic.
#[derive(Clone)]
pub struct PresentationVerifier {
    anchor: Arc<dyn AnchorVerifier>,
    signature: Arc<dyn SignatureVerifier>,
}

impl Default for PresentationVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PresentationVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentationVerifier").finish_non_exhaustive()
    }
}

impl PresentationVerifier {
    /// A verifier with the permissive [`AlwaysValid`] anchor and signature
    /// strategies.
    pub fn new() -> Self {
        Self {
            anchor: Arc::new(AlwaysValid),
            signature: Arc::new(AlwaysValid),
        }
    }

    /// Replace the anchor strategy.
    pub fn with_anchor_verifier(mut self, anchor: Arc<dyn AnchorVerifier>) -> Self {
        self.anchor = anchor;
        self
    }

    /// Replace the signature strategy.
    pub fn with_signature_verifier(mut self, signature: Arc<dyn SignatureVerifier>) -> Self {
        self.signature = signature;
        self
    }

    /// Structural checks only: leaves present, target hashes recompute,
    /// inclusion paths reach the root, and leaf values match the subject.
    ///
    /// Never errors; any malformed input yields `false`.
    pub fn non_cryptographically_secure_verify(&self, presentation: &Credential) -> bool {
        match check_structure(presentation) {
            Ok(()) => true,
            Err(defect) => {
                debug!(id = %presentation.id, %defect, "presentation failed structural verification");
                false
            }
        }
    }

    /// Structural checks, then the anchor strategy, then the signature
    /// strategy. Stops at the first failure.
    pub async fn cryptographically_secure_verify(&self, presentation: &Credential) -> bool {
        if !self.non_cryptographically_secure_verify(presentation) {
            return false;
        }
        if !self.anchor.verify_anchor(&presentation.proof).await {
            debug!(id = %presentation.id, "presentation anchor rejected");
            return false;
        }
        if !self.signature.verify_signature(&presentation.proof).await {
            debug!(id = %presentation.id, "presentation signature rejected");
            return false;
        }
        true
    }

    /// `true` iff `presentation.granted` is a valid signature by the holder
    /// key at `proof.anchor.subject.pub` over this presentation's root, the
    /// requester, and the request.
    pub fn verify_grant(&self, presentation: &Credential, requester_id: &str, request_id: &str) -> bool {
        let Some(granted) = presentation.granted.as_deref() else {
            debug!(id = %presentation.id, "presentation carries no consent grant");
            return false;
        };
        let Some(holder_hex) = presentation.holder_key_hex() else {
            warn!(id = %presentation.id, "presentation anchor publishes no holder key");
            return false;
        };
        let outcome = Ed25519PublicKey::from_hex(holder_hex)
            .map_err(|e| e.to_string())
            .and_then(|key| {
                let sig = Ed25519Signature::from_hex(granted).map_err(|e| e.to_string())?;
                let input = grant_signing_input(&presentation.proof.merkle_root, requester_id, request_id)
                    .map_err(|e| e.to_string())?;
                verify_with_public_key(&input, &sig, &key).map_err(|e| e.to_string())
            });
        match outcome {
            Ok(()) => true,
            Err(reason) => {
                warn!(id = %presentation.id, requester_id, request_id, %reason, "consent grant rejected");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{CredentialDraft, CredentialIssuer};
    use serde_json::json;
    use vpm_crypto::Ed25519KeyPair;

    fn issuer() -> CredentialIssuer {
        CredentialIssuer::new(Ed25519KeyPair::from_seed(&[9u8; 32]))
    }

    fn email(holder: &Ed25519KeyPair) -> Credential {
        issuer()
            .issue(
                CredentialDraft::new(
                    "email-1",
                    "credential-cvc:Email-v1",
                    json!({"contact": {"email": {"username": "bob", "domain": "example.org"}}}),
                )
                .claim("claim-cvc:Contact.email-v1", "contact.email")
                .holder_key(&holder.public_key()),
            )
            .unwrap()
    }

    #[tokio::test]
    async fn default_verifier_accepts_structurally_valid_presentation() {
        let verifier = PresentationVerifier::new();
        let cred = email(&Ed25519KeyPair::generate());
        assert!(verifier.non_cryptographically_secure_verify(&cred));
        assert!(verifier.cryptographically_secure_verify(&cred).await);
    }

    #[tokio::test]
    async fn structural_failure_short_circuits_strategies() {
        let verifier = PresentationVerifier::new().with_anchor_verifier(Arc::new(FnCheck(
            |_: &CredentialProof| -> bool { panic!("anchor must not be consulted") },
        )));
        let mut cred = email(&Ed25519KeyPair::generate());
        cred.claim = Some(json!({"contact": {"email": {"username": "eve"}}}));
        assert!(!verifier.non_cryptographically_secure_verify(&cred));
        assert!(!verifier.cryptographically_secure_verify(&cred).await);
    }

    #[tokio::test]
    async fn anchor_strategy_can_reject() {
        let verifier = PresentationVerifier::new()
            .with_anchor_verifier(Arc::new(FnCheck(|_: &CredentialProof| false)));
        let cred = email(&Ed25519KeyPair::generate());
        assert!(verifier.non_cryptographically_secure_verify(&cred));
        assert!(!verifier.cryptographically_secure_verify(&cred).await);
    }

    #[tokio::test]
    async fn ed25519_strategy_checks_issuer_signature() {
        let verifier = PresentationVerifier::new()
            .with_signature_verifier(Arc::new(Ed25519SignatureVerifier::new()));
        let mut cred = email(&Ed25519KeyPair::generate());
        assert!(verifier.cryptographically_secure_verify(&cred).await);

        let forged = Ed25519KeyPair::generate();
        let input = root_signing_input(&cred.proof.merkle_root).unwrap();
        if let Some(sig) = cred.proof.signature.as_mut() {
            sig.signature_value = forged.sign(&input).to_hex();
        }
        assert!(!verifier.cryptographically_secure_verify(&cred).await);

        cred.proof.signature = None;
        assert!(!verifier.cryptographically_secure_verify(&cred).await);
    }

    #[tokio::test]
    async fn ed25519_strategy_enforces_trusted_issuers() {
        let cred = email(&Ed25519KeyPair::generate());
        let trusting_issuer = Ed25519SignatureVerifier::trusting([issuer().public_key()]);
        let trusting_other = Ed25519SignatureVerifier::trusting([Ed25519KeyPair::generate().public_key()]);
        assert!(trusting_issuer.verify_signature(&cred.proof).await);
        assert!(!trusting_other.verify_signature(&cred.proof).await);
    }

    #[test]
    fn grant_verifies_only_for_the_signed_pair() {
        let holder = Ed25519KeyPair::generate();
        let mut cred = email(&holder);
        let verifier = PresentationVerifier::new();
        assert!(!verifier.verify_grant(&cred, "requester-1", "request-1"));

        cred.sign_grant(&holder, "requester-1", "request-1").unwrap();
        assert!(verifier.verify_grant(&cred, "requester-1", "request-1"));
        assert!(!verifier.verify_grant(&cred, "requester-2", "request-1"));
        assert!(!verifier.verify_grant(&cred, "requester-1", "request-2"));
    }

    #[test]
    fn grant_by_someone_else_is_rejected() {
        let holder = Ed25519KeyPair::generate();
        let mut cred = email(&holder);
        cred.sign_grant(&Ed25519KeyPair::generate(), "requester-1", "request-1").unwrap();
        assert!(!PresentationVerifier::new().verify_grant(&cred, "requester-1", "request-1"));
    }

    #[test]
    fn grant_without_holder_key_or_with_garbage_is_rejected() {
        let holder = Ed25519KeyPair::generate();
        let mut cred = email(&holder);
        cred.granted = Some("not-a-signature".into());
        assert!(!PresentationVerifier::new().verify_grant(&cred, "r", "q"));

        cred.sign_grant(&holder, "r", "q").unwrap();
        cred.proof.anchor = json!({});
        assert!(!PresentationVerifier::new().verify_grant(&cred, "r", "q"));
    }
}
