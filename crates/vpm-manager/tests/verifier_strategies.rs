//! Managers with real anchor and signature strategies installed.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use vpm_crypto::Ed25519KeyPair;
use vpm_manager::{
    AnchorVerifier, FnCheck, ManagerError, PresentationManager, PresentationVerifier, VpmOptions,
};
use vpm_vc::{CredentialDraft, CredentialIssuer, CredentialProof, Ed25519SignatureVerifier};

use common::*;

/// Accepts anchors on one network and counts how often it was asked.
struct NetworkAnchor {
    network: &'static str,
    calls: AtomicUsize,
}

#[async_trait]
impl AnchorVerifier for NetworkAnchor {
    async fn verify_anchor(&self, proof: &CredentialProof) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        proof.anchor.get("network").and_then(|n| n.as_str()) == Some(self.network)
    }
}

fn trusted_verifier() -> PresentationVerifier {
    PresentationVerifier::new()
        .with_signature_verifier(Arc::new(Ed25519SignatureVerifier::trusting([issuer_key().public_key()])))
}

#[tokio::test]
async fn foreign_issuer_is_rejected_by_signature_strategy() {
    init_tracing();
    let rogue = CredentialIssuer::new(Ed25519KeyPair::from_seed(&[0x99; 32]))
        .issue(
            CredentialDraft::new(
                "rogue-email",
                "credential-cvc:Email-v1",
                serde_json::json!({"contact": {"email": {"username": "civic", "domain": "civic.com"}}}),
            )
            .claim("claim-cvc:Contact.email-v1", "contact.email"),
        )
        .unwrap();

    let mut permissive = PresentationManager::new(VpmOptions::default());
    let status = permissive
        .add_credential_artifacts(presentations_only(vec![rogue.clone()]))
        .await
        .unwrap();
    assert_eq!(status.verified_presentations, 1);

    let mut strict = PresentationManager::with_verifier(VpmOptions::default(), trusted_verifier());
    let err = strict
        .add_credential_artifacts(presentations_only(vec![email_credential(), rogue]))
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::UnverifiedPresentations { ids } if ids == vec!["rogue-email"]));
}

#[tokio::test]
async fn async_anchor_strategy_is_consulted_per_presentation() {
    let anchor = Arc::new(NetworkAnchor {
        network: "testnet",
        calls: AtomicUsize::new(0),
    });
    let verifier = trusted_verifier().with_anchor_verifier(anchor.clone());
    let mut vpm = PresentationManager::with_verifier(VpmOptions::default(), verifier);

    let status = vpm.add_credential_artifacts(valid_artifacts()).await.unwrap();
    assert_eq!(status.verified_presentations, 2);
    assert_eq!(anchor.calls.load(Ordering::SeqCst), 2);

    let mainnet_only = PresentationVerifier::new().with_anchor_verifier(Arc::new(NetworkAnchor {
        network: "mainnet",
        calls: AtomicUsize::new(0),
    }));
    let mut vpm = PresentationManager::with_verifier(VpmOptions::secure_fast_ingest(), mainnet_only);
    vpm.add_credential_artifacts(valid_artifacts()).await.unwrap();
    assert!(!vpm.is_all_artifacts_verified().await);
    assert!(vpm.list_evidences().await.is_empty());
}

#[tokio::test]
async fn structural_failure_skips_strategies() {
    let anchor = Arc::new(NetworkAnchor {
        network: "testnet",
        calls: AtomicUsize::new(0),
    });
    let verifier = PresentationVerifier::new().with_anchor_verifier(anchor.clone());
    let mut vpm = PresentationManager::with_verifier(
        VpmOptions {
            not_throw: true,
            ..VpmOptions::default()
        },
        verifier,
    );
    let status = vpm
        .add_credential_artifacts(presentations_only(vec![invalid_email_credential()]))
        .await
        .unwrap();
    assert_eq!(status.verified_presentations, 0);
    assert_eq!(anchor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn closure_strategy_can_veto_signatures() {
    let verifier = PresentationVerifier::new().with_signature_verifier(Arc::new(FnCheck(
        |proof: &CredentialProof| proof.signature.is_some(),
    )));
    let mut unsigned = phone_number_credential();
    unsigned.proof.signature = None;

    let mut vpm = PresentationManager::with_verifier(
        VpmOptions {
            not_throw: true,
            ..VpmOptions::default()
        },
        verifier,
    );
    let status = vpm
        .add_credential_artifacts(presentations_only(vec![unsigned, email_credential()]))
        .await
        .unwrap();
    assert_eq!(status.verified_presentations, 1);
    assert_eq!(status.total_presentations, 2);
}
