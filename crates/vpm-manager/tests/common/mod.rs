//! Shared fixtures: credentials issued with real keys at test time.

#![allow(dead_code)]

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use vpm_crypto::{payload_sha256_hex, Ed25519KeyPair};
use vpm_manager::{CredentialArtifacts, Evidence};
use vpm_vc::{Credential, CredentialDraft, CredentialIssuer};

/// base64("selfie-bytes") as a data URI.
pub const SELFIE_PAYLOAD: &str = "data:image/jpeg;base64,c2VsZmllLWJ5dGVz";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

pub fn issuer_key() -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed(&[0x11; 32])
}

pub fn holder_key() -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed(&[0x22; 32])
}

pub fn issuer() -> CredentialIssuer {
    CredentialIssuer::new(issuer_key())
}

fn issue(draft: CredentialDraft) -> Credential {
    issuer()
        .issue(
            draft
                .issuer("did:ethr:0xf3beac30c498d9e26865f34fcaa57dbb935b0d74")
                .anchor(json!({"type": "transient", "network": "testnet"}))
                .holder_key(&holder_key().public_key()),
        )
        .expect("fixture issues")
}

pub fn phone_number_credential() -> Credential {
    issue(
        CredentialDraft::new(
            "8a3d4b0c-phone",
            "credential-cvc:PhoneNumber-v1",
            json!({"contact": {"phoneNumber": {
                "country": "US", "countryCode": "1", "number": "5551234567", "extension": "", "lineType": "mobile"
            }}}),
        )
        .claim("claim-cvc:Contact.phoneNumber-v1", "contact.phoneNumber")
        .claim("claim-cvc:PhoneNumber.countryCode-v1", "contact.phoneNumber.countryCode")
        .claim("claim-cvc:PhoneNumber.number-v1", "contact.phoneNumber.number"),
    )
}

pub fn email_credential() -> Credential {
    issue(
        CredentialDraft::new(
            "5c1e7e2f-email",
            "credential-cvc:Email-v1",
            json!({"contact": {"email": {"username": "civic", "domain": {"name": "civic", "tld": "com"}}}}),
        )
        .claim("claim-cvc:Contact.email-v1", "contact.email")
        .claim("claim-cvc:Email.domain-v1", "contact.email.domain"),
    )
}

/// An email credential whose subject no longer matches its proof.
pub fn invalid_email_credential() -> Credential {
    let mut cred = email_credential();
    cred.id = "0d9f41aa-email-tampered".into();
    cred.claim = Some(json!({"contact": {"email": {"username": "mallory", "domain": {"name": "civic", "tld": "com"}}}}));
    cred
}

pub fn id_document_subject(selfie_sha256: &str) -> Value {
    json!({
        "document": {
            "type": "passport",
            "number": "FP12345",
            "name": {"givenNames": "Civic", "familyNames": "User"},
            "dateOfBirth": {"day": 1, "month": 1, "year": 1990},
            "evidences": {
                "selfie": {"algorithm": "sha256", "data": selfie_sha256},
                "idDocumentFront": {"algorithm": "sha256", "data": "195f9bf62b1a807abe26828c13f29e443169cdc5f60b22b470bfa50eef55a5a4"}
            }
        },
        "identity": {"address": {"street": "1 Market St", "unit": "Suite 402", "city": "San Francisco"}}
    })
}

pub fn id_document_credential() -> Credential {
    issue(
        CredentialDraft::new(
            "c4a1b2f0-iddoc",
            "credential-cvc:IdDocument-v2",
            id_document_subject(&selfie_sha256()),
        )
        .claim("claim-cvc:Document.type-v1", "document.type")
        .claim("claim-cvc:Document.number-v1", "document.number")
        .claim("claim-cvc:Name.givenNames-v1", "document.name.givenNames")
        .claim("claim-cvc:Name.familyNames-v1", "document.name.familyNames")
        .claim("claim-cvc:Document.dateOfBirth-v1", "document.dateOfBirth")
        .claim("claim-cvc:Validation:evidences.selfie-v1", "document.evidences.selfie")
        .claim("claim-cvc:Validation:evidences.idDocumentFront-v1", "document.evidences.idDocumentFront")
        .claim("claim-cvc:Identity.address-v1", "identity.address"),
    )
}

pub fn selfie_sha256() -> String {
    payload_sha256_hex(SELFIE_PAYLOAD).expect("fixture payload decodes")
}

pub fn selfie_evidence() -> Evidence {
    Evidence {
        content: "selfie".into(),
        content_type: "image/jpeg".into(),
        sha256: selfie_sha256(),
        base64_encoded: SELFIE_PAYLOAD.into(),
    }
}

/// Phone number and ID document presentations plus the selfie evidence.
pub fn valid_artifacts() -> CredentialArtifacts {
    CredentialArtifacts {
        presentations: vec![phone_number_credential(), id_document_credential()],
        evidences: vec![selfie_evidence()],
    }
}

pub fn presentations_only(presentations: Vec<Credential>) -> CredentialArtifacts {
    CredentialArtifacts {
        presentations,
        evidences: vec![],
    }
}

/// A DSR naming requester and request ids and asking for evidence uploads.
pub fn dsr_request(requester_id: &str, request_id: &str) -> Value {
    json!({
        "payload": {
            "id": request_id,
            "requesterInfo": {
                "requesterId": requester_id,
                "app": {"id": "demo-app", "name": "Demo", "primaryColor": "A80B00"}
            },
            "credentialItems": [
                {"identifier": "credential-cvc:IdDocument-v2", "constraints": {}}
            ],
            "channels": {
                "eventsURL": "https://api.example.com/events",
                "evidences": {
                    "idDocumentFront": {"required": true},
                    "idDocumentBack": {"required": false},
                    "selfie": {"required": true}
                }
            }
        }
    })
}
