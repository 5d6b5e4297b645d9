//! PII extraction from DSR responses.

mod common;

use serde_json::{json, Value};

use vpm_manager::{ClaimCriteriaMap, DsrResponse, EvidenceProof, PiiError, PiiFactory, SearchClaimCriteria};

use common::*;

fn mapping() -> ClaimCriteriaMap {
    [
        ("first_name", "claim-cvc:Name.givenNames-v1"),
        ("last_name", "claim-cvc:Name.familyNames-v1"),
        ("date_of_birth", "claim-cvc:Document.dateOfBirth-v1"),
        ("street", "claim-cvc:Identity.address-v1"),
    ]
    .into_iter()
    .map(|(name, identifier)| (name.to_string(), SearchClaimCriteria::identifier(identifier)))
    .collect()
}

fn factory() -> PiiFactory {
    PiiFactory::new(dsr_request("did:example:requester", "dsr-1"), mapping())
        .with_formatter("date_of_birth", |v: &Value| {
            json!(format!("{}-{}-{}", v["year"], v["month"], v["day"]))
        })
        .with_formatter("street", |v: &Value| {
            json!(format!(
                "{} {}",
                v["street"].as_str().unwrap_or_default(),
                v["unit"].as_str().unwrap_or_default()
            ))
        })
}

fn response(credentials: Vec<Value>) -> DsrResponse {
    serde_json::from_value(json!({
        "verifiableData": credentials
            .into_iter()
            .map(|c| json!({"credentialItemRequest": {"identifier": c["identifier"].clone()}, "credential": c}))
            .collect::<Vec<_>>(),
        "requestStatus": null,
        "userId": "user-1"
    }))
    .unwrap()
}

#[tokio::test]
async fn extracts_formatted_claims_and_evidence_proofs() {
    init_tracing();
    let id_doc = serde_json::to_value(id_document_credential()).unwrap();
    let extracted = factory().extract_pii(&response(vec![id_doc])).await.unwrap();

    assert_eq!(extracted.formatted_claims["first_name"], Some(json!("Civic")));
    assert_eq!(extracted.formatted_claims["last_name"], Some(json!("User")));
    assert_eq!(extracted.formatted_claims["date_of_birth"], Some(json!("1990-1-1")));
    assert_eq!(extracted.formatted_claims["street"], Some(json!("1 Market St Suite 402")));
    assert_eq!(
        extracted.formatted_claims.keys().collect::<Vec<_>>(),
        vec!["first_name", "last_name", "date_of_birth", "street"]
    );

    assert_eq!(extracted.evidence_proofs.len(), 1);
    let proofs = &extracted.evidence_proofs[0];
    assert_eq!(proofs.name, "credential-cvc:IdDocument-v2");
    assert_eq!(
        proofs.proofs.keys().collect::<Vec<_>>(),
        vec!["idDocumentFront", "selfie"]
    );
    assert_eq!(proofs.proofs["selfie"]["data"], json!(selfie_sha256()));
}

#[tokio::test]
async fn missing_claims_map_to_none_and_skip_formatting() {
    let phone = serde_json::to_value(phone_number_credential()).unwrap();
    let extracted = factory().extract_pii(&response(vec![phone])).await.unwrap();
    assert!(extracted.formatted_claims.values().all(Option::is_none));
    assert_eq!(extracted.formatted_claims.len(), 4);
    assert!(extracted.evidence_proofs.is_empty());
}

#[tokio::test]
async fn tampered_response_is_still_extracted() {
    let mut tampered = serde_json::to_value(id_document_credential()).unwrap();
    tampered["claim"]["document"]["name"]["givenNames"] = json!("Mallory");
    let extracted = factory().extract_pii(&response(vec![tampered])).await.unwrap();
    assert_eq!(extracted.formatted_claims["first_name"], Some(json!("Mallory")));
}

#[tokio::test]
async fn broken_response_is_invalid() {
    let broken: DsrResponse = serde_json::from_value(json!({
        "verifiableData": [{"credential": {"identifier": "credential-cvc:IdDocument-v2", "claim": {}}}]
    }))
    .unwrap();
    let err = factory().extract_pii(&broken).await.unwrap_err();
    assert!(matches!(err, PiiError::InvalidResponse { .. }));
    assert_eq!(err.to_string(), "the dsr response on the requirements is invalid");
}

#[tokio::test]
async fn expected_documents_intersect_request_and_proofs() {
    let id_doc = serde_json::to_value(id_document_credential()).unwrap();
    let factory = factory();
    let extracted = factory.extract_pii(&response(vec![id_doc])).await.unwrap();
    assert_eq!(
        factory.expected_documents_given_evidence_proofs(&extracted.evidence_proofs),
        vec!["idDocumentFront", "selfie"]
    );

    let back_only = EvidenceProof {
        name: "credential-cvc:IdDocument-v2".into(),
        proofs: serde_json::from_value(json!({"idDocumentBack": {"data": "ff"}})).unwrap(),
    };
    assert_eq!(
        factory.expected_documents_given_evidence_proofs(&[back_only]),
        vec!["idDocumentBack"]
    );
}
