//! # PII Extraction
//!
//! Turns a DSR response into the flat, formatted personal data a relying
//! party stores, using a per-DSR mapping from logical field names to claim
//! criteria and optional per-field formatters.
//!
//! Extraction ingests the response's presentations into a manager that
//! neither verifies nor filters; callers that need authenticity verify the
//! response separately.
//!
//! Alongside the claims, extraction reports the evidence proofs each
//! presentation promises: the `claim.document.evidences` entries whose names
//! the DSR requested under `payload.channels.evidences`.

use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use vpm_vc::Credential;

use crate::dsr::requested_documents;
use crate::manager::{ClaimCriteriaMap, PresentationManager};
use crate::options::VpmOptions;
use crate::types::CredentialArtifacts;

/// PII extraction failures.
#[derive(Error, Debug)]
pub enum PiiError {
    /// The response could not be ingested or mapped.
    #[error("the dsr response on the requirements is invalid")]
    InvalidResponse {
        /// What went wrong, for logs.
        reason: String,
    },
}

/// Formats a non-null claim value for the relying party.
pub trait ClaimFormatter: Send + Sync {
    fn format(&self, value: &Value) -> Value;
}

impl<F> ClaimFormatter for F
where
    F: Fn(&Value) -> Value + Send + Sync,
{
    fn format(&self, value: &Value) -> Value {
        self(value)
    }
}

/// A DSR response: one item per requested credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsrResponse {
    #[serde(default)]
    pub verifiable_data: Vec<VerifiableDataItem>,
}

/// One answered credential request. The credential stays untyped until
/// extraction so that a malformed one fails extraction, not parsing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableDataItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<Value>,
}

/// The evidence documents one presentation promises, keyed by document name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceProof {
    /// The presentation's credential type tag.
    pub name: String,
    pub proofs: Map<String, Value>,
}

/// Result of [`PiiFactory::extract_pii`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedPii {
    pub formatted_claims: IndexMap<String, Option<Value>>,
    pub evidence_proofs: Vec<EvidenceProof>,
}

/// Extracts PII from responses to one DSR.
pub struct PiiFactory {
    dsr_request: Value,
    mapping: ClaimCriteriaMap,
    formatters: BTreeMap<String, Box<dyn ClaimFormatter>>,
}

impl std::fmt::Debug for PiiFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PiiFactory")
            .field("mapping", &self.mapping)
            .field("formatters", &self.formatters.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl PiiFactory {
    pub fn new(dsr_request: Value, mapping: ClaimCriteriaMap) -> Self {
        Self {
            dsr_request,
            mapping,
            formatters: BTreeMap::new(),
        }
    }

    /// Format values of the logical field `name` with `formatter`.
    pub fn with_formatter(mut self, name: impl Into<String>, formatter: impl ClaimFormatter + 'static) -> Self {
        self.formatters.insert(name.into(), Box::new(formatter));
        self
    }

    /// Ingest the response's presentations, map the configured fields, and
    /// format every non-null value that has a formatter.
    ///
    /// # Errors
    ///
    /// [`PiiError::InvalidResponse`] if an item carries no credential, a
    /// credential does not parse, or mapping fails.
    pub async fn extract_pii(&self, response: &DsrResponse) -> Result<ExtractedPii, PiiError> {
        let presentations = response
            .verifiable_data
            .iter()
            .map(|item| {
                let credential = item.credential.clone().ok_or_else(|| invalid("item without credential"))?;
                serde_json::from_value::<Credential>(credential).map_err(|e| invalid(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let evidence_proofs = self.evidence_proofs(&presentations);

        let mut manager = PresentationManager::new(VpmOptions {
            skip_add_verify: true,
            skip_get_verify: true,
            allow_get_unverified: true,
            not_throw: false,
        });
        manager
            .add_credential_artifacts(CredentialArtifacts {
                presentations,
                evidences: Vec::new(),
            })
            .await
            .map_err(|e| invalid(e.to_string()))?;
        let values = manager
            .map_claim_values(&self.mapping)
            .await
            .map_err(|e| invalid(e.to_string()))?;

        let formatted_claims = values
            .into_iter()
            .map(|(name, value)| {
                let formatted = match (value, self.formatters.get(&name)) {
                    (Some(v), Some(formatter)) if !v.is_null() => Some(formatter.format(&v)),
                    (value, _) => value,
                };
                (name, formatted)
            })
            .collect();

        Ok(ExtractedPii {
            formatted_claims,
            evidence_proofs,
        })
    }

    /// Documents both requested by the DSR and promised by `evidence_proofs`,
    /// in DSR order.
    pub fn expected_documents_given_evidence_proofs(&self, evidence_proofs: &[EvidenceProof]) -> Vec<String> {
        let promised: HashSet<&str> = evidence_proofs
            .iter()
            .flat_map(|p| p.proofs.keys().map(String::as_str))
            .collect();
        requested_documents(&self.dsr_request)
            .into_iter()
            .filter(|doc| promised.contains(doc.as_str()))
            .collect()
    }

    fn evidence_proofs(&self, presentations: &[Credential]) -> Vec<EvidenceProof> {
        let requested = requested_documents(&self.dsr_request);
        presentations
            .iter()
            .filter_map(|credential| {
                let offered = credential
                    .subject()
                    .and_then(|s| s.pointer("/document/evidences"))
                    .and_then(Value::as_object)?;
                let proofs: Map<String, Value> = requested
                    .iter()
                    .filter_map(|doc| offered.get(doc).map(|proof| (doc.clone(), proof.clone())))
                    .collect();
                (!proofs.is_empty()).then(|| EvidenceProof {
                    name: credential.identifier.clone(),
                    proofs,
                })
            })
            .collect()
    }
}

fn invalid(reason: impl Into<String>) -> PiiError {
    let reason = reason.into();
    warn!(%reason, "dsr response rejected");
    PiiError::InvalidResponse { reason }
}
