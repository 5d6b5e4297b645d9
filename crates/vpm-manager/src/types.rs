//! Derived indices, search criteria, ingestion input and status.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use vpm_core::matches_criteria;
use vpm_vc::{Credential, Evidence};

use crate::error::ManagerError;
use crate::options::VpmOptions;

/// A lookup key into the manager's presentation store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationReference {
    /// Credential type tag.
    pub identifier: String,
    /// The presentation id.
    pub uid: String,
}

impl PresentationReference {
    pub fn of(credential: &Credential) -> Self {
        Self {
            identifier: credential.identifier.clone(),
            uid: credential.id.clone(),
        }
    }
}

/// One claim a managed presentation can answer, derived from a proof leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableClaim {
    /// Claim type tag, e.g. `claim-cvc:Contact.email-v1`.
    pub identifier: String,
    /// The owning presentation.
    pub credential_ref: PresentationReference,
    /// Dotted path of the value inside the presentation's subject.
    pub claim_path: String,
}

impl AvailableClaim {
    /// One claim per proof leaf, in leaf order.
    pub fn derive_all(credential: &Credential) -> Vec<Self> {
        let reference = PresentationReference::of(credential);
        credential
            .proof
            .leaves
            .iter()
            .map(|leaf| Self {
                identifier: leaf.identifier.clone(),
                credential_ref: reference.clone(),
                claim_path: leaf.claim_path.clone(),
            })
            .collect()
    }
}

/// Partial filter over [`PresentationReference`] fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

/// Partial filter over [`AvailableClaim`] fields. Unset fields match
/// anything; set fields, at any depth, must be equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchClaimCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_ref: Option<ReferenceCriteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_path: Option<String>,
}

impl SearchClaimCriteria {
    /// Criteria matching a claim type tag.
    pub fn identifier(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            ..Self::default()
        }
    }

    /// Restrict to claims of one presentation.
    pub fn in_presentation(mut self, uid: impl Into<String>) -> Self {
        self.credential_ref.get_or_insert_with(ReferenceCriteria::default).uid = Some(uid.into());
        self
    }

    /// Restrict to one claim path.
    pub fn at_path(mut self, claim_path: impl Into<String>) -> Self {
        self.claim_path = Some(claim_path.into());
        self
    }

    pub fn matches(&self, claim: &AvailableClaim) -> bool {
        match (serde_json::to_value(claim), serde_json::to_value(self)) {
            (Ok(candidate), Ok(criteria)) => matches_criteria(&candidate, &criteria),
            _ => false,
        }
    }
}

/// A named claim value, the flattened form of a claim-value mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedClaimValue {
    pub name: String,
    pub value: Option<Value>,
}

/// Presentations and evidences to ingest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialArtifacts {
    pub presentations: Vec<Credential>,
    pub evidences: Vec<Evidence>,
}

impl CredentialArtifacts {
    /// Parse artifacts shipped as individual JSON documents.
    pub fn from_json_documents<P, E>(presentations: P, evidences: E) -> Result<Self, ManagerError>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let presentations = presentations
            .into_iter()
            .map(|doc| serde_json::from_str(doc.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let evidences = evidences
            .into_iter()
            .map(|doc| serde_json::from_str(doc.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            presentations,
            evidences,
        })
    }
}

/// Verification counts plus the policy they were computed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub verified_presentations: usize,
    pub total_presentations: usize,
    pub verified_evidences: usize,
    pub total_evidences: usize,
    pub config: VpmOptions,
}

impl Status {
    /// Every presentation and every evidence verified.
    pub fn is_complete(&self) -> bool {
        self.verified_presentations == self.total_presentations
            && self.verified_evidences == self.total_evidences
    }
}
