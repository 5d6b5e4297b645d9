//! # Evidence
//!
//! Evidence is a supporting file (ID document scan, selfie) shared
//! alongside presentations. It is only trusted when both hold:
//!
//! 1. some *verified* presentation's claim subject mentions its declared
//!    `sha256`, and
//! 2. the SHA-256 of its decoded base64 payload equals that declared hash.

use serde::{Deserialize, Serialize};
use tracing::debug;

use vpm_crypto::payload_sha256_hex;

use crate::credential::Credential;

/// A shared evidence file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Human-readable label, used to name the evidence in errors.
    pub content: String,
    /// MIME type of the payload.
    pub content_type: String,
    /// Declared SHA-256 (lowercase hex) of the decoded payload.
    pub sha256: String,
    /// The payload, plain base64 or a `data:` URI.
    pub base64_encoded: String,
}

/// Checks evidence payloads against verified presentations.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvidenceIntegrityChecker;

impl EvidenceIntegrityChecker {
    /// `true` iff `evidence` is referenced by a verified presentation and its
    /// payload hashes to the declared digest.
    ///
    /// Callers pass only presentations that already passed verification.
    pub fn verify<'a, I>(&self, evidence: &Evidence, verified_presentations: I) -> bool
    where
        I: IntoIterator<Item = &'a Credential>,
    {
        if !self.is_referenced(evidence, verified_presentations) {
            debug!(evidence = %evidence.content, "evidence hash not found in any verified presentation");
            return false;
        }
        match payload_sha256_hex(&evidence.base64_encoded) {
            Ok(actual) if actual == evidence.sha256 => true,
            Ok(actual) => {
                debug!(evidence = %evidence.content, declared = %evidence.sha256, %actual, "evidence payload hash mismatch");
                false
            }
            Err(e) => {
                debug!(evidence = %evidence.content, error = %e, "evidence payload could not be decoded");
                false
            }
        }
    }

    fn is_referenced<'a, I>(&self, evidence: &Evidence, presentations: I) -> bool
    where
        I: IntoIterator<Item = &'a Credential>,
    {
        if evidence.sha256.is_empty() {
            return false;
        }
        presentations.into_iter().any(|p| {
            p.subject()
                .and_then(|s| serde_json::to_string(s).ok())
                .is_some_and(|text| text.contains(&evidence.sha256))
        })
    }
}
