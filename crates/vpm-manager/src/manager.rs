//! # Presentation Manager
//!
//! Owns the shared presentations and evidences of one session and answers
//! queries over them under a [`VpmOptions`] policy.
//!
//! ## Store
//!
//! - `presentations` and `references` are parallel vectors in ingestion
//!   order; `references[i]` is derived from `presentations[i]`.
//! - `claims` holds one [`AvailableClaim`] per proof leaf, in ingestion and
//!   leaf order. `claim_counts[i]` is the length of the contiguous run of
//!   claims derived from `presentations[i]`, so purge drops claims per copy
//!   even when two copies share an id.
//! - Verification state is never stored. Every read that needs it sweeps
//!   the presentations again, sequentially, in ingestion order; only the
//!   last computed [`Status`] is cached.
//!
//! Ingestion and purge take `&mut self`, so no read can observe the indices
//! mid-update. Callers sharing a manager across tasks wrap it in
//! `tokio::sync::RwLock`.
//!
//! ## Duplicate ids
//!
//! Presentations repeating an id already seen in the same ingestion call are
//! dropped. Repeats across calls are kept, and a uid then counts as verified
//! only while every presentation carrying it verifies.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};

use vpm_core::resolve_path;
use vpm_vc::{Credential, Evidence, EvidenceIntegrityChecker, PresentationVerifier};

use crate::dsr::GrantScope;
use crate::error::ManagerError;
use crate::options::VpmOptions;
use crate::types::{
    AvailableClaim, CredentialArtifacts, NamedClaimValue, PresentationReference,
    SearchClaimCriteria, Status,
};

/// Logical name → claim criteria, as used by [`PresentationManager::map_claim_values`].
/// Results keep the mapping's insertion order.
pub type ClaimCriteriaMap = IndexMap<String, SearchClaimCriteria>;

/// Policy-gated store of shared presentations and evidences.
#[derive(Debug)]
pub struct PresentationManager {
    options: VpmOptions,
    verifier: PresentationVerifier,
    evidence_checker: EvidenceIntegrityChecker,
    presentations: Vec<Credential>,
    references: Vec<PresentationReference>,
    evidences: Vec<Evidence>,
    claims: Vec<AvailableClaim>,
    claim_counts: Vec<usize>,
    last_status: Mutex<Option<Status>>,
}

/// Outcome of one presentation sweep, aligned with the store.
struct Sweep {
    verdicts: Vec<bool>,
}

impl Sweep {
    fn failing_ids(&self, presentations: &[Credential]) -> Vec<String> {
        presentations
            .iter()
            .zip(&self.verdicts)
            .filter(|(_, ok)| !**ok)
            .map(|(p, _)| p.id.clone())
            .collect()
    }

    fn verified<'a>(&self, presentations: &'a [Credential]) -> Vec<&'a Credential> {
        presentations
            .iter()
            .zip(&self.verdicts)
            .filter(|(_, ok)| **ok)
            .map(|(p, _)| p)
            .collect()
    }

    /// Uids whose every presentation verified.
    fn verified_uids<'a>(&self, presentations: &'a [Credential]) -> HashSet<&'a str> {
        let mut rejected = HashSet::new();
        let mut accepted = HashSet::new();
        for (p, ok) in presentations.iter().zip(&self.verdicts) {
            if *ok {
                accepted.insert(p.id.as_str());
            } else {
                rejected.insert(p.id.as_str());
            }
        }
        accepted.retain(|uid| !rejected.contains(uid));
        accepted
    }
}

impl PresentationManager {
    /// A manager with the permissive default verifier (structural checks
    /// only; anchor and signature always pass).
    pub fn new(options: VpmOptions) -> Self {
        Self::with_verifier(options, PresentationVerifier::new())
    }

    pub fn with_verifier(options: VpmOptions, verifier: PresentationVerifier) -> Self {
        Self {
            options,
            verifier,
            evidence_checker: EvidenceIntegrityChecker,
            presentations: Vec::new(),
            references: Vec::new(),
            evidences: Vec::new(),
            claims: Vec::new(),
            claim_counts: Vec::new(),
            last_status: Mutex::new(None),
        }
    }

    /// Verify on ingestion and on every read.
    pub fn secure_redundant(verifier: PresentationVerifier) -> Self {
        Self::with_verifier(VpmOptions::secure_redundant(), verifier)
    }

    /// Skip verification on ingestion; verify on read.
    pub fn secure_fast_ingest(verifier: PresentationVerifier) -> Self {
        Self::with_verifier(VpmOptions::secure_fast_ingest(), verifier)
    }

    /// Verify on ingestion only.
    pub fn secure_fast_read(verifier: PresentationVerifier) -> Self {
        Self::with_verifier(VpmOptions::secure_fast_read(), verifier)
    }

    /// Never verify. Reads expose everything that was ingested.
    pub fn insecure() -> Self {
        Self::new(VpmOptions::insecure())
    }

    pub fn options(&self) -> &VpmOptions {
        &self.options
    }

    /// The status computed by the most recent successful ingestion, sweep,
    /// or purge.
    pub fn last_status(&self) -> Option<Status> {
        self.last_status.lock().clone()
    }

    // -- Ingestion -------------------------------------------------------------

    /// Append artifacts and derive their references and claims.
    ///
    /// Unless `skip_add_verify`, runs [`verify_all_artifacts`] and returns
    /// its result; failing artifacts stay in the store either way. With
    /// `skip_add_verify`, returns a status with zero verified counts.
    ///
    /// [`verify_all_artifacts`]: Self::verify_all_artifacts
    pub async fn add_credential_artifacts(
        &mut self,
        artifacts: CredentialArtifacts,
    ) -> Result<Status, ManagerError> {
        let CredentialArtifacts {
            presentations,
            evidences,
        } = artifacts;

        let mut seen = HashSet::new();
        let mut added = 0usize;
        for presentation in presentations {
            if !seen.insert(presentation.id.clone()) {
                debug!(presentation_id = %presentation.id, "duplicate presentation in batch dropped");
                continue;
            }
            let derived = AvailableClaim::derive_all(&presentation);
            self.references.push(PresentationReference::of(&presentation));
            self.claim_counts.push(derived.len());
            self.claims.extend(derived);
            self.presentations.push(presentation);
            added += 1;
        }
        let evidence_count = evidences.len();
        self.evidences.extend(evidences);
        info!(
            presentations = added,
            evidences = evidence_count,
            total_presentations = self.presentations.len(),
            total_evidences = self.evidences.len(),
            "credential artifacts ingested"
        );

        if self.options.skip_add_verify {
            let status = self.status_with(0, 0);
            *self.last_status.lock() = Some(status.clone());
            return Ok(status);
        }
        self.verify_all_artifacts().await
    }

    // -- Verification ----------------------------------------------------------

    /// Verify every presentation, then every evidence against the verified
    /// presentations, and cache the resulting status.
    ///
    /// # Errors
    ///
    /// Unless `not_throw`: [`ManagerError::UnverifiedPresentations`] naming
    /// every failing presentation, else
    /// [`ManagerError::UnverifiedEvidences`] naming every failing evidence.
    /// The cached status is left untouched on error.
    pub async fn verify_all_artifacts(&self) -> Result<Status, ManagerError> {
        let sweep = self.sweep_presentations().await;
        let failing = sweep.failing_ids(&self.presentations);
        if !failing.is_empty() && !self.options.not_throw {
            return Err(ManagerError::UnverifiedPresentations { ids: failing });
        }

        let verified = sweep.verified(&self.presentations);
        let evidence_verdicts = self.evidence_verdicts(&verified);
        let failing_labels: Vec<String> = self
            .evidences
            .iter()
            .zip(&evidence_verdicts)
            .filter(|(_, ok)| !**ok)
            .map(|(e, _)| e.content.clone())
            .collect();
        if !failing_labels.is_empty() && !self.options.not_throw {
            return Err(ManagerError::UnverifiedEvidences {
                labels: failing_labels,
            });
        }

        let verified_evidences = evidence_verdicts.iter().filter(|ok| **ok).count();
        let status = self.status_with(verified.len(), verified_evidences);
        debug!(?status, "artifacts verified");
        *self.last_status.lock() = Some(status.clone());
        Ok(status)
    }

    /// Whether every presentation and evidence verifies.
    ///
    /// With `skip_get_verify` the last computed status is trusted instead of
    /// re-verifying; with no status yet, only an empty store counts as
    /// verified.
    pub async fn is_all_artifacts_verified(&self) -> bool {
        if self.options.skip_get_verify {
            return match self.last_status() {
                Some(status) => status.is_complete(),
                None => self.presentations.is_empty() && self.evidences.is_empty(),
            };
        }
        let status = self.tolerant_status().await;
        let complete = status.is_complete();
        *self.last_status.lock() = Some(status);
        complete
    }

    /// Drop every presentation and evidence that fails verification, along
    /// with the references and claims derived from dropped presentations.
    pub async fn purge_invalid_artifacts(&mut self) -> Status {
        let sweep = self.sweep_presentations().await;
        let evidence_verdicts = self.evidence_verdicts(&sweep.verified(&self.presentations));

        let before = (self.presentations.len(), self.evidences.len());
        let mut verdicts = sweep.verdicts.iter();
        self.presentations.retain(|_| verdicts.next().copied().unwrap_or(false));
        let mut verdicts = sweep.verdicts.iter();
        self.references.retain(|_| verdicts.next().copied().unwrap_or(false));
        let mut verdicts = evidence_verdicts.iter();
        self.evidences.retain(|_| verdicts.next().copied().unwrap_or(false));

        let mut claim_verdicts = self
            .claim_counts
            .iter()
            .zip(&sweep.verdicts)
            .flat_map(|(count, ok)| std::iter::repeat(*ok).take(*count));
        self.claims.retain(|_| claim_verdicts.next().unwrap_or(false));
        let mut verdicts = sweep.verdicts.iter();
        self.claim_counts.retain(|_| verdicts.next().copied().unwrap_or(false));

        info!(
            purged_presentations = before.0 - self.presentations.len(),
            purged_evidences = before.1 - self.evidences.len(),
            "invalid artifacts purged"
        );
        let status = self.status_with(self.presentations.len(), self.evidences.len());
        *self.last_status.lock() = Some(status.clone());
        status
    }

    // -- Reads -----------------------------------------------------------------

    /// References of the managed presentations.
    ///
    /// Unless `allow_get_unverified`, only verified presentations are listed,
    /// and any failure is an error unless `not_throw`.
    pub async fn list_presentations(&self) -> Result<Vec<PresentationReference>, ManagerError> {
        let Some(verified) = self.gate_list().await? else {
            return Ok(self.references.clone());
        };
        Ok(self
            .references
            .iter()
            .filter(|r| verified.contains(r.uid.as_str()))
            .cloned()
            .collect())
    }

    /// Every available claim, gated like [`list_presentations`](Self::list_presentations).
    pub async fn list_claims(&self) -> Result<Vec<AvailableClaim>, ManagerError> {
        let Some(verified) = self.gate_list().await? else {
            return Ok(self.claims.clone());
        };
        Ok(self
            .claims
            .iter()
            .filter(|c| verified.contains(c.credential_ref.uid.as_str()))
            .cloned()
            .collect())
    }

    /// Claims of one presentation; empty when it fails verification.
    pub async fn list_presentation_claims(
        &self,
        reference: &PresentationReference,
    ) -> Vec<AvailableClaim> {
        if self.options.verifies_lookups() && !self.is_uid_verified(&reference.uid).await {
            return Vec::new();
        }
        self.claims
            .iter()
            .filter(|c| c.credential_ref.uid == reference.uid)
            .cloned()
            .collect()
    }

    /// Claims matching `criteria`, excluding claims of presentations that
    /// fail verification.
    pub async fn find_claims(&self, criteria: &SearchClaimCriteria) -> Vec<AvailableClaim> {
        let matching: Vec<&AvailableClaim> =
            self.claims.iter().filter(|c| criteria.matches(c)).collect();
        if !self.options.verifies_lookups() {
            return matching.into_iter().cloned().collect();
        }

        let mut verdicts: HashMap<&str, bool> = HashMap::new();
        let mut found = Vec::with_capacity(matching.len());
        for claim in matching {
            let uid = claim.credential_ref.uid.as_str();
            let ok = match verdicts.get(uid) {
                Some(ok) => *ok,
                None => {
                    let ok = self.is_uid_verified(uid).await;
                    verdicts.insert(uid, ok);
                    ok
                }
            };
            if ok {
                found.push(claim.clone());
            }
        }
        found
    }

    /// The value a claim points at inside its presentation's subject.
    ///
    /// `None` when the presentation, its subject, or the path is absent.
    ///
    /// # Errors
    ///
    /// [`ManagerError::UnverifiedPresentation`] when the owning presentation
    /// fails verification, unless `not_throw` (then `None`).
    pub async fn get_claim_value(&self, claim: &AvailableClaim) -> Result<Option<Value>, ManagerError> {
        let uid = &claim.credential_ref.uid;
        let Some(presentation) = self.presentations.iter().find(|p| &p.id == uid) else {
            return Ok(None);
        };
        let Some(subject) = presentation.subject() else {
            return Ok(None);
        };
        if self.options.verifies_lookups() && !self.is_uid_verified(uid).await {
            if self.options.not_throw {
                return Ok(None);
            }
            return Err(ManagerError::UnverifiedPresentation { id: uid.clone() });
        }
        Ok(resolve_path(subject, &claim.claim_path).cloned())
    }

    /// For each logical name, the value of the first claim matching its
    /// criteria, or `None`.
    pub async fn map_claim_values(
        &self,
        mapping: &ClaimCriteriaMap,
    ) -> Result<IndexMap<String, Option<Value>>, ManagerError> {
        let mut values = IndexMap::with_capacity(mapping.len());
        for (name, criteria) in mapping {
            values.insert(name.clone(), self.first_claim_value(criteria).await?);
        }
        Ok(values)
    }

    /// [`map_claim_values`](Self::map_claim_values) as `{name, value}` pairs,
    /// in mapping order.
    pub async fn map_claim_values_flattened(
        &self,
        mapping: &ClaimCriteriaMap,
    ) -> Result<Vec<NamedClaimValue>, ManagerError> {
        Ok(self
            .map_claim_values(mapping)
            .await?
            .into_iter()
            .map(|(name, value)| NamedClaimValue { name, value })
            .collect())
    }

    /// Evidences, filtered to those passing the integrity check unless
    /// `allow_get_unverified`. Never errors.
    pub async fn list_evidences(&self) -> Vec<Evidence> {
        if !self.options.verifies_lists() {
            return self.evidences.clone();
        }
        let sweep = self.sweep_presentations().await;
        let verdicts = self.evidence_verdicts(&sweep.verified(&self.presentations));
        self.evidences
            .iter()
            .zip(verdicts)
            .filter(|(_, ok)| *ok)
            .map(|(e, _)| e.clone())
            .collect()
    }

    /// Whether the referenced presentation carries a valid consent grant for
    /// the requester and request named in `dsr_json`.
    ///
    /// `false`, never an error, for malformed DSRs or unknown presentations.
    pub fn was_granted_for_dsr(&self, reference: &PresentationReference, dsr_json: &str) -> bool {
        let Some(scope) = GrantScope::from_dsr_json(dsr_json) else {
            debug!(uid = %reference.uid, "DSR carries no requester/request id");
            return false;
        };
        let Some(presentation) = self.presentations.iter().find(|p| p.id == reference.uid) else {
            debug!(uid = %reference.uid, "grant check for unknown presentation");
            return false;
        };
        self.verifier
            .verify_grant(presentation, &scope.requester_id, &scope.request_id)
    }

    // -- Internals -------------------------------------------------------------

    async fn verify_presentation(&self, presentation: &Credential) -> bool {
        let ok = self
            .verifier
            .cryptographically_secure_verify(presentation)
            .await;
        if ok {
            debug!(presentation_id = %presentation.id, "presentation verified");
        } else {
            warn!(
                presentation_id = %presentation.id,
                identifier = %presentation.identifier,
                "presentation rejected"
            );
        }
        ok
    }

    async fn sweep_presentations(&self) -> Sweep {
        let mut verdicts = Vec::with_capacity(self.presentations.len());
        for presentation in &self.presentations {
            verdicts.push(self.verify_presentation(presentation).await);
        }
        Sweep { verdicts }
    }

    fn evidence_verdicts(&self, verified: &[&Credential]) -> Vec<bool> {
        self.evidences
            .iter()
            .map(|evidence| {
                let ok = self
                    .evidence_checker
                    .verify(evidence, verified.iter().copied());
                if ok {
                    debug!(evidence = %evidence.content, "evidence verified");
                } else {
                    warn!(evidence = %evidence.content, "evidence rejected");
                }
                ok
            })
            .collect()
    }

    async fn is_uid_verified(&self, uid: &str) -> bool {
        let mut found = false;
        for presentation in self.presentations.iter().filter(|p| p.id == uid) {
            found = true;
            if !self.verify_presentation(presentation).await {
                return false;
            }
        }
        found
    }

    /// `None` when lists are not gated; otherwise the verified uids.
    async fn gate_list(&self) -> Result<Option<HashSet<&str>>, ManagerError> {
        if !self.options.verifies_lists() {
            return Ok(None);
        }
        let sweep = self.sweep_presentations().await;
        let failing = sweep.failing_ids(&self.presentations);
        if !failing.is_empty() && !self.options.not_throw {
            return Err(ManagerError::UnverifiedPresentations { ids: failing });
        }
        Ok(Some(sweep.verified_uids(&self.presentations)))
    }

    async fn first_claim_value(
        &self,
        criteria: &SearchClaimCriteria,
    ) -> Result<Option<Value>, ManagerError> {
        match self.find_claims(criteria).await.first() {
            Some(claim) => self.get_claim_value(claim).await,
            None => Ok(None),
        }
    }

    async fn tolerant_status(&self) -> Status {
        let sweep = self.sweep_presentations().await;
        let verified = sweep.verified(&self.presentations);
        let verified_evidences = self
            .evidence_verdicts(&verified)
            .into_iter()
            .filter(|ok| *ok)
            .count();
        self.status_with(verified.len(), verified_evidences)
    }

    fn status_with(&self, verified_presentations: usize, verified_evidences: usize) -> Status {
        Status {
            verified_presentations,
            total_presentations: self.presentations.len(),
            verified_evidences,
            total_evidences: self.evidences.len(),
            config: self.options,
        }
    }
}
