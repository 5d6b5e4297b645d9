//! # vpm-manager: Verifiable Presentation Manager
//!
//! Receives credentials ("presentations") and evidence files shared by a
//! holder, verifies them, and answers claim queries under a configurable
//! policy.
//!
//! - [`PresentationManager`]: ingestion, verification sweeps, gated reads,
//!   consent-grant checks and purge.
//! - [`VpmOptions`]: the four policy flags and their named presets.
//! - [`PiiFactory`]: maps a DSR response onto a relying party's flat PII
//!   record.
//!
//! ## Verification
//!
//! A manager built with [`PresentationManager::new`] uses the permissive
//! default [`PresentationVerifier`]: structural proof checks run, anchor
//! and signature checks always pass. Install real strategies with
//! [`PresentationManager::with_verifier`] before trusting any result.
//!
//! ## Logging
//!
//! The crate emits `tracing` events (verification decisions at `debug`,
//! rejections at `warn`, ingestion and purge summaries at `info`) and never
//! installs a subscriber.

pub mod dsr;
pub mod error;
pub mod manager;
pub mod options;
pub mod pii;
pub mod types;

pub use dsr::GrantScope;
pub use error::ManagerError;
pub use manager::{ClaimCriteriaMap, PresentationManager};
pub use options::VpmOptions;
pub use pii::{ClaimFormatter, DsrResponse, EvidenceProof, ExtractedPii, PiiError, PiiFactory, VerifiableDataItem};
pub use types::{
    AvailableClaim, CredentialArtifacts, NamedClaimValue, PresentationReference,
    ReferenceCriteria, SearchClaimCriteria, Status,
};

pub use vpm_vc::{
    AlwaysValid, AnchorVerifier, Credential, Evidence, FnCheck, PresentationVerifier,
    SignatureVerifier,
};
