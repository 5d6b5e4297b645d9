//! # vpm-vc: Credentials, Evidence, and the Presentation Verifier
//!
//! - **Credential** ([`Credential`]): a (possibly partial) verifiable
//!   credential whose claims are each backed by a Merkle-proofed leaf.
//! - **Proof checks** ([`proof`]): leaf target hashes, inclusion paths to
//!   the Merkle root, and leaf-value vs. claim-subject agreement.
//! - **Verifier** ([`PresentationVerifier`]): structural verification plus
//!   pluggable anchor and signature strategies, and consent-grant checks.
//! - **Evidence** ([`Evidence`], [`EvidenceIntegrityChecker`]): supporting
//!   files bound to a verified credential by their SHA-256.
//! - **Issuance** ([`CredentialIssuer`]): mints credentials in the format
//!   the verifier checks.
//!
//! ## Security Invariant
//!
//! Every hashed or signed structured value goes through
//! [`CanonicalBytes`](vpm_core::CanonicalBytes). Issuance and verification
//! share the same input constructors in [`proof`].

pub mod credential;
pub mod evidence;
pub mod issue;
pub mod proof;
pub mod verifier;

pub use credential::{Credential, CredentialError, CredentialProof, ProofLeaf, ProofSignature};
pub use evidence::{Evidence, EvidenceIntegrityChecker};
pub use issue::{CredentialDraft, CredentialIssuer};
pub use proof::{check_structure, leaf_target_hash, ProofDefect};
pub use verifier::{
    AlwaysValid, AnchorVerifier, Ed25519SignatureVerifier, FnCheck, PresentationVerifier,
    SignatureVerifier,
};
