//! Manager error taxonomy.
//!
//! Verification failures surface as errors only when the policy forbids
//! recovering by exclusion (`not_throw == false`). A malformed DSR is never
//! an error; the consent check simply answers `false`.

use thiserror::Error;

/// Errors raised by [`PresentationManager`](crate::PresentationManager).
#[derive(Error, Debug)]
pub enum ManagerError {
    /// A single presentation failed verification.
    #[error("presentation {id} could not be verified")]
    UnverifiedPresentation {
        /// The presentation id.
        id: String,
    },

    /// One or more presentations failed a sweep, in ingestion order.
    #[error("presentations could not be verified: {}", ids.join(", "))]
    UnverifiedPresentations {
        /// Ids of every failing presentation.
        ids: Vec<String>,
    },

    /// A single evidence failed verification.
    #[error("evidence {label} could not be verified")]
    UnverifiedEvidence {
        /// The evidence `content` label.
        label: String,
    },

    /// One or more evidences failed a sweep, in ingestion order.
    #[error("evidences could not be verified: {}", labels.join(", "))]
    UnverifiedEvidences {
        /// Labels of every failing evidence.
        labels: Vec<String>,
    },

    /// An artifact document is not valid JSON for its type.
    #[error("invalid artifact JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Options could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}
