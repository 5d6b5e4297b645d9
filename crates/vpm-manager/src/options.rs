//! # Manager Policy
//!
//! Four independent flags govern when the manager verifies and what it
//! exposes when verification fails. All default to `false`, which is the
//! strictest policy.
//!
//! | operation                | verifies when                 | unverified item                 |
//! |--------------------------|-------------------------------|---------------------------------|
//! | `list_presentations`     | `!allow_get_unverified`       | excluded, error unless `not_throw` |
//! | `list_claims`            | `!allow_get_unverified`       | excluded, error unless `not_throw` |
//! | `list_presentation_claims` | `!allow && !skip_get_verify` | empty                          |
//! | `find_claims`            | `!allow && !skip_get_verify`  | excluded                        |
//! | `get_claim_value`        | `!allow && !skip_get_verify`  | `None` if `not_throw`, else error |
//! | `list_evidences`         | `!allow_get_unverified`       | excluded, never errors          |
//! | `is_all_artifacts_verified` | `!skip_get_verify` (else last status) | `false`            |
//!
//! Options load from JSON or YAML with camelCase keys; unknown keys are
//! rejected so a misspelled flag cannot silently fall back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ManagerError;

/// Policy flags for a [`PresentationManager`](crate::PresentationManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct VpmOptions {
    /// Do not verify during `add_credential_artifacts`.
    pub skip_add_verify: bool,
    /// Do not verify during single-item reads; trust what was ingested.
    pub skip_get_verify: bool,
    /// Return unverified items from reads instead of filtering them.
    pub allow_get_unverified: bool,
    /// Recover from verification failures by exclusion instead of erroring.
    pub not_throw: bool,
}

impl VpmOptions {
    /// Verify on ingestion and on every read. Slowest, strictest.
    pub const fn secure_redundant() -> Self {
        Self {
            skip_add_verify: false,
            skip_get_verify: false,
            allow_get_unverified: false,
            not_throw: false,
        }
    }

    /// Skip verification on ingestion; verify on read.
    pub const fn secure_fast_ingest() -> Self {
        Self {
            skip_add_verify: true,
            skip_get_verify: false,
            allow_get_unverified: false,
            not_throw: false,
        }
    }

    /// Verify on ingestion only; reads trust the store.
    pub const fn secure_fast_read() -> Self {
        Self {
            skip_add_verify: false,
            skip_get_verify: true,
            allow_get_unverified: true,
            not_throw: false,
        }
    }

    /// Never verify, never error. For trusted pipelines and tests only.
    pub const fn insecure() -> Self {
        Self {
            skip_add_verify: true,
            skip_get_verify: true,
            allow_get_unverified: true,
            not_throw: true,
        }
    }

    /// Parse options from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ManagerError> {
        serde_json::from_str(json).map_err(|e| ManagerError::Config(format!("invalid JSON options: {e}")))
    }

    /// Parse options from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ManagerError> {
        serde_yaml::from_str(yaml).map_err(|e| ManagerError::Config(format!("invalid YAML options: {e}")))
    }

    /// Load options from a file; `.yaml`/`.yml` are parsed as YAML, anything
    /// else as JSON.
    pub fn load(path: &Path) -> Result<Self, ManagerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ManagerError::Config(format!("cannot read {}: {e}", path.display())))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Whether list reads run the presentation sweep.
    pub(crate) fn verifies_lists(&self) -> bool {
        !self.allow_get_unverified
    }

    /// Whether single-item reads verify the owning presentation.
    pub(crate) fn verifies_lookups(&self) -> bool {
        !self.allow_get_unverified && !self.skip_get_verify
    }
}
