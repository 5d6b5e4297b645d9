//! # Dynamic Scope Requests
//!
//! A DSR is the signed request a relying party sends to a holder. The
//! manager reads only a few fields of it:
//!
//! - `payload.id` and `payload.requesterInfo.requesterId`, which a consent
//!   grant is bound to;
//! - `payload.channels.evidences`, whose keys name the evidence documents
//!   the requester wants uploaded.
//!
//! Everything else is ignored, and no field is required to be present.

use serde_json::Value;

/// The request/requester pair a consent grant is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantScope {
    pub requester_id: String,
    pub request_id: String,
}

impl GrantScope {
    /// Extract the grant scope from a DSR document.
    ///
    /// `None` for malformed JSON or when either id is absent, not a string,
    /// or empty.
    pub fn from_dsr_json(dsr_json: &str) -> Option<Self> {
        let dsr: Value = serde_json::from_str(dsr_json).ok()?;
        Self::from_dsr(&dsr)
    }

    pub fn from_dsr(dsr: &Value) -> Option<Self> {
        let non_empty = |pointer: &str| {
            dsr.pointer(pointer)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Some(Self {
            requester_id: non_empty("/payload/requesterInfo/requesterId")?,
            request_id: non_empty("/payload/id")?,
        })
    }
}

/// Names of the evidence documents a DSR requests, in the order the DSR
/// lists them under `payload.channels.evidences`.
pub fn requested_documents(dsr: &Value) -> Vec<String> {
    dsr.pointer("/payload/channels/evidences")
        .and_then(Value::as_object)
        .map(|channels| channels.keys().cloned().collect())
        .unwrap_or_default()
}
