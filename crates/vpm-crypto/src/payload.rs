//! # Evidence Payload Hashing
//!
//! Evidence files (document scans, selfies) travel as base64 text, often as
//! a data URI (`data:image/png;base64,....`). Their integrity hash is the
//! SHA-256 of the decoded bytes, rendered as lowercase hex.
//!
//! Evidence payloads are opaque binary content, not structured values, so
//! they are hashed directly rather than through `CanonicalBytes`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use vpm_core::CryptoError;

use crate::hex;

const BASE64_MARKER: &str = ";base64,";

/// Strip a `data:<mime>;base64,` prefix, if present.
///
/// Strings without the `data:` scheme, or without a `;base64,` marker, are
/// returned unchanged.
pub fn strip_data_uri(encoded: &str) -> &str {
    encoded
        .strip_prefix("data:")
        .and_then(|rest| rest.find(BASE64_MARKER).map(|i| &rest[i + BASE64_MARKER.len()..]))
        .unwrap_or(encoded)
}

/// Decode a base64 payload, stripping any data-URI prefix first.
pub fn decode_base64_payload(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD
        .decode(strip_data_uri(encoded).trim())
        .map_err(|e| CryptoError::Decoding(format!("invalid base64 payload: {e}")))
}

/// SHA-256 of a decoded base64 payload, as lowercase hex.
pub fn payload_sha256_hex(encoded: &str) -> Result<String, CryptoError> {
    let bytes = decode_base64_payload(encoded)?;
    Ok(hex::encode(&Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // SHA-256("hello")
    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn strips_data_uri_prefix() {
        assert_eq!(strip_data_uri("data:image/png;base64,aGVsbG8="), "aGVsbG8=");
        assert_eq!(strip_data_uri("aGVsbG8="), "aGVsbG8=");
        assert_eq!(strip_data_uri("data:text/plain,hello"), "data:text/plain,hello");
    }

    #[test]
    fn hashes_plain_and_prefixed_payloads_identically() {
        assert_eq!(payload_sha256_hex("aGVsbG8=").unwrap(), HELLO_SHA256);
        assert_eq!(
            payload_sha256_hex("data:image/jpeg;base64,aGVsbG8=").unwrap(),
            HELLO_SHA256
        );
    }

    #[test]
    fn corrupt_base64_is_a_decoding_error() {
        let err = payload_sha256_hex("data:image/png;base64,%%%").unwrap_err();
        assert!(matches!(err, CryptoError::Decoding(_)));
    }
}
