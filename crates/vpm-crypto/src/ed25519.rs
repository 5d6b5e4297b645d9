//! # Ed25519
//!
//! Credentials carry two Ed25519 signatures: the issuer's signature over
//! the proof's Merkle root and, optionally, the holder's consent grant for
//! one requester/request pair. Both travel inside credential JSON as
//! lowercase hex, so the key and signature types here are thin fixed-size
//! byte arrays that parse from and render to hex.
//!
//! Signing and verification take `&CanonicalBytes` only. The key pair has
//! no serde support and its `Debug` output is redacted.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use vpm_core::{CanonicalBytes, CryptoError};

use crate::hex;

macro_rules! hex_bytes {
    ($(#[$doc:meta])* $name:ident, $len:literal, $what:literal, $err:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name([u8; $len]);

        impl $name {
            #[doc = concat!("Parse a ", $what, " from ", stringify!($len), " hex-encoded bytes.")]
            pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
                hex::decode_array::<$len>(s)
                    .map(Self)
                    .map_err(|e| CryptoError::$err(format!("{}: {e}", $what)))
            }

            pub fn to_hex(&self) -> String {
                hex::encode(&self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}..)", stringify!($name), hex::prefix(&self.0))
            }
        }
    };
}

hex_bytes!(
    /// Issuer or holder verification key, as found in `proof.signature.publicKey`
    /// and `proof.anchor.subject.pub`.
    Ed25519PublicKey,
    32,
    "public key",
    KeyError
);

hex_bytes!(
    /// A detached signature (`signatureValue` or `granted`).
    Ed25519Signature,
    64,
    "signature",
    Decoding
);

impl Ed25519PublicKey {
    fn verifying_key(&self) -> Result<VerifyingKey, CryptoError> {
        VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("not a curve point: {e}")))
    }
}

/// Signing half held by an issuer or a credential holder.
pub struct Ed25519KeyPair(SigningKey);

impl Ed25519KeyPair {
    /// Fresh key from the OS RNG.
    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut rand::rngs::OsRng))
    }

    /// Deterministic key, used by fixtures and tooling that pin identities.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self(SigningKey::from_bytes(seed))
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.0.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &CanonicalBytes) -> Ed25519Signature {
        Ed25519Signature(self.0.sign(message.as_bytes()).to_bytes())
    }
}

impl fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519KeyPair({:?}, ..)", self.public_key())
    }
}

/// Check `signature` over `message` against `key`.
///
/// Keys that do not decode to a curve point fail with
/// [`CryptoError::KeyError`]; everything else that does not verify is
/// [`CryptoError::VerificationFailed`].
pub fn verify_with_public_key(
    message: &CanonicalBytes,
    signature: &Ed25519Signature,
    key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    key.verifying_key()?
        .verify(message.as_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
}
