//! # Merkle Inclusion Paths
//!
//! Every proof leaf of a credential carries a `targetHash` and a `node`
//! array: the sibling hashes needed to recompute the credential's
//! `merkleRoot` from that leaf alone. This is what lets a holder present a
//! subset of a credential's claims while each remaining leaf still verifies
//! against the issuer-signed root.
//!
//! ## Algorithm
//!
//! - Leaves are the 32-byte target hashes (64 hex chars) in proof order.
//! - Parent: `SHA256(0x01 || left || right)`.
//! - Levels are built pairwise left to right; an odd trailing node is
//!   carried up unchanged and contributes no step to its inclusion path.
//!
//! A path step names the side the sibling sits on: `{"left": hex}` means
//! `parent = node_hash(sibling, current)`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use vpm_core::CryptoError;

use crate::hex;

/// One step of an inclusion path: the sibling hash and its side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MerkleStep {
    /// The sibling is the left child; the running hash is on the right.
    Left(String),
    /// The sibling is the right child; the running hash is on the left.
    Right(String),
}

fn decode_32(hex_str: &str) -> Result<[u8; 32], CryptoError> {
    hex::decode_array::<32>(hex_str).map_err(CryptoError::DigestError)
}

/// Compute a parent node hash: `SHA256(0x01 || left || right)`.
pub fn node_hash(left_hex: &str, right_hex: &str) -> Result<String, CryptoError> {
    let left = decode_32(left_hex)?;
    let right = decode_32(right_hex)?;
    let mut hasher = Sha256::new();
    hasher.update([0x01]);
    hasher.update(left);
    hasher.update(right);
    Ok(hex::encode(&hasher.finalize()))
}

/// Recompute a root by folding a leaf hash through its inclusion path.
pub fn fold_path(leaf_hex: &str, steps: &[MerkleStep]) -> Result<String, CryptoError> {
    let mut current = hex::encode(&decode_32(leaf_hex)?);
    for step in steps {
        current = match step {
            MerkleStep::Left(sibling) => node_hash(sibling, &current)?,
            MerkleStep::Right(sibling) => node_hash(&current, sibling)?,
        };
    }
    Ok(current)
}

/// A fully materialized Merkle tree over proof-leaf target hashes.
///
/// Used on the issuing side to compute the root and each leaf's path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    levels: Vec<Vec<String>>,
}

impl MerkleTree {
    /// Build a tree from leaf hashes (64-char hex each), in proof order.
    ///
    /// # Errors
    ///
    /// Fails on an empty leaf list or a malformed leaf hash.
    pub fn build(leaf_hashes: &[String]) -> Result<Self, CryptoError> {
        if leaf_hashes.is_empty() {
            return Err(CryptoError::DigestError(
                "cannot build a Merkle tree without leaves".to_string(),
            ));
        }
        let first = leaf_hashes
            .iter()
            .map(|h| decode_32(h).map(|b| hex::encode(&b)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut levels = vec![first];
        loop {
            let level = &levels[levels.len() - 1];
            if level.len() <= 1 {
                break;
            }
            let next = level
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => node_hash(left, right),
                    _ => Ok(pair[0].clone()),
                })
                .collect::<Result<Vec<_>, _>>()?;
            levels.push(next);
        }
        Ok(Self { levels })
    }

    /// The root hash.
    pub fn root(&self) -> &str {
        // build() guarantees at least one level whose last entry is the root.
        self.levels
            .last()
            .and_then(|l| l.first())
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// The inclusion path for the leaf at `index`, or `None` if out of range.
    pub fn path(&self, index: usize) -> Option<Vec<MerkleStep>> {
        if index >= self.leaf_count() {
            return None;
        }
        let mut steps = Vec::new();
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            if idx % 2 == 1 {
                steps.push(MerkleStep::Left(level[idx - 1].clone()));
            } else if let Some(sibling) = level.get(idx + 1) {
                steps.push(MerkleStep::Right(sibling.clone()));
            }
            idx /= 2;
        }
        Some(steps)
    }
}
