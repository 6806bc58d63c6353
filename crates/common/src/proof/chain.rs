use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::Rejection;
use crate::crypto::{Digest, ProofSignature, PublicKey};

/// Protocol round counter
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Epoch(u64);

impl Epoch {
    pub const fn new(epoch: u64) -> Self {
        Self(epoch)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The following epoch; the counter saturates at `u64::MAX`
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl From<u64> for Epoch {
    fn from(epoch: u64) -> Self {
        Self(epoch)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `SHA256(seed || decimal(epoch))`
pub fn temporal_salt(seed: impl AsRef<[u8]>, epoch: Epoch) -> Digest {
    Digest::of_parts([seed.as_ref(), epoch.to_string().as_bytes()])
}

/// `SHA256(hex(temporal) || public key PEM)`
pub fn mixed_salt(temporal: &Digest, public_key: &PublicKey) -> Digest {
    Digest::of_parts([temporal.to_hex().as_bytes(), public_key.to_pem().as_bytes()])
}

/// `SHA256(chunk || hex(mixed))`
pub fn compute_proof(chunk: impl AsRef<[u8]>, mixed: &Digest) -> Digest {
    Digest::of_parts([chunk.as_ref(), mixed.to_hex().as_bytes()])
}

/// The bytes a proof signature covers
pub fn proof_message(proof: &Digest) -> String {
    proof.to_hex()
}

/// Check a node's answer against the chunk it is supposed to hold
///
/// The digest is compared first; the signature is only checked for a proof
/// that would otherwise be accepted.
pub fn check_proof(
    chunk: impl AsRef<[u8]>,
    mixed: &Digest,
    proof: &Digest,
    signature: &ProofSignature,
    public_key: &PublicKey,
) -> Result<(), Rejection> {
    if compute_proof(chunk, mixed) != *proof {
        return Err(Rejection::DigestMismatch);
    }
    if !public_key.verify(proof_message(proof).as_bytes(), signature) {
        return Err(Rejection::BadSignature);
    }
    Ok(())
}
