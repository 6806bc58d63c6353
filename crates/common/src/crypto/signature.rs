//! RSA-SHA256 (PKCS#1 v1.5) signing and verification
//!
//! Neither function lets a cryptographic failure escape: `sign` logs and
//! returns `None`, `verify` logs and returns `false`. The protocol treats a
//! missing signature and a bad one the same way, so callers only ever have
//! to branch on the outcome.

use std::fmt;

use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::digest::Digest;

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("signature hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Detached RSA signature bytes
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofSignature(Vec<u8>);

impl From<Vec<u8>> for ProofSignature {
    fn from(bytes: Vec<u8>) -> Self {
        ProofSignature(bytes)
    }
}

impl AsRef<[u8]> for ProofSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl ProofSignature {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(hex: &str) -> Result<Self, SignatureError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        Ok(Self(hex::decode(hex)?))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ProofSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProofSignature({} bytes)", self.0.len())
    }
}

/// Sign `data` with `key`, hashing with SHA-256
///
/// Returns `None` if the primitive rejects the key or the input.
pub fn sign(data: &[u8], key: &RsaPrivateKey) -> Option<ProofSignature> {
    let signing_key = SigningKey::<Sha256>::new(key.clone());
    match signing_key.try_sign(data) {
        Ok(signature) => Some(ProofSignature(signature.to_vec())),
        Err(e) => {
            tracing::warn!("rsa signing failed: {}", e);
            None
        }
    }
}

/// Check `signature` over `data` against `key`
///
/// Two independent paths must both accept: verification over the raw data
/// (hashed by the verifier) and verification of the precomputed SHA-256
/// digest. Any disagreement or error is a failure.
pub fn verify(data: &[u8], signature: &ProofSignature, key: &RsaPublicKey) -> bool {
    let hashed = Digest::of(data);

    let over_data = match Signature::try_from(signature.as_bytes()) {
        Ok(parsed) => VerifyingKey::<Sha256>::new(key.clone())
            .verify(data, &parsed)
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    let over_digest = key
        .verify(Pkcs1v15Sign::new::<Sha256>(), hashed.as_slice(), signature.as_bytes())
        .map_err(|e| e.to_string());

    match (over_data, over_digest) {
        (Ok(()), Ok(())) => true,
        (over_data, over_digest) => {
            tracing::debug!(
                data_path = ?over_data.err(),
                digest_path = ?over_digest.err(),
                "rsa signature rejected"
            );
            false
        }
    }
}
