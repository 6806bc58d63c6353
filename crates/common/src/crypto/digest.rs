use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// Size of a SHA-256 digest in bytes
pub const DIGEST_SIZE: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("digest hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// A SHA-256 digest
///
/// Payloads are always explicit bytes; anything structured must be
/// serialized by the caller before hashing. The human readable form is
/// lowercase hex, which is also what gets fed into the next link of the
/// proof-of-storage hash chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Digest([u8; DIGEST_SIZE]);

impl Deref for Digest {
    type Target = [u8; DIGEST_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<[u8; DIGEST_SIZE]> for Digest {
    fn from(bytes: [u8; DIGEST_SIZE]) -> Self {
        Digest(bytes)
    }
}

impl Digest {
    /// SHA-256 over `payload`
    pub fn of(payload: impl AsRef<[u8]>) -> Self {
        Self(Sha256::digest(payload.as_ref()).into())
    }

    /// SHA-256 over the concatenation of `parts`
    pub fn of_parts<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_ref());
        }
        Self(hasher.finalize().into())
    }

    pub fn to_bytes(&self) -> [u8; DIGEST_SIZE] {
        self.0
    }

    /// Lowercase hex rendering
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Accepts both plain and "0x"-prefixed hex, either case
    pub fn from_hex(hex: &str) -> Result<Self, DigestError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut buff = [0; DIGEST_SIZE];
        hex::decode_to_slice(hex, &mut buff)?;
        Ok(Self(buff))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}
