use std::fmt;
use std::ops::Deref;

use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

use super::digest::{Digest, DigestError};
use super::material::RsaKeyMaterial;
use super::pem_codec::{private_pem, public_pem, read_pem};
use super::signature::{self, ProofSignature};

/// Default modulus size for generated keys, in bits
pub const DEFAULT_KEY_BITS: usize = 1024;

/// Errors that can occur during key operations
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("key encoding error: {0}")]
    Encoding(#[from] super::der::EncodingError),
    #[error("key parse error: {0}")]
    Parse(#[from] super::pem_codec::ParseError),
}

/// Public identity of a storage node
///
/// The SHA-256 of the node's canonical public key PEM. Ledger entries for a
/// node are tagged with it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeAddress(Digest);

impl NodeAddress {
    pub fn digest(&self) -> &Digest {
        &self.0
    }

    pub fn from_hex(hex: &str) -> Result<Self, DigestError> {
        Ok(Self(Digest::from_hex(hex)?))
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeAddress({})", self.0)
    }
}

/// RSA public key of a storage node
///
/// Keeps the canonical SPKI PEM next to the key. That exact text is an
/// input of the mixed salt, so it is computed once, by our own encoder, and
/// never re-derived from whatever form the key arrived in.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: RsaPublicKey,
    pem: String,
}

impl Deref for PublicKey {
    type Target = RsaPublicKey;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl TryFrom<RsaPublicKey> for PublicKey {
    type Error = KeyError;
    fn try_from(inner: RsaPublicKey) -> Result<Self, Self::Error> {
        let pem = public_pem(&RsaKeyMaterial::from(&inner))?;
        Ok(Self { inner, pem })
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.address())
    }
}

impl PublicKey {
    /// Parse a public key from PEM
    ///
    /// Accepts `PUBLIC KEY` and `RSA PUBLIC KEY` blocks. A private key block
    /// is accepted too and reduced to its public half.
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let material = read_pem(pem)?;
        let inner = material
            .to_rsa_public()
            .map_err(|e| anyhow::anyhow!("invalid rsa public key: {}", e))?;
        Self::try_from(inner)
    }

    /// Canonical `-----BEGIN PUBLIC KEY-----` text
    pub fn to_pem(&self) -> &str {
        &self.pem
    }

    pub fn material(&self) -> RsaKeyMaterial {
        RsaKeyMaterial::from(&self.inner)
    }

    pub fn address(&self) -> NodeAddress {
        NodeAddress(Digest::of(&self.pem))
    }

    /// Verify an RSA-SHA256 signature over `msg`
    pub fn verify(&self, msg: &[u8], signature: &ProofSignature) -> bool {
        signature::verify(msg, signature, &self.inner)
    }
}

/// RSA private key of a storage node
///
/// Never leaves the node. Persisted as a PKCS#1 `RSA PRIVATE KEY` block.
///
/// # Examples
///
/// ```ignore
/// let secret_key = SecretKey::generate(DEFAULT_KEY_BITS)?;
/// let pem = secret_key.to_pem()?;
/// std::fs::write("key.pem", pem)?;
///
/// let pem = std::fs::read_to_string("key.pem")?;
/// let recovered = SecretKey::from_pem(&pem)?;
/// ```
#[derive(Clone)]
pub struct SecretKey {
    inner: RsaPrivateKey,
    public: PublicKey,
}

impl Deref for SecretKey {
    type Target = RsaPrivateKey;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl TryFrom<RsaPrivateKey> for SecretKey {
    type Error = KeyError;
    fn try_from(inner: RsaPrivateKey) -> Result<Self, Self::Error> {
        let public = PublicKey::try_from(inner.to_public_key())?;
        Ok(Self { inner, public })
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({})", self.public.address())
    }
}

impl SecretKey {
    /// Generate a new keypair with a `bits` sized modulus
    pub fn generate(bits: usize) -> Result<Self, KeyError> {
        let mut rng = rand::thread_rng();
        let inner = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| anyhow::anyhow!("rsa key generation failed: {}", e))?;
        Self::try_from(inner)
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    pub fn material(&self) -> Result<RsaKeyMaterial, KeyError> {
        Ok(RsaKeyMaterial::try_from(&self.inner)?)
    }

    /// Encode as a PKCS#1 `RSA PRIVATE KEY` block
    pub fn to_pem(&self) -> Result<String, KeyError> {
        Ok(private_pem(&self.material()?)?)
    }

    /// Parse a PKCS#1 `RSA PRIVATE KEY` block
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let material = read_pem(pem)?;
        let inner = material
            .to_rsa_private()
            .ok_or_else(|| anyhow::anyhow!("PEM does not hold a private key"))?
            .map_err(|e| anyhow::anyhow!("invalid rsa private key: {}", e))?;
        Self::try_from(inner)
    }

    /// Sign `msg` with RSA-SHA256
    ///
    /// `None` means the primitive refused; the failure has been logged.
    pub fn sign(&self, msg: &[u8]) -> Option<ProofSignature> {
        signature::sign(msg, &self.inner)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testkit::{other_test_key, test_key};

    #[test]
    fn test_public_pem_round_trip() {
        let key = test_key();
        let public = key.public();

        let material = read_pem(public.to_pem()).unwrap();
        assert_eq!(material, public.material());

        let recovered = PublicKey::from_pem(public.to_pem()).unwrap();
        assert_eq!(&recovered, public);
        assert_eq!(recovered.address(), public.address());
    }

    #[test]
    fn test_private_pem_round_trip() {
        let key = test_key();
        let pem = key.to_pem().unwrap();
        let recovered = SecretKey::from_pem(&pem).unwrap();
        assert_eq!(recovered.public(), key.public());
        assert_eq!(recovered.to_pem().unwrap(), pem);
    }

    #[test]
    fn test_public_key_from_private_pem() {
        let key = test_key();
        let public = PublicKey::from_pem(&key.to_pem().unwrap()).unwrap();
        assert_eq!(&public, key.public());
    }

    #[test]
    fn test_secret_key_from_public_pem_fails() {
        let key = test_key();
        assert!(SecretKey::from_pem(key.public().to_pem()).is_err());
    }

    #[test]
    fn test_addresses_differ() {
        assert_ne!(test_key().public().address(), other_test_key().public().address());
    }

    #[test]
    fn test_sign_and_verify() {
        let secret_key = test_key();
        let public_key = secret_key.public();
        let message = b"hello, world!";

        let signature = secret_key.sign(message).unwrap();
        assert!(public_key.verify(message, &signature));
        assert!(!public_key.verify(b"hello, world?", &signature));
        assert!(!other_test_key().public().verify(message, &signature));
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let rendered = format!("{:?}", test_key());
        assert!(rendered.starts_with("SecretKey("));
        assert!(!rendered.contains("BEGIN"));
    }
}
