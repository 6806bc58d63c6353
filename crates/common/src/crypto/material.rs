use num_bigint::BigInt;
use num_traits::One;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

use super::bigint::{from_big_endian, to_big_endian};
use super::der::EncodingError;

/// Raw RSA key components as unsigned big-endian byte buffers
///
/// This is the shape both DER encoders consume and the PEM reader produces.
/// A value with `private: None` describes a public key; the modulus and
/// public exponent are enough for that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaKeyMaterial {
    pub modulus: Vec<u8>,
    pub exponent: Vec<u8>,
    pub private: Option<RsaPrivateParts>,
}

/// Private components of an RSA key, in PKCS#1 order
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsaPrivateParts {
    pub private_exponent: Vec<u8>,
    pub prime1: Vec<u8>,
    pub prime2: Vec<u8>,
    /// d mod (p - 1)
    pub exponent1: Vec<u8>,
    /// d mod (q - 1)
    pub exponent2: Vec<u8>,
    /// q^-1 mod p
    pub coefficient: Vec<u8>,
}

// never print private components
impl std::fmt::Debug for RsaPrivateParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaPrivateParts").finish_non_exhaustive()
    }
}

impl RsaKeyMaterial {
    /// Public key material from a modulus and exponent
    pub fn public(modulus: impl Into<Vec<u8>>, exponent: impl Into<Vec<u8>>) -> Self {
        Self {
            modulus: modulus.into(),
            exponent: exponent.into(),
            private: None,
        }
    }

    /// Full key material from `n`, `e`, `d`, `p` and `q`
    ///
    /// The three CRT values are derived here. `p` must be prime, the
    /// coefficient is computed as `q^(p-2) mod p`.
    pub fn from_components(
        n: &[u8],
        e: &[u8],
        d: &[u8],
        p: &[u8],
        q: &[u8],
    ) -> Result<Self, EncodingError> {
        let d_int = from_big_endian(d);
        let p_int = from_big_endian(p);
        let q_int = from_big_endian(q);
        let one = BigInt::one();
        let two = BigInt::from(2u8);

        if p_int <= two {
            return Err(EncodingError::InvalidComponent("prime1"));
        }
        if q_int <= one {
            return Err(EncodingError::InvalidComponent("prime2"));
        }

        let exponent1 = &d_int % (&p_int - &one);
        let exponent2 = &d_int % (&q_int - &one);
        let coefficient = q_int.modpow(&(&p_int - &two), &p_int);

        Ok(Self {
            modulus: n.to_vec(),
            exponent: e.to_vec(),
            private: Some(RsaPrivateParts {
                private_exponent: d.to_vec(),
                prime1: p.to_vec(),
                prime2: q.to_vec(),
                exponent1: to_big_endian(&exponent1),
                exponent2: to_big_endian(&exponent2),
                coefficient: to_big_endian(&coefficient),
            }),
        })
    }

    pub fn is_private(&self) -> bool {
        self.private.is_some()
    }

    /// Drop the private components, if any
    pub fn to_public(&self) -> Self {
        Self::public(self.modulus.clone(), self.exponent.clone())
    }

    /// Build an `rsa` public key from these components
    pub fn to_rsa_public(&self) -> rsa::Result<RsaPublicKey> {
        RsaPublicKey::new(
            BigUint::from_bytes_be(&self.modulus),
            BigUint::from_bytes_be(&self.exponent),
        )
    }

    /// Build an `rsa` private key from these components
    ///
    /// Returns `None` for public-only material.
    pub fn to_rsa_private(&self) -> Option<rsa::Result<RsaPrivateKey>> {
        let private = self.private.as_ref()?;
        Some(RsaPrivateKey::from_components(
            BigUint::from_bytes_be(&self.modulus),
            BigUint::from_bytes_be(&self.exponent),
            BigUint::from_bytes_be(&private.private_exponent),
            vec![
                BigUint::from_bytes_be(&private.prime1),
                BigUint::from_bytes_be(&private.prime2),
            ],
        ))
    }
}

impl From<&RsaPublicKey> for RsaKeyMaterial {
    fn from(key: &RsaPublicKey) -> Self {
        Self::public(key.n().to_bytes_be(), key.e().to_bytes_be())
    }
}

impl TryFrom<&RsaPrivateKey> for RsaKeyMaterial {
    type Error = EncodingError;

    fn try_from(key: &RsaPrivateKey) -> Result<Self, Self::Error> {
        let primes = key.primes();
        if primes.len() != 2 {
            return Err(EncodingError::MultiPrime(primes.len()));
        }
        Self::from_components(
            &key.n().to_bytes_be(),
            &key.e().to_bytes_be(),
            &key.d().to_bytes_be(),
            &primes[0].to_bytes_be(),
            &primes[1].to_bytes_be(),
        )
    }
}
