//! Cryptographic primitives for Entangle
//!
//! - **Key codec**: byte-exact ASN.1 DER for PKCS#1 `RSAPrivateKey` and X.509
//!   `SubjectPublicKeyInfo`, framed as PEM
//! - **Identity**: RSA keypairs (`SecretKey`/`PublicKey`); a node's address is
//!   the SHA-256 of its canonical public key PEM
//! - **Signatures**: RSA-SHA256 with PKCS#1 v1.5 padding, verified along two
//!   independent paths
//!
//! # Encoding rules
//!
//! The public key PEM is itself an input to the proof-of-storage hash chain,
//! so the writer here is not a convenience wrapper: every byte it emits is
//! load bearing. Components are unsigned big-endian buffers, INTEGERs carry a
//! leading zero whenever the high bit would otherwise make them negative, and
//! PEM uses 64 column base64 with `\n` line endings.
//!
//! Reading is lenient in the usual way and delegates to the `pem` and `rsa`
//! crates.

pub mod bigint;
pub mod der;
mod digest;
mod keys;
mod material;
pub mod pem_codec;
mod signature;

pub use der::EncodingError;
pub use digest::{Digest, DigestError, DIGEST_SIZE};
pub use keys::{KeyError, NodeAddress, PublicKey, SecretKey, DEFAULT_KEY_BITS};
pub use material::{RsaKeyMaterial, RsaPrivateParts};
pub use pem_codec::{private_pem, public_pem, read_pem, ParseError};
pub use signature::{sign, verify, ProofSignature, SignatureError};
