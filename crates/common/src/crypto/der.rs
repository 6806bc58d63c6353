//! Minimal ASN.1 DER writer for RSA keys
//!
//! Only the handful of element types needed for PKCS#1 `RSAPrivateKey` and
//! X.509 `SubjectPublicKeyInfo` are supported. Everything is written onto a
//! caller provided `Vec<u8>`; nested structures are built in a scratch buffer
//! first so their length is known before the header is emitted.

use super::material::RsaKeyMaterial;

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_BIT_STRING: u8 = 0x03;
pub const TAG_NULL: u8 = 0x05;
pub const TAG_OID: u8 = 0x06;
pub const TAG_SEQUENCE: u8 = 0x30;

/// DER body of OID 1.2.840.113549.1.1.1 (rsaEncryption)
pub const RSA_ENCRYPTION_OID: [u8; 9] = [0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01];

/// Errors raised while encoding key material
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// A private encoding was requested for public-only material
    #[error("key material has no private components")]
    MissingPrivateParts,
    /// A required component is empty
    #[error("key component `{0}` is empty")]
    EmptyComponent(&'static str),
    /// A component has a value no RSA key can have
    #[error("key component `{0}` is invalid")]
    InvalidComponent(&'static str),
    #[error("multi-prime keys are not supported, got {0} primes")]
    MultiPrime(usize),
}

/// Append a DER length field
///
/// Short form below 128, otherwise `0x80 | k` followed by the `k`
/// big-endian bytes of `len`, with `k` minimal.
pub fn encode_length(len: usize, out: &mut Vec<u8>) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }

    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let significant = &bytes[skip..];
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
}

/// Append a DER INTEGER holding the big-endian `value`
///
/// Leading zero bytes are stripped. When `force_unsigned` is set and the
/// first remaining byte has its high bit set a zero byte is prepended, so
/// the integer never reads as negative.
pub fn encode_integer_be(value: &[u8], force_unsigned: bool, out: &mut Vec<u8>) {
    out.push(TAG_INTEGER);

    let skip = value.iter().take_while(|b| **b == 0).count();
    let significant = &value[skip..];

    if significant.is_empty() {
        encode_length(1, out);
        out.push(0);
        return;
    }

    if force_unsigned && significant[0] > 0x7f {
        encode_length(significant.len() + 1, out);
        out.push(0);
    } else {
        encode_length(significant.len(), out);
    }
    out.extend_from_slice(significant);
}

/// Append `tag`, the length of `content` and `content`
pub fn encode_element(tag: u8, content: &[u8], out: &mut Vec<u8>) {
    out.push(tag);
    encode_length(content.len(), out);
    out.extend_from_slice(content);
}

pub fn encode_sequence(content: &[u8], out: &mut Vec<u8>) {
    encode_element(TAG_SEQUENCE, content, out);
}

/// BIT STRING with zero unused bits
pub fn encode_bit_string(content: &[u8], out: &mut Vec<u8>) {
    out.push(TAG_BIT_STRING);
    encode_length(content.len() + 1, out);
    out.push(0x00);
    out.extend_from_slice(content);
}

pub fn encode_oid(body: &[u8], out: &mut Vec<u8>) {
    encode_element(TAG_OID, body, out);
}

pub fn encode_null(out: &mut Vec<u8>) {
    encode_element(TAG_NULL, &[], out);
}

fn check_public(key: &RsaKeyMaterial) -> Result<(), EncodingError> {
    if key.modulus.is_empty() {
        return Err(EncodingError::EmptyComponent("modulus"));
    }
    if key.exponent.is_empty() {
        return Err(EncodingError::EmptyComponent("exponent"));
    }
    Ok(())
}

/// PKCS#1 `RSAPrivateKey`
///
/// ```text
/// RSAPrivateKey ::= SEQUENCE {
///     version           Version,
///     modulus           INTEGER,  -- n
///     publicExponent    INTEGER,  -- e
///     privateExponent   INTEGER,  -- d
///     prime1            INTEGER,  -- p
///     prime2            INTEGER,  -- q
///     exponent1         INTEGER,  -- d mod (p-1)
///     exponent2         INTEGER,  -- d mod (q-1)
///     coefficient       INTEGER,  -- (inverse of q) mod p
/// }
/// ```
pub fn private_key_der(key: &RsaKeyMaterial) -> Result<Vec<u8>, EncodingError> {
    check_public(key)?;
    let private = key
        .private
        .as_ref()
        .ok_or(EncodingError::MissingPrivateParts)?;

    let mut inner = Vec::new();
    // version 0, two-prime
    encode_integer_be(&[0x00], true, &mut inner);
    for component in [
        &key.modulus,
        &key.exponent,
        &private.private_exponent,
        &private.prime1,
        &private.prime2,
        &private.exponent1,
        &private.exponent2,
        &private.coefficient,
    ] {
        encode_integer_be(component, true, &mut inner);
    }

    let mut out = Vec::with_capacity(inner.len() + 4);
    encode_sequence(&inner, &mut out);
    Ok(out)
}

/// X.509 `SubjectPublicKeyInfo` wrapping a PKCS#1 `RSAPublicKey`
///
/// ```text
/// SubjectPublicKeyInfo ::= SEQUENCE {
///     algorithm         SEQUENCE { rsaEncryption OID, NULL },
///     subjectPublicKey  BIT STRING { SEQUENCE { n INTEGER, e INTEGER } }
/// }
/// ```
pub fn public_key_der(key: &RsaKeyMaterial) -> Result<Vec<u8>, EncodingError> {
    check_public(key)?;

    let mut algorithm = Vec::with_capacity(13);
    encode_oid(&RSA_ENCRYPTION_OID, &mut algorithm);
    encode_null(&mut algorithm);

    let mut params = Vec::new();
    encode_integer_be(&key.modulus, true, &mut params);
    encode_integer_be(&key.exponent, true, &mut params);
    let mut rsa_public_key = Vec::with_capacity(params.len() + 4);
    encode_sequence(&params, &mut rsa_public_key);

    let mut inner = Vec::new();
    encode_sequence(&algorithm, &mut inner);
    encode_bit_string(&rsa_public_key, &mut inner);

    let mut out = Vec::with_capacity(inner.len() + 4);
    encode_sequence(&inner, &mut out);
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    fn length(len: usize) -> Vec<u8> {
        let mut out = Vec::new();
        encode_length(len, &mut out);
        out
    }

    fn integer(value: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        encode_integer_be(value, true, &mut out);
        out
    }

    #[test]
    fn test_length_short_form() {
        assert_eq!(length(0), vec![0x00]);
        assert_eq!(length(1), vec![0x01]);
        assert_eq!(length(127), vec![0x7f]);
    }

    #[test]
    fn test_length_long_form() {
        assert_eq!(length(128), vec![0x81, 0x80]);
        assert_eq!(length(255), vec![0x81, 0xff]);
        assert_eq!(length(256), vec![0x82, 0x01, 0x00]);
        assert_eq!(length(0x01_00_00), vec![0x83, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_integer_high_bit_gets_zero_prefix() {
        assert_eq!(integer(&[0xff]), vec![0x02, 0x02, 0x00, 0xff]);
        assert_eq!(integer(&[0x80, 0x01]), vec![0x02, 0x03, 0x00, 0x80, 0x01]);
    }

    #[test]
    fn test_integer_signed_when_not_forced() {
        let mut out = Vec::new();
        encode_integer_be(&[0xff], false, &mut out);
        assert_eq!(out, vec![0x02, 0x01, 0xff]);
    }

    #[test]
    fn test_integer_strips_leading_zeros() {
        assert_eq!(integer(&[0x00, 0x00, 0x7f]), vec![0x02, 0x01, 0x7f]);
        assert_eq!(integer(&[0x00, 0x00, 0x80]), vec![0x02, 0x02, 0x00, 0x80]);
        assert_eq!(integer(&[0x01, 0x00, 0x01]), vec![0x02, 0x03, 0x01, 0x00, 0x01]);
    }

    #[test]
    fn test_integer_zero() {
        assert_eq!(integer(&[0x00]), vec![0x02, 0x01, 0x00]);
        assert_eq!(integer(&[0x00, 0x00]), vec![0x02, 0x01, 0x00]);
        assert_eq!(integer(&[]), vec![0x02, 0x01, 0x00]);
    }

    #[test]
    fn test_integer_long_content() {
        let value = vec![0xaa; 200];
        let encoded = integer(&value);
        // tag, 0x81, 201, 0x00 pad, content
        assert_eq!(&encoded[..4], &[0x02, 0x81, 201, 0x00]);
        assert_eq!(encoded.len(), 4 + 200);
    }

    #[test]
    fn test_bit_string_has_unused_bits_byte() {
        let mut out = Vec::new();
        encode_bit_string(&[0x30, 0x00], &mut out);
        assert_eq!(out, vec![0x03, 0x03, 0x00, 0x30, 0x00]);
    }

    #[test]
    fn test_public_key_layout() {
        let key = RsaKeyMaterial::public(vec![0xc5, 0x01], vec![0x03]);
        let der = public_key_der(&key).unwrap();

        let expected = vec![
            0x30, 0x1c, // SubjectPublicKeyInfo
            0x30, 0x0d, // AlgorithmIdentifier
            0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01, //
            0x05, 0x00, //
            0x03, 0x0b, 0x00, // BIT STRING
            0x30, 0x08, // RSAPublicKey
            0x02, 0x03, 0x00, 0xc5, 0x01, //
            0x02, 0x01, 0x03,
        ];
        assert_eq!(der, expected);
    }

    #[test]
    fn test_private_key_layout() {
        let key =
            RsaKeyMaterial::from_components(&[0x0c, 0xa1], &[17], &[0x0a, 0xc1], &[61], &[53])
                .unwrap();
        let der = private_key_der(&key).unwrap();

        let expected = vec![
            0x30, 0x1d, //
            0x02, 0x01, 0x00, // version
            0x02, 0x02, 0x0c, 0xa1, // n
            0x02, 0x01, 0x11, // e
            0x02, 0x02, 0x0a, 0xc1, // d
            0x02, 0x01, 0x3d, // p
            0x02, 0x01, 0x35, // q
            0x02, 0x01, 0x35, // d mod (p-1)
            0x02, 0x01, 0x31, // d mod (q-1)
            0x02, 0x01, 0x26, // q^-1 mod p
        ];
        assert_eq!(der, expected);
    }

    #[test]
    fn test_private_der_needs_private_parts() {
        let key = RsaKeyMaterial::public(vec![0xc5, 0x01], vec![0x03]);
        assert_eq!(
            private_key_der(&key),
            Err(EncodingError::MissingPrivateParts)
        );
    }

    #[test]
    fn test_empty_components_rejected() {
        let key = RsaKeyMaterial::public(Vec::new(), vec![0x03]);
        assert_eq!(
            public_key_der(&key),
            Err(EncodingError::EmptyComponent("modulus"))
        );

        let key = RsaKeyMaterial::public(vec![0xc5], Vec::new());
        assert_eq!(
            public_key_der(&key),
            Err(EncodingError::EmptyComponent("exponent"))
        );
    }
}
