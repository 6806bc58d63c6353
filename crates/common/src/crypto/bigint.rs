//! Big-endian byte buffers <-> arbitrary precision integers
//!
//! Key components travel as unsigned big-endian byte buffers. Deriving the
//! CRT values of a private key needs real arithmetic on them, which is done
//! on [`BigInt`]. The conversion below reads the buffer as a signed
//! little-endian integer, so a zero byte is appended whenever the most
//! significant byte would otherwise flip the sign.

use num_bigint::{BigInt, Sign};

/// Interpret an unsigned big-endian buffer as a non-negative integer.
///
/// An empty buffer is zero.
pub fn from_big_endian(bytes: &[u8]) -> BigInt {
    let mut le: Vec<u8> = bytes.iter().rev().copied().collect();
    if le.last().is_some_and(|msb| *msb > 0x7f) {
        le.push(0);
    }
    BigInt::from_signed_bytes_le(&le)
}

/// Minimal unsigned big-endian encoding of the magnitude of `value`.
///
/// Zero is encoded as a single zero byte.
pub fn to_big_endian(value: &BigInt) -> Vec<u8> {
    let (sign, bytes) = value.to_bytes_be();
    debug_assert!(sign != Sign::Minus, "key components are never negative");
    bytes
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_high_bit_stays_positive() {
        let value = from_big_endian(&[0xff]);
        assert_eq!(value, BigInt::from(255));

        let value = from_big_endian(&[0x80, 0x00]);
        assert_eq!(value, BigInt::from(0x8000));
    }

    #[test]
    fn test_low_values() {
        assert_eq!(from_big_endian(&[]), BigInt::from(0));
        assert_eq!(from_big_endian(&[0x01, 0x00, 0x01]), BigInt::from(65537));
        assert_eq!(from_big_endian(&[0x7f]), BigInt::from(127));
    }

    #[test]
    fn test_value_survives_encoding() {
        let modulus = [
            0xc3, 0x5a, 0x00, 0x11, 0x8e, 0xf0, 0x42, 0x99, 0x01, 0x7d, 0xaa, 0x10,
        ];
        let value = from_big_endian(&modulus);
        assert_eq!(to_big_endian(&value), modulus.to_vec());
    }

    #[test]
    fn test_leading_zeros_are_not_preserved() {
        // numeric value is exact, padding is not
        let value = from_big_endian(&[0x00, 0x00, 0x2a]);
        assert_eq!(value, BigInt::from(42));
        assert_eq!(to_big_endian(&value), vec![0x2a]);
        assert_eq!(to_big_endian(&BigInt::from(0)), vec![0]);
    }
}
