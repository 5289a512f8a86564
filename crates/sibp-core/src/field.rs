//! Canonical big-endian encoding into the BN254 scalar field.
//!
//! Public instances travel as `0x`-prefixed 32-byte big-endian hex strings
//! whose integer value is strictly below the field modulus. Anything
//! derived from a hash must be reduced before encoding; an unreduced value
//! can exceed the modulus and fail downstream field range checks.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};

/// BN254 scalar-field modulus, big-endian hex (no prefix). Matches
/// `ark_bn254::Fr::MODULUS`; kept as a constant for display and tests.
pub const BN254_MODULUS_HEX: &str =
    "30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001";

/// Reduce arbitrary big-endian bytes into the scalar field and encode as a
/// canonical `0x`-prefixed 32-byte big-endian hex string.
#[must_use]
pub fn field_element_hex(be_bytes: &[u8]) -> String {
    let fr = Fr::from_be_bytes_mod_order(be_bytes);
    format!("0x{}", hex::encode(fr.into_bigint().to_bytes_be()))
}

/// The field modulus as 32 big-endian bytes.
#[must_use]
pub fn modulus_be_bytes() -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Fr::MODULUS.to_bytes_be());
    out
}

/// Parse a canonical `0x`-prefixed 32-byte hex instance into raw bytes.
///
/// Returns `None` for a missing prefix, wrong length, or non-hex payload.
#[must_use]
pub fn parse_instance_hex(s: &str) -> Option<[u8; 32]> {
    let body = s.strip_prefix("0x")?;
    if body.len() != 64 {
        return None;
    }
    let bytes = hex::decode(body).ok()?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Some(out)
}

/// Big-endian comparison: is `be` strictly below the field modulus?
#[must_use]
pub fn is_below_modulus(be: &[u8; 32]) -> bool {
    *be < modulus_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulus_constant_matches_ark() {
        assert_eq!(hex::encode(modulus_be_bytes()), BN254_MODULUS_HEX);
    }

    #[test]
    fn small_values_encode_unreduced() {
        let enc = field_element_hex(&[0x2a]);
        assert_eq!(enc.len(), 66);
        assert!(enc.ends_with("2a"));
        assert!(enc.starts_with("0x00"));
    }

    #[test]
    fn oversized_values_are_reduced() {
        // 2^256 - 1 exceeds the ~2^254 modulus; the encoding must wrap.
        let enc = field_element_hex(&[0xff; 32]);
        let bytes = parse_instance_hex(&enc).expect("canonical encoding");
        assert!(is_below_modulus(&bytes));
    }

    #[test]
    fn modulus_itself_reduces_to_zero() {
        let enc = field_element_hex(&modulus_be_bytes());
        assert_eq!(enc, format!("0x{}", "0".repeat(64)));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(parse_instance_hex("deadbeef").is_none());
        assert!(parse_instance_hex("0x1234").is_none());
        assert!(parse_instance_hex(&format!("0x{}", "zz".repeat(32))).is_none());
    }
}
