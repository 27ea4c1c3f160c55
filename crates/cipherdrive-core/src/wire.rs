//! Hex wire encoding for ledger-resident byte strings.
//!
//! The two ledger write paths use different conventions: owner grants are
//! stored as bare lowercase hex, shares as `0x`-prefixed lowercase hex. Every
//! read path goes through [`decode_hex`], which strips an optional prefix.

use crate::error::Result;

/// Prefix used on shared-grant hex strings.
pub const HEX_PREFIX: &str = "0x";

/// Encode bytes as lowercase hex with no prefix.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Encode bytes as lowercase hex with a `0x` prefix.
pub fn encode_prefixed_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(HEX_PREFIX.len() + bytes.len() * 2);
    out.push_str(HEX_PREFIX);
    out.push_str(&hex::encode(bytes));
    out
}

/// Decode a hex string, accepting an optional `0x` or `0X` prefix.
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    let body = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    Ok(hex::decode(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_hex() {
        assert_eq!(encode_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
    }

    #[test]
    fn test_prefixed_hex() {
        assert_eq!(encode_prefixed_hex(&[0x00, 0xff]), "0x00ff");
        assert_eq!(encode_prefixed_hex(&[]), "0x");
    }

    #[test]
    fn test_decode_strips_optional_prefix() {
        let expected = vec![0xca, 0xfe];
        assert_eq!(decode_hex("cafe").unwrap(), expected);
        assert_eq!(decode_hex("0xcafe").unwrap(), expected);
        assert_eq!(decode_hex("0XCAFE").unwrap(), expected);
        assert_eq!(decode_hex("  0xcafe\n").unwrap(), expected);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_hex("0xzz").is_err());
        assert!(decode_hex("abc").is_err());
    }
}
