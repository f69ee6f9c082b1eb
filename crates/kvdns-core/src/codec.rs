//! Byte codec for stored field values.
//!
//! Integers are fixed-width big-endian. Strings are raw UTF-8. String lists
//! are CBOR arrays, which keeps them length-prefixed and preserves order.
//! IP addresses are stored as their raw octets.
//!
//! Absence is never encoded here: a field is absent only when its key is
//! missing from the store, so a zero-length value decodes as an empty
//! string and as a width error for integers.

use std::net::{Ipv4Addr, Ipv6Addr};

use base64::{engine::general_purpose::STANDARD as B64, Engine};

use crate::error::{CoreError, Result};

/// Encode a `u8` field.
#[must_use]
pub fn encode_u8(value: u8) -> Vec<u8> {
    vec![value]
}

/// Encode a `u16` field as two big-endian bytes.
#[must_use]
pub fn encode_u16(value: u16) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

/// Encode a `u32` field as four big-endian bytes.
#[must_use]
pub fn encode_u32(value: u32) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

/// Decode a `u8` field.
pub fn decode_u8(field: &'static str, bytes: &[u8]) -> Result<u8> {
    let [value] = fixed::<1>(field, bytes)?;
    Ok(value)
}

/// Decode a two-byte big-endian `u16` field.
pub fn decode_u16(field: &'static str, bytes: &[u8]) -> Result<u16> {
    fixed::<2>(field, bytes).map(u16::from_be_bytes)
}

/// Decode a four-byte big-endian `u32` field.
pub fn decode_u32(field: &'static str, bytes: &[u8]) -> Result<u32> {
    fixed::<4>(field, bytes).map(u32::from_be_bytes)
}

/// Encode a string field.
#[must_use]
pub fn encode_string(value: &str) -> Vec<u8> {
    value.as_bytes().to_vec()
}

/// Decode a string field.
pub fn decode_string(field: &'static str, bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|_| CoreError::FieldUtf8(field))
}

/// Encode an ordered list of strings.
pub fn encode_string_list(values: &[String]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(values.iter().map(String::len).sum::<usize>() + 8);
    ciborium::into_writer(values, &mut buf).map_err(|e| CoreError::StringList(e.to_string()))?;
    Ok(buf)
}

/// Decode an ordered list of strings.
pub fn decode_string_list(bytes: &[u8]) -> Result<Vec<String>> {
    ciborium::from_reader(bytes).map_err(|e| CoreError::StringList(e.to_string()))
}

/// Encode an IPv4 address as four octets.
#[must_use]
pub fn encode_ipv4(addr: Ipv4Addr) -> Vec<u8> {
    addr.octets().to_vec()
}

/// Decode a four-octet IPv4 address.
pub fn decode_ipv4(field: &'static str, bytes: &[u8]) -> Result<Ipv4Addr> {
    fixed::<4>(field, bytes).map(Ipv4Addr::from)
}

/// Encode an IPv6 address as sixteen octets.
#[must_use]
pub fn encode_ipv6(addr: Ipv6Addr) -> Vec<u8> {
    addr.octets().to_vec()
}

/// Decode a sixteen-octet IPv6 address.
pub fn decode_ipv6(field: &'static str, bytes: &[u8]) -> Result<Ipv6Addr> {
    fixed::<16>(field, bytes).map(Ipv6Addr::from)
}

/// Decode base64 payload text (DNSKEY keys, CERT certificates).
/// Embedded whitespace is ignored.
pub fn decode_base64(field: &str, text: &str) -> Result<Vec<u8>> {
    let compact: String = text.split_whitespace().collect();
    B64.decode(compact)
        .map_err(|e| CoreError::Validation(format!("{field} is not valid base64: {e}")))
}

/// Decode hex payload text (digests, fingerprints, association data).
/// Embedded whitespace is ignored.
pub fn decode_hex(field: &str, text: &str) -> Result<Vec<u8>> {
    let compact: String = text.split_whitespace().collect();
    hex::decode(compact).map_err(|e| CoreError::Validation(format!("{field} is not valid hex: {e}")))
}

fn fixed<const N: usize>(field: &'static str, bytes: &[u8]) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| CoreError::FieldWidth {
        field,
        expected: N,
        actual: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_are_big_endian() {
        assert_eq!(encode_u16(0x1234), vec![0x12, 0x34]);
        assert_eq!(encode_u32(0x0102_0304), vec![1, 2, 3, 4]);
        assert_eq!(decode_u16("priority", &[0x12, 0x34]).unwrap(), 0x1234);
        assert_eq!(decode_u32("lat", &[1, 2, 3, 4]).unwrap(), 0x0102_0304);
        assert_eq!(decode_u8("version", &[7]).unwrap(), 7);
    }

    #[test]
    fn test_zero_is_not_absence() {
        // An explicit zero is two bytes, distinguishable from an empty value.
        let zero = encode_u16(0);
        assert_eq!(zero.len(), 2);
        assert_eq!(decode_u16("priority", &zero).unwrap(), 0);
        assert!(decode_u16("priority", &[]).is_err());
    }

    #[test]
    fn test_wrong_width_is_rejected() {
        let err = decode_u32("alt", &[0, 0, 1]).unwrap_err();
        match err {
            CoreError::FieldWidth {
                field,
                expected,
                actual,
            } => {
                assert_eq!(field, "alt");
                assert_eq!(expected, 4);
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(decode_u8("size", &[1, 2]).is_err());
    }

    #[test]
    fn test_string_list_preserves_order() {
        let list = vec![
            "v=spf1".to_string(),
            String::new(),
            "include:_spf.example.com ~all".to_string(),
        ];
        let bytes = encode_string_list(&list).unwrap();
        assert_eq!(decode_string_list(&bytes).unwrap(), list);
    }

    #[test]
    fn test_string_list_rejects_garbage() {
        assert!(decode_string_list(&[0xff, 0x00, 0x13]).is_err());
    }

    #[test]
    fn test_empty_string_decodes() {
        assert_eq!(decode_string("target", &[]).unwrap(), "");
        assert!(decode_string("target", &[0xc3, 0x28]).is_err());
    }

    #[test]
    fn test_payload_text() {
        assert_eq!(decode_hex("digest", "DEAD beef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(decode_hex("digest", "abc").is_err());
        assert_eq!(decode_base64("public-key", "AQID BA==").unwrap(), vec![1, 2, 3, 4]);
        assert!(decode_base64("public-key", "not base64!").is_err());
    }

    #[test]
    fn test_ip_octets() {
        let v4 = Ipv4Addr::new(203, 0, 113, 5);
        assert_eq!(decode_ipv4("address", &encode_ipv4(v4)).unwrap(), v4);
        let v6: Ipv6Addr = "2001:db8::1".parse().unwrap();
        assert_eq!(encode_ipv6(v6).len(), 16);
        assert_eq!(decode_ipv6("address", &encode_ipv6(v6)).unwrap(), v6);
        assert!(decode_ipv4("address", &encode_ipv6(v6)).is_err());
    }
}
