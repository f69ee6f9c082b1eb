//! Turns stored record values into DNS RDATA.
//!
//! Types hickory models natively are emitted as typed RDATA. The others are
//! emitted as opaque RDATA carrying their RFC wire layout under the right
//! type code.

use hickory_proto::rr::rdata::{self, NULL};
use hickory_proto::rr::{Name, RData, RecordType as WireType};
use kvdns_core::codec::{decode_base64, decode_hex};
use kvdns_core::keys::normalize_name;
use kvdns_core::RecordValue;

use crate::{Result, SrvError};

/// Build the RDATA answering for `value`.
pub fn to_rdata(value: &RecordValue) -> Result<RData> {
    let rdata = match value {
        RecordValue::A(a) => RData::A(rdata::A::from(a.address)),
        RecordValue::AAAA(a) => RData::AAAA(rdata::AAAA::from(a.address)),
        RecordValue::CNAME(c) => RData::CNAME(rdata::CNAME(name(&c.target)?)),
        RecordValue::MX(mx) => RData::MX(rdata::MX::new(mx.priority, name(&mx.host)?)),
        RecordValue::SRV(srv) => RData::SRV(rdata::SRV::new(
            srv.priority,
            srv.weight,
            srv.port,
            name(&srv.target)?,
        )),
        RecordValue::TXT(t) => RData::TXT(rdata::TXT::new(t.text.clone())),
        RecordValue::NS(ns) => RData::NS(rdata::NS(name(&ns.nameserver)?)),
        RecordValue::PTR(ptr) => RData::PTR(rdata::PTR(name(&ptr.domain)?)),
        other => opaque(value.record_type().code(), wire_layout(other)?),
    };
    Ok(rdata)
}

fn opaque(code: u16, bytes: Vec<u8>) -> RData {
    RData::Unknown {
        code: WireType::from(code),
        rdata: NULL::with(bytes),
    }
}

/// Fully qualified wire name for a stored host name.
fn name(host: &str) -> Result<Name> {
    let fqdn = if host.ends_with('.') {
        host.to_string()
    } else {
        format!("{host}.")
    };
    Name::parse(&fqdn, None).map_err(|e| SrvError::Answer(format!("invalid name '{host}': {e}")))
}

/// RDATA bytes for the types without a typed hickory representation.
pub fn wire_layout(value: &RecordValue) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match value {
        RecordValue::LOC(loc) => {
            out.extend_from_slice(&[
                loc.version,
                loc.size,
                loc.horizontal_precision,
                loc.vertical_precision,
            ]);
            out.extend_from_slice(&loc.latitude.to_be_bytes());
            out.extend_from_slice(&loc.longitude.to_be_bytes());
            out.extend_from_slice(&loc.altitude.to_be_bytes());
        }
        RecordValue::SPF(t) => {
            for s in &t.text {
                character_string(&mut out, s)?;
            }
        }
        RecordValue::CAA(caa) => {
            out.push(caa.flag);
            character_string(&mut out, &caa.tag)?;
            out.extend_from_slice(caa.content.as_bytes());
        }
        RecordValue::CERT(cert) => {
            out.extend_from_slice(&cert.cert_type.to_be_bytes());
            out.extend_from_slice(&cert.key_tag.to_be_bytes());
            out.push(cert.algorithm);
            out.extend(decode_base64("certificate", &cert.certificate)?);
        }
        RecordValue::DNSKEY(key) => {
            out.extend_from_slice(&key.flags.to_be_bytes());
            out.push(key.protocol);
            out.push(key.algorithm);
            out.extend(decode_base64("public-key", &key.public_key)?);
        }
        RecordValue::DS(ds) => {
            out.extend_from_slice(&ds.key_tag.to_be_bytes());
            out.push(ds.algorithm);
            out.push(ds.digest_type);
            out.extend(decode_hex("digest", &ds.digest)?);
        }
        RecordValue::NAPTR(n) => {
            out.extend_from_slice(&n.order.to_be_bytes());
            out.extend_from_slice(&n.preference.to_be_bytes());
            character_string(&mut out, &n.flags)?;
            character_string(&mut out, &n.service)?;
            character_string(&mut out, &n.regexp)?;
            wire_name(&mut out, &n.replacement)?;
        }
        RecordValue::SMIMEA(c) | RecordValue::TLSA(c) => {
            out.extend_from_slice(&[c.usage, c.selector, c.matching_type]);
            out.extend(decode_hex("certificate", &c.certificate)?);
        }
        RecordValue::SSHFP(fp) => {
            out.extend_from_slice(&[fp.algorithm, fp.fp_type]);
            out.extend(decode_hex("fingerprint", &fp.fingerprint)?);
        }
        RecordValue::URI(uri) => {
            out.extend_from_slice(&uri.priority.to_be_bytes());
            out.extend_from_slice(&uri.weight.to_be_bytes());
            out.extend_from_slice(uri.target.as_bytes());
        }
        typed => {
            return Err(SrvError::Answer(format!(
                "{} has a typed representation",
                typed.record_type()
            )))
        }
    }
    Ok(out)
}

/// Append a length-prefixed character-string.
fn character_string(out: &mut Vec<u8>, s: &str) -> Result<()> {
    let len = u8::try_from(s.len())
        .map_err(|_| SrvError::Answer(format!("character-string of {} octets", s.len())))?;
    out.push(len);
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

/// Append an uncompressed domain name.
fn wire_name(out: &mut Vec<u8>, name: &str) -> Result<()> {
    let name = normalize_name(name);
    if !name.is_empty() {
        for label in name.split('.') {
            let len = u8::try_from(label.len())
                .ok()
                .filter(|&len| (1..=63).contains(&len))
                .ok_or_else(|| SrvError::Answer(format!("invalid label in '{name}'")))?;
            out.push(len);
            out.extend_from_slice(label.as_bytes());
        }
    }
    out.push(0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvdns_core::RecordType;

    fn parse(rtype: RecordType, line: &str) -> RecordValue {
        RecordValue::parse_line(rtype, line).unwrap()
    }

    /// Type code of the emitted RDATA and its payload bytes.
    fn opaque_bytes(value: &RecordValue) -> (u16, Vec<u8>) {
        let rdata = to_rdata(value).unwrap();
        assert!(matches!(rdata, RData::Unknown { .. }), "{rdata:?}");
        let bytes = wire_layout(value).unwrap();
        assert_eq!(rdata, opaque(value.record_type().code(), bytes.clone()));
        (u16::from(rdata.record_type()), bytes)
    }

    #[test]
    fn test_typed_answers() {
        let a = to_rdata(&parse(RecordType::A, "203.0.113.5")).unwrap();
        assert_eq!(a, RData::A(rdata::A::from(std::net::Ipv4Addr::new(203, 0, 113, 5))));

        let mx = to_rdata(&parse(RecordType::MX, "10 mail.example.com")).unwrap();
        match mx {
            RData::MX(mx) => {
                assert_eq!(mx.preference(), 10);
                assert_eq!(mx.exchange().to_string(), "mail.example.com.");
            }
            other => panic!("unexpected {other:?}"),
        }

        let txt = to_rdata(&parse(RecordType::TXT, r#""a b" c"#)).unwrap();
        assert_eq!(txt.record_type(), WireType::TXT);
    }

    #[test]
    fn test_loc_wire_layout() {
        let (code, bytes) = opaque_bytes(&parse(RecordType::LOC, "42 21 54 N 71 06 18 W -24m 30m"));
        assert_eq!(code, 29);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..4], &[0, 0x33, 0x16, 0x13]);
        assert_eq!(&bytes[4..8], &2_299_997_648u32.to_be_bytes());
        assert_eq!(&bytes[8..12], &1_891_505_648u32.to_be_bytes());
        assert_eq!(&bytes[12..], &9_997_600u32.to_be_bytes());
    }

    #[test]
    fn test_caa_wire_layout() {
        let (code, bytes) = opaque_bytes(&parse(RecordType::CAA, r#"128 issue "ca.example""#));
        assert_eq!(code, 257);
        let mut expected = vec![128, 5];
        expected.extend_from_slice(b"issue");
        expected.extend_from_slice(b"ca.example");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_naptr_wire_layout() {
        let (code, bytes) = opaque_bytes(&parse(
            RecordType::NAPTR,
            r#"100 10 "S" "SIP+D2U" "" _sip._udp.example.com"#,
        ));
        assert_eq!(code, 35);
        let mut expected = vec![0, 100, 0, 10, 1, b'S', 7];
        expected.extend_from_slice(b"SIP+D2U");
        expected.push(0);
        expected.extend_from_slice(b"\x04_sip\x04_udp\x07example\x03com\x00");
        assert_eq!(bytes, expected);

        let root = parse(RecordType::NAPTR, r#"1 1 "" "" "" ."#);
        assert_eq!(opaque_bytes(&root).1, vec![0, 1, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_binary_payloads_are_decoded() {
        let ds = parse(RecordType::DS, "2371 13 2 1f98 7cc6");
        assert_eq!(opaque_bytes(&ds), (43, vec![0x09, 0x43, 13, 2, 0x1f, 0x98, 0x7c, 0xc6]));

        let key = parse(RecordType::DNSKEY, "257 3 13 AQIDBA==");
        assert_eq!(opaque_bytes(&key), (48, vec![0x01, 0x01, 3, 13, 1, 2, 3, 4]));

        let sshfp = parse(RecordType::SSHFP, "4 2 abcd");
        assert_eq!(opaque_bytes(&sshfp), (44, vec![4, 2, 0xab, 0xcd]));

        let tlsa = parse(RecordType::TLSA, "3 1 1 00ff");
        assert_eq!(opaque_bytes(&tlsa), (52, vec![3, 1, 1, 0x00, 0xff]));

        let smimea = parse(RecordType::SMIMEA, "3 1 1 00ff");
        assert_eq!(opaque_bytes(&smimea).0, 53);

        let cert = parse(RecordType::CERT, "1 2 8 AQID");
        assert_eq!(opaque_bytes(&cert), (37, vec![0, 1, 0, 2, 8, 1, 2, 3]));
    }

    #[test]
    fn test_spf_and_uri_layouts() {
        let spf = parse(RecordType::SPF, r#""v=spf1" "-all""#);
        let mut expected = vec![6];
        expected.extend_from_slice(b"v=spf1");
        expected.push(4);
        expected.extend_from_slice(b"-all");
        assert_eq!(opaque_bytes(&spf), (99, expected));

        let uri = parse(RecordType::URI, r#"10 1 "https://example.com/""#);
        let mut expected = vec![0, 10, 0, 1];
        expected.extend_from_slice(b"https://example.com/");
        assert_eq!(opaque_bytes(&uri), (256, expected));
    }

    #[test]
    fn test_rdata_encodes_on_the_wire() {
        use hickory_proto::op::Message;
        use hickory_proto::rr::Record;

        let name = Name::parse("geo.example.com.", None).unwrap();
        let rdata = to_rdata(&parse(RecordType::LOC, "59 N 10 E 15m")).unwrap();
        let mut message = Message::new();
        message.add_answer(Record::from_rdata(name, 0, rdata));
        assert!(message.to_vec().is_ok());
    }
}
