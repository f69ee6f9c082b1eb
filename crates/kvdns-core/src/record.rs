//! Record types, record values and their storage slots.
//!
//! [`RecordValue`] is a closed union over the supported types. Each value
//! flattens into one or more `(Slot, bytes)` pairs, and [`FieldSet`] is the
//! inverse: the bytes read back from the store, keyed by slot.

use std::collections::BTreeMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{CoreError, Result};
use crate::loc::Loc;

/// Supported record types. Each one owns a partition of the store named
/// by its mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    MX,
    LOC,
    SRV,
    SPF,
    TXT,
    NS,
    CAA,
    PTR,
    CERT,
    DNSKEY,
    DS,
    NAPTR,
    SMIMEA,
    SSHFP,
    TLSA,
    URI,
}

impl RecordType {
    /// All record types, in partition creation order.
    pub const ALL: [Self; 19] = [
        Self::A,
        Self::AAAA,
        Self::CNAME,
        Self::MX,
        Self::LOC,
        Self::SRV,
        Self::SPF,
        Self::TXT,
        Self::NS,
        Self::CAA,
        Self::PTR,
        Self::CERT,
        Self::DNSKEY,
        Self::DS,
        Self::NAPTR,
        Self::SMIMEA,
        Self::SSHFP,
        Self::TLSA,
        Self::URI,
    ];

    /// Mnemonic, also the partition name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::AAAA => "AAAA",
            Self::CNAME => "CNAME",
            Self::MX => "MX",
            Self::LOC => "LOC",
            Self::SRV => "SRV",
            Self::SPF => "SPF",
            Self::TXT => "TXT",
            Self::NS => "NS",
            Self::CAA => "CAA",
            Self::PTR => "PTR",
            Self::CERT => "CERT",
            Self::DNSKEY => "DNSKEY",
            Self::DS => "DS",
            Self::NAPTR => "NAPTR",
            Self::SMIMEA => "SMIMEA",
            Self::SSHFP => "SSHFP",
            Self::TLSA => "TLSA",
            Self::URI => "URI",
        }
    }

    /// IANA type code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::A => 1,
            Self::NS => 2,
            Self::CNAME => 5,
            Self::PTR => 12,
            Self::MX => 15,
            Self::TXT => 16,
            Self::AAAA => 28,
            Self::LOC => 29,
            Self::SRV => 33,
            Self::NAPTR => 35,
            Self::CERT => 37,
            Self::DS => 43,
            Self::SSHFP => 44,
            Self::DNSKEY => 48,
            Self::TLSA => 52,
            Self::SMIMEA => 53,
            Self::SPF => 99,
            Self::URI => 256,
            Self::CAA => 257,
        }
    }

    /// Look up a supported type by its IANA code.
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Storage slots of this type, in field order.
    #[must_use]
    pub const fn slots(self) -> &'static [Slot] {
        use Slot::{Field, Whole};
        match self {
            Self::A | Self::AAAA | Self::CNAME | Self::SPF | Self::TXT | Self::NS | Self::PTR => {
                &[Whole]
            }
            Self::MX => &[Field("host"), Field("priority")],
            Self::LOC => &[
                Field("version"),
                Field("size"),
                Field("horiz"),
                Field("vert"),
                Field("lat"),
                Field("long"),
                Field("alt"),
            ],
            Self::SRV => &[
                Field("priority"),
                Field("weight"),
                Field("port"),
                Field("target"),
            ],
            Self::CAA => &[Field("flag"), Field("tag"), Field("content")],
            Self::CERT => &[
                Field("type"),
                Field("keytag"),
                Field("algorithm"),
                Field("certificate"),
            ],
            Self::DNSKEY => &[
                Field("flags"),
                Field("protocol"),
                Field("algorithm"),
                Field("publickey"),
            ],
            Self::DS => &[
                Field("keytag"),
                Field("algorithm"),
                Field("digesttype"),
                Field("digest"),
            ],
            Self::NAPTR => &[
                Field("order"),
                Field("preference"),
                Field("flags"),
                Field("service"),
                Field("regexp"),
                Field("replacement"),
            ],
            Self::SMIMEA | Self::TLSA => &[
                Field("usage"),
                Field("selector"),
                Field("matching"),
                Field("certificate"),
            ],
            Self::SSHFP => &[Field("algorithm"), Field("type"), Field("fingerprint")],
            Self::URI => &[Field("priority"), Field("weight"), Field("target")],
        }
    }

    /// True if the type is stored under composite `name*field` keys.
    #[must_use]
    pub const fn is_composite(self) -> bool {
        !matches!(self.slots(), [Slot::Whole])
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnsupportedType(s.to_string()))
    }
}

/// Where one encoded field lives relative to the owner name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    /// The bare owner name (single-field types).
    Whole,
    /// `name*field` (multi-field types).
    Field(&'static str),
}

impl Slot {
    /// Field name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Whole => "value",
            Self::Field(field) => field,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct A {
    #[serde(alias = "host")]
    pub address: Ipv4Addr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aaaa {
    #[serde(alias = "host")]
    pub address: Ipv6Addr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cname {
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mx {
    pub host: String,
    pub priority: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Srv {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

/// Ordered character strings (TXT and SPF).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextList {
    pub text: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ns {
    pub nameserver: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caa {
    #[serde(default)]
    pub flag: u8,
    pub tag: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ptr {
    pub domain: String,
}

/// CERT record. `certificate` is base64 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Cert {
    #[serde(rename = "type")]
    pub cert_type: u16,
    pub key_tag: u16,
    pub algorithm: u8,
    pub certificate: String,
}

/// DNSKEY record. `public_key` is base64 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Dnskey {
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: String,
}

/// DS record. `digest` is hex text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Ds {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Naptr {
    pub order: u16,
    pub preference: u16,
    pub flags: String,
    pub service: String,
    pub regexp: String,
    pub replacement: String,
}

/// Certificate association (TLSA and SMIMEA). `certificate` is hex text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CertAssociation {
    pub usage: u8,
    pub selector: u8,
    pub matching_type: u8,
    pub certificate: String,
}

/// SSHFP record. `fingerprint` is hex text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sshfp {
    pub algorithm: u8,
    #[serde(rename = "type")]
    pub fp_type: u8,
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uri {
    pub priority: u16,
    pub weight: u16,
    pub target: String,
}

/// A record value of any supported type.
///
/// Serializes externally tagged by mnemonic, e.g.
/// `{"MX": {"host": "mail.example.com", "priority": 10}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordValue {
    A(A),
    AAAA(Aaaa),
    CNAME(Cname),
    MX(Mx),
    LOC(Loc),
    SRV(Srv),
    SPF(TextList),
    TXT(TextList),
    NS(Ns),
    CAA(Caa),
    PTR(Ptr),
    CERT(Cert),
    DNSKEY(Dnskey),
    DS(Ds),
    NAPTR(Naptr),
    SMIMEA(CertAssociation),
    SSHFP(Sshfp),
    TLSA(CertAssociation),
    URI(Uri),
}

impl RecordValue {
    #[must_use]
    pub const fn record_type(&self) -> RecordType {
        match self {
            Self::A(_) => RecordType::A,
            Self::AAAA(_) => RecordType::AAAA,
            Self::CNAME(_) => RecordType::CNAME,
            Self::MX(_) => RecordType::MX,
            Self::LOC(_) => RecordType::LOC,
            Self::SRV(_) => RecordType::SRV,
            Self::SPF(_) => RecordType::SPF,
            Self::TXT(_) => RecordType::TXT,
            Self::NS(_) => RecordType::NS,
            Self::CAA(_) => RecordType::CAA,
            Self::PTR(_) => RecordType::PTR,
            Self::CERT(_) => RecordType::CERT,
            Self::DNSKEY(_) => RecordType::DNSKEY,
            Self::DS(_) => RecordType::DS,
            Self::NAPTR(_) => RecordType::NAPTR,
            Self::SMIMEA(_) => RecordType::SMIMEA,
            Self::SSHFP(_) => RecordType::SSHFP,
            Self::TLSA(_) => RecordType::TLSA,
            Self::URI(_) => RecordType::URI,
        }
    }

    /// Flatten into `(slot, bytes)` pairs, one per slot of the type.
    pub fn encode(&self) -> Result<Vec<(Slot, Vec<u8>)>> {
        use codec::{encode_string as s, encode_u16 as u16_, encode_u32 as u32_, encode_u8 as u8_};
        use Slot::{Field, Whole};

        let fields = match self {
            Self::A(a) => vec![(Whole, codec::encode_ipv4(a.address))],
            Self::AAAA(a) => vec![(Whole, codec::encode_ipv6(a.address))],
            Self::CNAME(c) => vec![(Whole, s(&c.target))],
            Self::MX(mx) => vec![
                (Field("host"), s(&mx.host)),
                (Field("priority"), u16_(mx.priority)),
            ],
            Self::LOC(loc) => vec![
                (Field("version"), u8_(loc.version)),
                (Field("size"), u8_(loc.size)),
                (Field("horiz"), u8_(loc.horizontal_precision)),
                (Field("vert"), u8_(loc.vertical_precision)),
                (Field("lat"), u32_(loc.latitude)),
                (Field("long"), u32_(loc.longitude)),
                (Field("alt"), u32_(loc.altitude)),
            ],
            Self::SRV(srv) => vec![
                (Field("priority"), u16_(srv.priority)),
                (Field("weight"), u16_(srv.weight)),
                (Field("port"), u16_(srv.port)),
                (Field("target"), s(&srv.target)),
            ],
            Self::SPF(t) | Self::TXT(t) => vec![(Whole, codec::encode_string_list(&t.text)?)],
            Self::NS(ns) => vec![(Whole, s(&ns.nameserver))],
            Self::CAA(caa) => vec![
                (Field("flag"), u8_(caa.flag)),
                (Field("tag"), s(&caa.tag)),
                (Field("content"), s(&caa.content)),
            ],
            Self::PTR(ptr) => vec![(Whole, s(&ptr.domain))],
            Self::CERT(cert) => vec![
                (Field("type"), u16_(cert.cert_type)),
                (Field("keytag"), u16_(cert.key_tag)),
                (Field("algorithm"), u8_(cert.algorithm)),
                (Field("certificate"), s(&cert.certificate)),
            ],
            Self::DNSKEY(key) => vec![
                (Field("flags"), u16_(key.flags)),
                (Field("protocol"), u8_(key.protocol)),
                (Field("algorithm"), u8_(key.algorithm)),
                (Field("publickey"), s(&key.public_key)),
            ],
            Self::DS(ds) => vec![
                (Field("keytag"), u16_(ds.key_tag)),
                (Field("algorithm"), u8_(ds.algorithm)),
                (Field("digesttype"), u8_(ds.digest_type)),
                (Field("digest"), s(&ds.digest)),
            ],
            Self::NAPTR(n) => vec![
                (Field("order"), u16_(n.order)),
                (Field("preference"), u16_(n.preference)),
                (Field("flags"), s(&n.flags)),
                (Field("service"), s(&n.service)),
                (Field("regexp"), s(&n.regexp)),
                (Field("replacement"), s(&n.replacement)),
            ],
            Self::SMIMEA(c) | Self::TLSA(c) => vec![
                (Field("usage"), u8_(c.usage)),
                (Field("selector"), u8_(c.selector)),
                (Field("matching"), u8_(c.matching_type)),
                (Field("certificate"), s(&c.certificate)),
            ],
            Self::SSHFP(fp) => vec![
                (Field("algorithm"), u8_(fp.algorithm)),
                (Field("type"), u8_(fp.fp_type)),
                (Field("fingerprint"), s(&fp.fingerprint)),
            ],
            Self::URI(uri) => vec![
                (Field("priority"), u16_(uri.priority)),
                (Field("weight"), u16_(uri.weight)),
                (Field("target"), s(&uri.target)),
            ],
        };
        debug_assert_eq!(fields.len(), self.record_type().slots().len());
        Ok(fields)
    }

    /// Reassemble a value of `rtype` from bytes read back per slot.
    ///
    /// Every slot of the type must be present in `fields`.
    pub fn decode(rtype: RecordType, fields: &FieldSet) -> Result<Self> {
        let value = match rtype {
            RecordType::A => Self::A(A {
                address: codec::decode_ipv4("address", fields.bytes(Slot::Whole)?)?,
            }),
            RecordType::AAAA => Self::AAAA(Aaaa {
                address: codec::decode_ipv6("address", fields.bytes(Slot::Whole)?)?,
            }),
            RecordType::CNAME => Self::CNAME(Cname {
                target: fields.string(Slot::Whole)?,
            }),
            RecordType::MX => Self::MX(Mx {
                host: fields.field_string("host")?,
                priority: fields.field_u16("priority")?,
            }),
            RecordType::LOC => Self::LOC(Loc {
                version: fields.field_u8("version")?,
                size: fields.field_u8("size")?,
                horizontal_precision: fields.field_u8("horiz")?,
                vertical_precision: fields.field_u8("vert")?,
                latitude: fields.field_u32("lat")?,
                longitude: fields.field_u32("long")?,
                altitude: fields.field_u32("alt")?,
            }),
            RecordType::SRV => Self::SRV(Srv {
                priority: fields.field_u16("priority")?,
                weight: fields.field_u16("weight")?,
                port: fields.field_u16("port")?,
                target: fields.field_string("target")?,
            }),
            RecordType::SPF => Self::SPF(TextList {
                text: codec::decode_string_list(fields.bytes(Slot::Whole)?)?,
            }),
            RecordType::TXT => Self::TXT(TextList {
                text: codec::decode_string_list(fields.bytes(Slot::Whole)?)?,
            }),
            RecordType::NS => Self::NS(Ns {
                nameserver: fields.string(Slot::Whole)?,
            }),
            RecordType::CAA => Self::CAA(Caa {
                flag: fields.field_u8("flag")?,
                tag: fields.field_string("tag")?,
                content: fields.field_string("content")?,
            }),
            RecordType::PTR => Self::PTR(Ptr {
                domain: fields.string(Slot::Whole)?,
            }),
            RecordType::CERT => Self::CERT(Cert {
                cert_type: fields.field_u16("type")?,
                key_tag: fields.field_u16("keytag")?,
                algorithm: fields.field_u8("algorithm")?,
                certificate: fields.field_string("certificate")?,
            }),
            RecordType::DNSKEY => Self::DNSKEY(Dnskey {
                flags: fields.field_u16("flags")?,
                protocol: fields.field_u8("protocol")?,
                algorithm: fields.field_u8("algorithm")?,
                public_key: fields.field_string("publickey")?,
            }),
            RecordType::DS => Self::DS(Ds {
                key_tag: fields.field_u16("keytag")?,
                algorithm: fields.field_u8("algorithm")?,
                digest_type: fields.field_u8("digesttype")?,
                digest: fields.field_string("digest")?,
            }),
            RecordType::NAPTR => Self::NAPTR(Naptr {
                order: fields.field_u16("order")?,
                preference: fields.field_u16("preference")?,
                flags: fields.field_string("flags")?,
                service: fields.field_string("service")?,
                regexp: fields.field_string("regexp")?,
                replacement: fields.field_string("replacement")?,
            }),
            RecordType::SMIMEA => Self::SMIMEA(fields.cert_association()?),
            RecordType::TLSA => Self::TLSA(fields.cert_association()?),
            RecordType::SSHFP => Self::SSHFP(Sshfp {
                algorithm: fields.field_u8("algorithm")?,
                fp_type: fields.field_u8("type")?,
                fingerprint: fields.field_string("fingerprint")?,
            }),
            RecordType::URI => Self::URI(Uri {
                priority: fields.field_u16("priority")?,
                weight: fields.field_u16("weight")?,
                target: fields.field_string("target")?,
            }),
        };
        Ok(value)
    }
}

/// Raw bytes of one record, keyed by storage slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    fields: BTreeMap<Slot, Vec<u8>>,
}

impl FieldSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slot: Slot, bytes: Vec<u8>) {
        self.fields.insert(slot, bytes);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw bytes of a slot; a missing slot is an error.
    pub fn bytes(&self, slot: Slot) -> Result<&[u8]> {
        self.fields
            .get(&slot)
            .map(Vec::as_slice)
            .ok_or(CoreError::MissingField(slot.name()))
    }

    fn string(&self, slot: Slot) -> Result<String> {
        codec::decode_string(slot.name(), self.bytes(slot)?)
    }

    fn field_string(&self, field: &'static str) -> Result<String> {
        self.string(Slot::Field(field))
    }

    fn field_u8(&self, field: &'static str) -> Result<u8> {
        codec::decode_u8(field, self.bytes(Slot::Field(field))?)
    }

    fn field_u16(&self, field: &'static str) -> Result<u16> {
        codec::decode_u16(field, self.bytes(Slot::Field(field))?)
    }

    fn field_u32(&self, field: &'static str) -> Result<u32> {
        codec::decode_u32(field, self.bytes(Slot::Field(field))?)
    }

    fn cert_association(&self) -> Result<CertAssociation> {
        Ok(CertAssociation {
            usage: self.field_u8("usage")?,
            selector: self.field_u8("selector")?,
            matching_type: self.field_u8("matching")?,
            certificate: self.field_string("certificate")?,
        })
    }
}

impl FromIterator<(Slot, Vec<u8>)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (Slot, Vec<u8>)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
