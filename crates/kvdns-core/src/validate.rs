//! Write-time checks. Values that pass here are assumed well-formed when
//! read back and served.

use crate::codec;
use crate::error::{CoreError, Result};
use crate::keys::{normalize_name, validate_labels};
use crate::loc::check_precision;
use crate::record::RecordValue;

/// Longest character-string a record can carry on the wire.
const MAX_CHARACTER_STRING: usize = 255;

impl RecordValue {
    /// Check every field of the value before it is stored.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::A(_) | Self::AAAA(_) => Ok(()),
            Self::CNAME(c) => domain("target", &c.target, false),
            Self::MX(mx) => domain("host", &mx.host, false),
            Self::LOC(loc) => {
                check_precision("size", loc.size)?;
                check_precision("horizontal-precision", loc.horizontal_precision)?;
                check_precision("vertical-precision", loc.vertical_precision)
            }
            Self::SRV(srv) => domain("target", &srv.target, true),
            Self::SPF(t) | Self::TXT(t) => {
                if t.text.is_empty() {
                    return Err(CoreError::Validation(
                        "text must contain at least one string".into(),
                    ));
                }
                t.text
                    .iter()
                    .try_for_each(|s| character_string("text", s))
            }
            Self::NS(ns) => domain("nameserver", &ns.nameserver, false),
            Self::CAA(caa) => {
                if caa.tag.is_empty() || !caa.tag.bytes().all(|b| b.is_ascii_alphanumeric()) {
                    return Err(CoreError::Validation(format!(
                        "CAA tag '{}' must be non-empty ASCII letters and digits",
                        caa.tag
                    )));
                }
                character_string("tag", &caa.tag)
            }
            Self::PTR(ptr) => domain("domain", &ptr.domain, false),
            Self::CERT(cert) => codec::decode_base64("certificate", &cert.certificate).map(drop),
            Self::DNSKEY(key) => codec::decode_base64("public-key", &key.public_key).map(drop),
            Self::DS(ds) => non_empty_hex("digest", &ds.digest),
            Self::NAPTR(n) => {
                character_string("flags", &n.flags)?;
                character_string("service", &n.service)?;
                character_string("regexp", &n.regexp)?;
                domain("replacement", &n.replacement, true)
            }
            Self::SMIMEA(c) | Self::TLSA(c) => non_empty_hex("certificate", &c.certificate),
            Self::SSHFP(fp) => non_empty_hex("fingerprint", &fp.fingerprint),
            Self::URI(uri) => {
                if uri.target.is_empty() {
                    Err(CoreError::Validation("URI target is empty".into()))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// A domain name field. `allow_root` admits "." (no target).
fn domain(field: &str, value: &str, allow_root: bool) -> Result<()> {
    if allow_root && value == "." {
        return Ok(());
    }
    let name = normalize_name(value);
    if name.is_empty() {
        return Err(CoreError::Validation(format!("{field} is empty")));
    }
    if name.len() > 253 {
        return Err(CoreError::Validation(format!("{field} '{value}' is too long")));
    }
    validate_labels(&name)
}

fn character_string(field: &str, value: &str) -> Result<()> {
    if value.len() > MAX_CHARACTER_STRING {
        return Err(CoreError::Validation(format!(
            "{field} is {} octets, limit is {MAX_CHARACTER_STRING}",
            value.len()
        )));
    }
    Ok(())
}

fn non_empty_hex(field: &str, value: &str) -> Result<()> {
    if codec::decode_hex(field, value)?.is_empty() {
        return Err(CoreError::Validation(format!("{field} is empty")));
    }
    Ok(())
}
