//! Zone-file style presentation of record values.
//!
//! `Display` output can be fed back through [`RecordValue::parse_line`],
//! and after shell word splitting through [`RecordValue::parse`].

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};
use crate::loc::Loc;
use crate::record::{
    Aaaa, Caa, Cert, CertAssociation, Cname, Dnskey, Ds, Mx, Naptr, Ns, Ptr, RecordType,
    RecordValue, Srv, Sshfp, TextList, Uri, A,
};

impl RecordValue {
    /// Parse already-split presentation tokens for `rtype`.
    pub fn parse(rtype: RecordType, tokens: &[&str]) -> Result<Self> {
        let mut t = Tokens {
            rtype,
            tokens,
            pos: 0,
        };
        let value = match rtype {
            RecordType::A => Self::A(A {
                address: t.parse("address")?,
            }),
            RecordType::AAAA => Self::AAAA(Aaaa {
                address: t.parse("address")?,
            }),
            RecordType::CNAME => Self::CNAME(Cname {
                target: t.string("target")?,
            }),
            RecordType::MX => Self::MX(Mx {
                priority: t.parse("priority")?,
                host: t.string("host")?,
            }),
            RecordType::LOC => {
                let text = t.joined(" ", "position")?;
                Self::LOC(Loc::parse(&text, 0).map_err(|e| t.error(e.to_string()))?)
            }
            RecordType::SRV => Self::SRV(Srv {
                priority: t.parse("priority")?,
                weight: t.parse("weight")?,
                port: t.parse("port")?,
                target: t.string("target")?,
            }),
            RecordType::SPF => Self::SPF(TextList { text: t.rest() }),
            RecordType::TXT => Self::TXT(TextList { text: t.rest() }),
            RecordType::NS => Self::NS(Ns {
                nameserver: t.string("nameserver")?,
            }),
            RecordType::CAA => Self::CAA(Caa {
                flag: t.parse("flag")?,
                tag: t.string("tag")?,
                content: t.string("content")?,
            }),
            RecordType::PTR => Self::PTR(Ptr {
                domain: t.string("domain")?,
            }),
            RecordType::CERT => Self::CERT(Cert {
                cert_type: t.parse("type")?,
                key_tag: t.parse("key tag")?,
                algorithm: t.parse("algorithm")?,
                certificate: t.joined("", "certificate")?,
            }),
            RecordType::DNSKEY => Self::DNSKEY(Dnskey {
                flags: t.parse("flags")?,
                protocol: t.parse("protocol")?,
                algorithm: t.parse("algorithm")?,
                public_key: t.joined("", "public key")?,
            }),
            RecordType::DS => Self::DS(Ds {
                key_tag: t.parse("key tag")?,
                algorithm: t.parse("algorithm")?,
                digest_type: t.parse("digest type")?,
                digest: t.joined("", "digest")?,
            }),
            RecordType::NAPTR => Self::NAPTR(Naptr {
                order: t.parse("order")?,
                preference: t.parse("preference")?,
                flags: t.string("flags")?,
                service: t.string("service")?,
                regexp: t.string("regexp")?,
                replacement: t.string("replacement")?,
            }),
            RecordType::SMIMEA => Self::SMIMEA(t.cert_association()?),
            RecordType::TLSA => Self::TLSA(t.cert_association()?),
            RecordType::SSHFP => Self::SSHFP(Sshfp {
                algorithm: t.parse("algorithm")?,
                fp_type: t.parse("type")?,
                fingerprint: t.joined("", "fingerprint")?,
            }),
            RecordType::URI => Self::URI(Uri {
                priority: t.parse("priority")?,
                weight: t.parse("weight")?,
                target: t.string("target")?,
            }),
        };
        t.finish()?;
        Ok(value)
    }

    /// Parse one presentation line, honouring double-quoted strings.
    pub fn parse_line(rtype: RecordType, line: &str) -> Result<Self> {
        let words = split_words(line).map_err(|reason| CoreError::Presentation { rtype, reason })?;
        let tokens: Vec<&str> = words.iter().map(String::as_str).collect();
        Self::parse(rtype, &tokens)
    }
}

struct Tokens<'a> {
    rtype: RecordType,
    tokens: &'a [&'a str],
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn error(&self, reason: String) -> CoreError {
        CoreError::Presentation {
            rtype: self.rtype,
            reason,
        }
    }

    fn next(&mut self, what: &str) -> Result<&'a str> {
        let token = self
            .tokens
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.error(format!("missing {what}")))?;
        self.pos += 1;
        Ok(token)
    }

    fn string(&mut self, what: &str) -> Result<String> {
        self.next(what).map(str::to_string)
    }

    fn parse<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.next(what)?;
        token
            .parse()
            .map_err(|_| self.error(format!("invalid {what} '{token}'")))
    }

    /// All remaining tokens.
    fn rest(&mut self) -> Vec<String> {
        let rest = self.tokens[self.pos..].iter().map(|s| (*s).to_string()).collect();
        self.pos = self.tokens.len();
        rest
    }

    /// Remaining tokens joined by `sep`; at least one is required.
    fn joined(&mut self, sep: &str, what: &str) -> Result<String> {
        if self.pos >= self.tokens.len() {
            return Err(self.error(format!("missing {what}")));
        }
        Ok(self.rest().join(sep))
    }

    fn cert_association(&mut self) -> Result<CertAssociation> {
        Ok(CertAssociation {
            usage: self.parse("usage")?,
            selector: self.parse("selector")?,
            matching_type: self.parse("matching type")?,
            certificate: self.joined("", "certificate data")?,
        })
    }

    fn finish(&self) -> Result<()> {
        match self.tokens.get(self.pos) {
            Some(extra) => Err(self.error(format!("unexpected trailing token '{extra}'"))),
            None => Ok(()),
        }
    }
}

/// Split a line on whitespace; `"..."` groups a word and `\` escapes
/// inside quotes.
fn split_words(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let mut word = String::new();
        if c == '"' {
            chars.next();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some(escaped) => word.push(escaped),
                        None => return Err("dangling escape".into()),
                    },
                    Some(other) => word.push(other),
                    None => return Err("unterminated quoted string".into()),
                }
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                word.push(c);
                chars.next();
            }
        }
        words.push(word);
    }
    Ok(words)
}

struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for c in self.0.chars() {
            if c == '"' || c == '\\' {
                f.write_str("\\")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str("\"")
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A(a) => write!(f, "{}", a.address),
            Self::AAAA(a) => write!(f, "{}", a.address),
            Self::CNAME(c) => f.write_str(&c.target),
            Self::MX(mx) => write!(f, "{} {}", mx.priority, mx.host),
            Self::LOC(loc) => write!(f, "{loc}"),
            Self::SRV(srv) => write!(
                f,
                "{} {} {} {}",
                srv.priority, srv.weight, srv.port, srv.target
            ),
            Self::SPF(t) | Self::TXT(t) => {
                for (i, s) in t.text.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", Quoted(s))?;
                }
                Ok(())
            }
            Self::NS(ns) => f.write_str(&ns.nameserver),
            Self::CAA(caa) => write!(f, "{} {} {}", caa.flag, caa.tag, Quoted(&caa.content)),
            Self::PTR(ptr) => f.write_str(&ptr.domain),
            Self::CERT(c) => write!(
                f,
                "{} {} {} {}",
                c.cert_type, c.key_tag, c.algorithm, c.certificate
            ),
            Self::DNSKEY(k) => write!(
                f,
                "{} {} {} {}",
                k.flags, k.protocol, k.algorithm, k.public_key
            ),
            Self::DS(ds) => write!(
                f,
                "{} {} {} {}",
                ds.key_tag, ds.algorithm, ds.digest_type, ds.digest
            ),
            Self::NAPTR(n) => write!(
                f,
                "{} {} {} {} {} {}",
                n.order,
                n.preference,
                Quoted(&n.flags),
                Quoted(&n.service),
                Quoted(&n.regexp),
                n.replacement
            ),
            Self::SMIMEA(c) | Self::TLSA(c) => write!(
                f,
                "{} {} {} {}",
                c.usage, c.selector, c.matching_type, c.certificate
            ),
            Self::SSHFP(fp) => write!(f, "{} {} {}", fp.algorithm, fp.fp_type, fp.fingerprint),
            Self::URI(uri) => write!(f, "{} {} {}", uri.priority, uri.weight, Quoted(&uri.target)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::sample_values;

    #[test]
    fn test_display_feeds_back_into_parse() {
        for value in sample_values() {
            let text = value.to_string();
            let parsed = RecordValue::parse_line(value.record_type(), &text)
                .unwrap_or_else(|e| panic!("{text}: {e}"));
            assert_eq!(parsed, value, "presentation '{text}'");
        }
    }

    #[test]
    fn test_parse_mx_tokens() {
        let mx = RecordValue::parse(RecordType::MX, &["10", "mail.example.com"]).unwrap();
        assert_eq!(
            mx,
            RecordValue::MX(Mx {
                host: "mail.example.com".into(),
                priority: 10
            })
        );
        assert_eq!(mx.to_string(), "10 mail.example.com");
    }

    #[test]
    fn test_parse_loc_tokens() {
        let tokens: Vec<&str> = "42 21 54 N 71 06 18 W -24m 30m".split(' ').collect();
        match RecordValue::parse(RecordType::LOC, &tokens).unwrap() {
            RecordValue::LOC(loc) => assert_eq!(loc.size, 0x33),
            other => panic!("unexpected value {other:?}"),
        }
        assert!(RecordValue::parse(RecordType::LOC, &["42", "N"]).is_err());
    }

    #[test]
    fn test_payload_tokens_are_joined() {
        let ds = RecordValue::parse(RecordType::DS, &["60485", "5", "1", "2BB183AF", "5F22588179"])
            .unwrap();
        match ds {
            RecordValue::DS(ds) => assert_eq!(ds.digest, "2BB183AF5F22588179"),
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_quoted_text_keeps_spaces_and_escapes() {
        let txt = RecordValue::parse_line(RecordType::TXT, r#""hello world" "say \"hi\"" plain"#)
            .unwrap();
        assert_eq!(
            txt,
            RecordValue::TXT(TextList {
                text: vec!["hello world".into(), "say \"hi\"".into(), "plain".into()]
            })
        );
        assert_eq!(txt.to_string(), r#""hello world" "say \"hi\"" "plain""#);
    }

    #[test]
    fn test_parse_errors() {
        assert!(RecordValue::parse(RecordType::A, &["999.1.1.1"]).is_err());
        assert!(RecordValue::parse(RecordType::A, &[]).is_err());
        assert!(RecordValue::parse(RecordType::MX, &["10"]).is_err());
        assert!(RecordValue::parse(RecordType::MX, &["x", "mail.example.com"]).is_err());
        assert!(RecordValue::parse(RecordType::CNAME, &["a.example", "b.example"]).is_err());
        assert!(RecordValue::parse(RecordType::SSHFP, &["1", "1"]).is_err());
        assert!(RecordValue::parse_line(RecordType::TXT, "\"open").is_err());
        assert!(matches!(
            RecordValue::parse(RecordType::SRV, &["1", "2", "70000", "t.example"]),
            Err(CoreError::Presentation {
                rtype: RecordType::SRV,
                ..
            })
        ));
    }
}
